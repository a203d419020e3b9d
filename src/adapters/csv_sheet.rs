use crate::domain::ports::{SheetSink, SheetSource};
use crate::domain::range::CellRange;
use crate::utils::error::{EnrichError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;

/// 以本機 CSV 檔模擬試算表：讀取整張表，並依 A1 範圍寫回同一個檔案
#[derive(Debug)]
pub struct CsvSheet {
    path: PathBuf,
    grid: Mutex<Vec<Vec<String>>>,
}

impl CsvSheet {
    /// Loads `path` when it exists, otherwise starts from an empty grid.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let grid = if path.exists() {
            read_grid(&path)?
        } else {
            Vec::new()
        };

        Ok(Self {
            path,
            grid: Mutex::new(grid),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_grid(&self) -> Result<std::sync::MutexGuard<'_, Vec<Vec<String>>>> {
        self.grid.lock().map_err(|_| EnrichError::ProcessingError {
            message: "CSV sheet lock poisoned".to_string(),
        })
    }
}

fn read_grid(path: &Path) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record?;
        grid.push(record.iter().map(str::to_string).collect());
    }
    Ok(grid)
}

/// Writes the grid to a temp file beside `path` and renames it into place,
/// so the previous file survives a failed or interrupted write.
fn write_grid(path: &Path, grid: &[Vec<String>]) -> Result<()> {
    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            std::fs::create_dir_all(parent)?;
            parent.to_path_buf()
        }
        None => PathBuf::from("."),
    };

    let temp_file = NamedTempFile::new_in(&dir)?;
    {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(temp_file.as_file());
        for row in grid {
            writer.write_record(row)?;
        }
        writer.flush()?;
    }

    temp_file
        .persist(path)
        .map_err(|e| EnrichError::IoError(e.error))?;
    Ok(())
}

#[async_trait]
impl SheetSource for CsvSheet {
    async fn read_values(&self) -> Result<Vec<Vec<String>>> {
        let grid = self.lock_grid()?;
        tracing::info!("📥 Read {} rows from {}", grid.len(), self.path.display());
        Ok(grid.clone())
    }
}

#[async_trait]
impl SheetSink for CsvSheet {
    async fn write_range(&self, range: &CellRange, values: Vec<Vec<String>>) -> Result<()> {
        let mut grid = self.lock_grid()?;
        let mut updated = grid.clone();

        for (offset, row_values) in values.into_iter().take(range.height()).enumerate() {
            let row_index = range.start_row as usize - 1 + offset;
            if updated.len() <= row_index {
                updated.resize_with(row_index + 1, Vec::new);
            }
            let row = &mut updated[row_index];

            for (col_offset, value) in row_values.into_iter().take(range.width()).enumerate() {
                let col_index = range.start_column as usize + col_offset;
                if row.len() <= col_index {
                    row.resize(col_index + 1, String::new());
                }
                row[col_index] = value;
            }
        }

        // 先落地再更新記憶體，寫檔失敗時讀取結果與檔案一致
        write_grid(&self.path, &updated)?;
        *grid = updated;
        tracing::info!("💾 Updated {} in {}", range, self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_reads_ragged_rows() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sheet.csv");
        std::fs::write(&path, "Title\nid,district,name\n1,North,City Park,1 Park Way\n").unwrap();

        let sheet = CsvSheet::open(&path).unwrap();
        let values = sheet.read_values().await.unwrap();

        assert_eq!(values.len(), 3);
        assert_eq!(values[0], row(&["Title"]));
        assert_eq!(values[2][3], "1 Park Way");
    }

    #[tokio::test]
    async fn test_write_range_places_values_and_persists() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sheet.csv");
        std::fs::write(&path, "a,b\nc,d\n").unwrap();

        let sheet = CsvSheet::open(&path).unwrap();
        let range = CellRange::parse("C2:D3").unwrap();
        sheet
            .write_range(&range, vec![row(&["x", "y"]), row(&["z"])])
            .await
            .unwrap();

        let reopened = CsvSheet::open(&path).unwrap();
        let values = reopened.read_values().await.unwrap();
        assert_eq!(values[0], row(&["a", "b"]));
        assert_eq!(values[1], row(&["c", "d", "x", "y"]));
        assert_eq!(values[2], row(&["", "", "z"]));
    }

    #[tokio::test]
    async fn test_values_outside_range_are_dropped() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out").join("sheet.csv");

        let sheet = CsvSheet::open(&path).unwrap();
        let range = CellRange::parse("A1:B1").unwrap();
        sheet
            .write_range(&range, vec![row(&["1", "2", "3"]), row(&["4"])])
            .await
            .unwrap();

        let values = CsvSheet::open(&path).unwrap().read_values().await.unwrap();
        assert_eq!(values, vec![row(&["1", "2"])]);
    }

    #[tokio::test]
    async fn test_empty_row_leaves_cells_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sheet.csv");
        std::fs::write(&path, "keep,me\n").unwrap();

        let sheet = CsvSheet::open(&path).unwrap();
        let range = CellRange::row_span("A", "B", 1).unwrap();
        sheet.write_range(&range, vec![vec![]]).await.unwrap();

        let values = sheet.read_values().await.unwrap();
        assert_eq!(values, vec![row(&["keep", "me"])]);
    }

    #[tokio::test]
    async fn test_failed_persist_leaves_grid_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sheet.csv");
        std::fs::write(&path, "a,b
").unwrap();

        let sheet = CsvSheet::open(&path).unwrap();
        // 讓目標路徑變成目錄，rename 必定失敗
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        let range = CellRange::parse("A1:A1").unwrap();
        let result = sheet.write_range(&range, vec![row(&["X"])]).await;

        assert!(matches!(result, Err(EnrichError::IoError(_))));
        assert_eq!(sheet.read_values().await.unwrap(), vec![row(&["a", "b"])]);
        // 暫存檔不會殘留
        let leftovers: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("sheet.csv")]);
    }

    #[tokio::test]
    async fn test_rewrite_replaces_file_contents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sheet.csv");
        std::fs::write(&path, "a,b
c,d
").unwrap();

        let sheet = CsvSheet::open(&path).unwrap();
        sheet
            .write_range(&CellRange::parse("B2:B2").unwrap(), vec![row(&["z"])])
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a,b\nc,z\n");
    }
}
