#[cfg(feature = "cli")]
pub mod cli;

use crate::domain::model::Stage;
use crate::domain::range::column_index;
use crate::utils::error::{EnrichError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichConfig {
    pub sheet: SheetConfig,
    pub places: PlacesConfig,
    pub rate_limit: RateLimitConfig,
    pub ecoregion: EcoregionConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    pub base_url: String,
    pub spreadsheet_id: Option<String>,
    pub tab_name: String,
    /// 讀取用的 API key
    pub api_key: Option<String>,
    /// 寫入用的 OAuth access token，取得方式不在本工具範圍內
    pub access_token: Option<String>,
    pub header_rows: usize,
    /// First of the three district/name/address columns.
    pub location_column: usize,
    pub address_column: usize,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            base_url: "https://sheets.googleapis.com".to_string(),
            spreadsheet_id: None,
            tab_name: "Address Delimiter".to_string(),
            api_key: None,
            access_token: None,
            header_rows: 2,
            location_column: 1,
            address_column: 6,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacesConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            base_url: "https://maps.googleapis.com".to_string(),
            api_key: None,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub batch_size: usize,
    pub delay_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            delay_ms: 1000,
        }
    }
}

impl RateLimitConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EcoregionConfig {
    pub webdriver_url: String,
    pub locator_url: String,
    pub input_name: String,
    pub map_id: String,
    pub results_class: String,
    pub settle_ms: u64,
    pub wait_timeout_ms: u64,
    pub headless: bool,
}

impl Default for EcoregionConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:4444".to_string(),
            locator_url: "https://bplant.org/ecoregion_locator.php".to_string(),
            input_name: "new_location".to_string(),
            map_id: "map".to_string(),
            results_class: "levels".to_string(),
            settle_ms: 200,
            wait_timeout_ms: 10_000,
            headless: true,
        }
    }
}

impl EcoregionConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Absolute range overwritten by the place detail table.
    pub details_range: String,
    pub ecoregion_start_column: String,
    pub ecoregion_end_column: String,
    /// Sheet row of the first data row.
    pub ecoregion_first_row: u32,
    /// Addresses already processed by an earlier run.
    pub resume_from: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            details_range: "F3:K3325".to_string(),
            ecoregion_start_column: "O".to_string(),
            ecoregion_end_column: "R".to_string(),
            ecoregion_first_row: 3,
            resume_from: 0,
        }
    }
}

/// Where the run reads its input and writes its results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetBackend {
    GoogleSheets,
    LocalCsv,
}

impl EnrichConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EnrichError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 依執行階段與試算表來源檢查必要設定
    pub fn validate_for(&self, stage: Stage, backend: SheetBackend) -> Result<()> {
        self.validate()?;

        // 寫入 Google Sheets 需要 token，否則查詢結果會在最後寫入時全部丟失
        if backend == SheetBackend::GoogleSheets {
            validation::validate_required_value(
                "sheet.spreadsheet_id",
                self.sheet.spreadsheet_id.as_deref(),
            )?;
            validation::validate_required_value(
                "sheet.access_token",
                self.sheet.access_token.as_deref(),
            )?;
        }
        if stage.includes_details() {
            validation::validate_required_value("places.api_key", self.places.api_key.as_deref())?;
        }
        Ok(())
    }
}

impl Validate for EnrichConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("sheet.base_url", &self.sheet.base_url)?;
        validation::validate_url("places.base_url", &self.places.base_url)?;
        validation::validate_url("ecoregion.webdriver_url", &self.ecoregion.webdriver_url)?;
        validation::validate_url("ecoregion.locator_url", &self.ecoregion.locator_url)?;

        validation::validate_positive_number("rate_limit.batch_size", self.rate_limit.batch_size, 1)?;

        validation::validate_cell_range("output.details_range", &self.output.details_range)?;
        validation::validate_column(
            "output.ecoregion_start_column",
            &self.output.ecoregion_start_column,
        )?;
        validation::validate_column(
            "output.ecoregion_end_column",
            &self.output.ecoregion_end_column,
        )?;
        if column_index(&self.output.ecoregion_start_column)
            > column_index(&self.output.ecoregion_end_column)
        {
            return Err(EnrichError::InvalidConfigValueError {
                field: "output.ecoregion_end_column".to_string(),
                value: self.output.ecoregion_end_column.clone(),
                reason: format!(
                    "must not come before ecoregion_start_column {}",
                    self.output.ecoregion_start_column
                ),
            });
        }
        validation::validate_positive_number(
            "output.ecoregion_first_row",
            self.output.ecoregion_first_row as usize,
            1,
        )?;
        Ok(())
    }
}

/// 替換環境變數 (例如 ${PLACES_API_KEY})，未設定的變數保持原樣
fn substitute_env_vars(content: &str) -> String {
    static ENV_VAR: std::sync::LazyLock<Regex> =
        std::sync::LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"));

    ENV_VAR
        .replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_match_observed_run() {
        let config = EnrichConfig::default();
        assert_eq!(config.rate_limit.batch_size, 100);
        assert_eq!(config.rate_limit.delay(), Duration::from_millis(1000));
        assert_eq!(config.ecoregion.wait_timeout(), Duration::from_millis(10_000));
        assert_eq!(config.ecoregion.settle_delay(), Duration::from_millis(200));
        assert_eq!(config.sheet.header_rows, 2);
        assert_eq!(config.output.details_range, "F3:K3325");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_toml_config() {
        let toml_content = r#"
[sheet]
spreadsheet_id = "sheet-123"
tab_name = "Locations"

[rate_limit]
batch_size = 25

[output]
resume_from = 40
"#;

        let config = EnrichConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.sheet.spreadsheet_id.as_deref(), Some("sheet-123"));
        assert_eq!(config.sheet.tab_name, "Locations");
        assert_eq!(config.sheet.address_column, 6);
        assert_eq!(config.rate_limit.batch_size, 25);
        assert_eq!(config.rate_limit.delay_ms, 1000);
        assert_eq!(config.output.resume_from, 40);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("PLACE_ENRICH_TEST_MAPS_KEY", "maps-key-from-env");

        let toml_content = r#"
[places]
api_key = "${PLACE_ENRICH_TEST_MAPS_KEY}"

[sheet]
api_key = "${PLACE_ENRICH_TEST_UNSET_VAR}"
"#;

        let config = EnrichConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.places.api_key.as_deref(), Some("maps-key-from-env"));
        assert_eq!(
            config.sheet.api_key.as_deref(),
            Some("${PLACE_ENRICH_TEST_UNSET_VAR}")
        );

        std::env::remove_var("PLACE_ENRICH_TEST_MAPS_KEY");
    }

    #[test]
    fn test_config_validation() {
        let config = EnrichConfig::from_toml_str(
            r#"
[places]
base_url = "invalid-url"
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());

        let config = EnrichConfig::from_toml_str(
            r#"
[rate_limit]
batch_size = 0
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_for_stage_requires_keys() {
        let mut config = EnrichConfig::default();
        config.sheet.spreadsheet_id = Some("sheet-123".to_string());
        config.sheet.access_token = Some("token".to_string());

        assert!(config
            .validate_for(Stage::Ecoregions, SheetBackend::GoogleSheets)
            .is_ok());
        assert!(matches!(
            config.validate_for(Stage::Details, SheetBackend::GoogleSheets),
            Err(EnrichError::MissingConfigError { .. })
        ));

        config.places.api_key = Some("key".to_string());
        assert!(config
            .validate_for(Stage::All, SheetBackend::GoogleSheets)
            .is_ok());
    }

    #[test]
    fn test_google_sheets_requires_access_token_before_any_lookup() {
        let mut config = EnrichConfig::default();
        config.sheet.spreadsheet_id = Some("sheet-123".to_string());
        config.places.api_key = Some("key".to_string());

        match config.validate_for(Stage::All, SheetBackend::GoogleSheets) {
            Err(EnrichError::MissingConfigError { field }) => {
                assert_eq!(field, "sheet.access_token")
            }
            other => panic!("unexpected result: {other:?}"),
        }

        config.sheet.access_token = Some("  ".to_string());
        assert!(config
            .validate_for(Stage::Ecoregions, SheetBackend::GoogleSheets)
            .is_err());
    }

    #[test]
    fn test_local_csv_needs_no_sheet_credentials() {
        let mut config = EnrichConfig::default();
        config.places.api_key = Some("key".to_string());

        assert!(config.validate_for(Stage::All, SheetBackend::LocalCsv).is_ok());
        assert!(config
            .validate_for(Stage::All, SheetBackend::GoogleSheets)
            .is_err());
    }

    #[test]
    fn test_reversed_ecoregion_columns_are_rejected() {
        let config = EnrichConfig::from_toml_str(
            r#"
[output]
ecoregion_start_column = "R"
ecoregion_end_column = "O"
"#,
        )
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(EnrichError::InvalidConfigValueError { .. })
        ));

        let config = EnrichConfig::from_toml_str(
            r#"
[output]
ecoregion_start_column = "Z"
ecoregion_end_column = "AB"
"#,
        )
        .unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[ecoregion]\nwebdriver_url = \"http://localhost:9515\"\nheadless = false\n")
            .unwrap();

        let config = EnrichConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.ecoregion.webdriver_url, "http://localhost:9515");
        assert!(!config.ecoregion.headless);
        assert_eq!(config.ecoregion.results_class, "levels");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = EnrichConfig::from_toml_str("[sheet\nheader_rows = ");
        assert!(matches!(result, Err(EnrichError::ConfigError { .. })));
    }
}
