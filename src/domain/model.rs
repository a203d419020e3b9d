use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 試算表中的一筆地點資料
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub district: Option<String>,
    pub name: Option<String>,
    pub address: Option<String>,
}

impl LocationRecord {
    /// Empty strings are treated the same as missing cells.
    pub fn new(district: Option<&str>, name: Option<&str>, address: Option<&str>) -> Self {
        let present = |v: Option<&str>| v.filter(|s| !s.is_empty()).map(str::to_string);
        Self {
            district: present(district),
            name: present(name),
            address: present(address),
        }
    }

    pub fn is_resolvable(&self) -> bool {
        self.name.is_some() || self.address.is_some()
    }
}

/// Opaque place token returned by the search API.
pub type PlaceId = String;

/// Ecoregion names, coarsest first.
pub type Ecoregions = Vec<String>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceDetail {
    pub name: Option<String>,
    pub formatted_address: Option<String>,
    pub city: Option<String>,
    pub county: Option<String>,
    pub postal_code: Option<String>,
    /// `[lat,lng]` serialized as JSON.
    pub coordinates: Option<String>,
}

impl PlaceDetail {
    pub const COLUMNS: usize = 6;

    pub fn is_empty(&self) -> bool {
        *self == PlaceDetail::default()
    }

    /// 輸出成試算表的一列，缺少的欄位以空字串填補
    pub fn to_row(&self) -> Vec<String> {
        [
            &self.name,
            &self.formatted_address,
            &self.city,
            &self.county,
            &self.postal_code,
            &self.coordinates,
        ]
        .into_iter()
        .map(|field| field.clone().unwrap_or_default())
        .collect()
    }
}

/// Outcome of a single external lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Resolved(T),
    /// The provider answered but had nothing for this input.
    NotFound,
    /// Transport, parse or provider error for this input only.
    Failed(String),
    /// Input was insufficient or already handled; no call was made.
    Skipped,
}

impl<T> Lookup<T> {
    pub fn resolved(&self) -> Option<&T> {
        match self {
            Lookup::Resolved(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_resolved(self) -> Option<T> {
        match self {
            Lookup::Resolved(value) => Some(value),
            _ => None,
        }
    }

    pub fn kind(&self) -> OutcomeKind {
        match self {
            Lookup::Resolved(_) => OutcomeKind::Resolved,
            Lookup::NotFound => OutcomeKind::NotFound,
            Lookup::Failed(_) => OutcomeKind::Failed,
            Lookup::Skipped => OutcomeKind::Skipped,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Resolved,
    NotFound,
    Failed,
    Skipped,
}

/// Which pipeline(s) a run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Place ids and details only
    Details,
    /// Ecoregion classification only
    Ecoregions,
    #[default]
    All,
}

impl Stage {
    pub fn includes_details(&self) -> bool {
        matches!(self, Stage::Details | Stage::All)
    }

    pub fn includes_ecoregions(&self) -> bool {
        matches!(self, Stage::Ecoregions | Stage::All)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StageSummary {
    pub total: usize,
    pub resolved: usize,
    pub not_found: usize,
    pub failed: usize,
    pub skipped: usize,
    pub rows_written: usize,
    pub write_failures: usize,
}

impl StageSummary {
    pub fn tally<T>(outcomes: &[Lookup<T>]) -> Self {
        let mut summary = Self::default();
        for outcome in outcomes {
            summary.record(outcome.kind());
        }
        summary
    }

    pub fn record(&mut self, kind: OutcomeKind) {
        self.total += 1;
        match kind {
            OutcomeKind::Resolved => self.resolved += 1,
            OutcomeKind::NotFound => self.not_found += 1,
            OutcomeKind::Failed => self.failed += 1,
            OutcomeKind::Skipped => self.skipped += 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub stage: Stage,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub details: Option<StageSummary>,
    pub ecoregions: Option<StageSummary>,
}

impl RunSummary {
    pub fn start(stage: Stage) -> Self {
        Self {
            stage,
            started_at: Utc::now(),
            finished_at: None,
            details: None,
            ecoregions: None,
        }
    }

    pub fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_record_treats_empty_cells_as_missing() {
        let record = LocationRecord::new(Some("North"), Some(""), None);
        assert_eq!(record.district.as_deref(), Some("North"));
        assert!(record.name.is_none());
        assert!(!record.is_resolvable());

        let record = LocationRecord::new(None, None, Some("1 Main St"));
        assert!(record.is_resolvable());
    }

    #[test]
    fn test_place_detail_row_keeps_column_order() {
        let detail = PlaceDetail {
            name: Some("Park".to_string()),
            city: Some("Springfield".to_string()),
            coordinates: Some("[1.5,2]".to_string()),
            ..Default::default()
        };
        assert_eq!(
            detail.to_row(),
            vec!["Park", "", "Springfield", "", "", "[1.5,2]"]
        );
        assert!(!detail.is_empty());
        assert_eq!(PlaceDetail::default().to_row(), vec![""; PlaceDetail::COLUMNS]);
    }

    #[test]
    fn test_stage_summary_tally() {
        let outcomes: Vec<Lookup<String>> = vec![
            Lookup::Resolved("a".to_string()),
            Lookup::NotFound,
            Lookup::Failed("timeout".to_string()),
            Lookup::Skipped,
            Lookup::Resolved("b".to_string()),
        ];
        let summary = StageSummary::tally(&outcomes);
        assert_eq!(summary.total, 5);
        assert_eq!(summary.resolved, 2);
        assert_eq!(summary.not_found, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn test_stage_selection() {
        assert!(Stage::All.includes_details());
        assert!(Stage::All.includes_ecoregions());
        assert!(!Stage::Details.includes_ecoregions());
        assert!(!Stage::Ecoregions.includes_details());
    }
}
