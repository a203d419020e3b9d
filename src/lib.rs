pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;

pub use adapters::{csv_sheet::CsvSheet, sheets::GoogleSheet, webdriver::WebDriverLauncher};
pub use config::EnrichConfig;
pub use crate::core::orchestrator::EnrichmentEngine;
pub use domain::model::{RunSummary, Stage, StageSummary};
pub use utils::error::{EnrichError, Result};
