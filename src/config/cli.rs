use crate::config::EnrichConfig;
use crate::domain::model::Stage;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "place-enrich")]
#[command(about = "Enrich spreadsheet locations with place details and ecoregions")]
pub struct CliArgs {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Which pipeline(s) to run
    #[arg(long, value_enum, default_value_t = Stage::All)]
    pub stage: Stage,

    /// Read input from and write results into a local CSV grid instead of Google Sheets
    #[arg(long)]
    pub csv: Option<PathBuf>,

    #[arg(long, env = "SPREADSHEET_ID")]
    pub spreadsheet_id: Option<String>,

    #[arg(long, env = "SHEETS_API_KEY", hide_env_values = true)]
    pub sheets_api_key: Option<String>,

    #[arg(long, env = "SHEETS_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    #[arg(long, env = "PLACES_API_KEY", hide_env_values = true)]
    pub places_api_key: Option<String>,

    /// Skip this many addresses already classified by an earlier run
    #[arg(long)]
    pub resume_from: Option<usize>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

impl CliArgs {
    /// 以命令列參數覆寫設定檔
    pub fn apply_to(&self, config: &mut EnrichConfig) {
        if let Some(id) = &self.spreadsheet_id {
            config.sheet.spreadsheet_id = Some(id.clone());
        }
        if let Some(key) = &self.sheets_api_key {
            config.sheet.api_key = Some(key.clone());
        }
        if let Some(token) = &self.access_token {
            config.sheet.access_token = Some(token.clone());
        }
        if let Some(key) = &self.places_api_key {
            config.places.api_key = Some(key.clone());
        }
        if let Some(resume_from) = self.resume_from {
            config.output.resume_from = resume_from;
        }
    }
}
