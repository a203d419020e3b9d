use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnrichError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Places API returned {status}: {message}")]
    PlacesApiError { status: String, message: String },

    #[error("Sheet write rejected ({status}): {message}")]
    SheetError { status: u16, message: String },

    #[error("Browser automation failed: {message}")]
    BrowserError { message: String },

    #[error("Timed out after {timeout_ms}ms waiting for {what}")]
    TimeoutError { what: String, timeout_ms: u64 },

    #[error("Invalid cell range '{range}': {reason}")]
    InvalidRange { range: String, reason: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

impl EnrichError {
    /// 對應到 CLI 的結束代碼
    pub fn exit_code(&self) -> i32 {
        match self {
            EnrichError::ConfigError { .. }
            | EnrichError::MissingConfigError { .. }
            | EnrichError::InvalidConfigValueError { .. }
            | EnrichError::InvalidRange { .. }
            | EnrichError::UrlError(_) => 1,
            EnrichError::ApiError(_)
            | EnrichError::PlacesApiError { .. }
            | EnrichError::SheetError { .. }
            | EnrichError::BrowserError { .. }
            | EnrichError::TimeoutError { .. } => 2,
            _ => 3,
        }
    }

    pub fn browser(message: impl Into<String>) -> Self {
        EnrichError::BrowserError {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EnrichError>;
