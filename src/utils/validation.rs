use crate::domain::range::CellRange;
use crate::utils::error::{EnrichError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(EnrichError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(EnrichError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(EnrichError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(EnrichError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

/// 必填的金鑰或識別碼不可為空白
pub fn validate_required_value(field_name: &str, value: Option<&str>) -> Result<()> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(EnrichError::MissingConfigError {
            field: field_name.to_string(),
        }),
    }
}

pub fn validate_cell_range(field_name: &str, range: &str) -> Result<()> {
    CellRange::parse(range)
        .map(|_| ())
        .map_err(|e| EnrichError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: range.to_string(),
            reason: e.to_string(),
        })
}

pub fn validate_column(field_name: &str, column: &str) -> Result<()> {
    if column.is_empty() || !column.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(EnrichError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: column.to_string(),
            reason: "Column must be letters only, e.g. \"O\"".to_string(),
        });
    }
    Ok(())
}
