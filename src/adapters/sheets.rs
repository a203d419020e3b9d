use crate::config::SheetConfig;
use crate::domain::ports::{SheetSink, SheetSource};
use crate::domain::range::CellRange;
use crate::utils::error::{EnrichError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRequest<'a> {
    range: &'a str,
    major_dimension: &'a str,
    values: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateResponse {
    updated_range: Option<String>,
    updated_cells: Option<u64>,
}

/// Google Sheets v4 values API for one tab of one spreadsheet.
#[derive(Debug, Clone)]
pub struct GoogleSheet {
    client: Client,
    base_url: Url,
    spreadsheet_id: String,
    tab_name: String,
    api_key: Option<String>,
    access_token: Option<String>,
}

impl GoogleSheet {
    pub fn new(config: &SheetConfig) -> Result<Self> {
        let spreadsheet_id =
            config
                .spreadsheet_id
                .clone()
                .ok_or_else(|| EnrichError::MissingConfigError {
                    field: "sheet.spreadsheet_id".to_string(),
                })?;

        Ok(Self {
            client: Client::new(),
            base_url: Url::parse(&config.base_url)?,
            spreadsheet_id,
            tab_name: config.tab_name.clone(),
            api_key: config.api_key.clone(),
            access_token: config.access_token.clone(),
        })
    }

    /// `.../v4/spreadsheets/{id}/values/{tab}` or `.../values/{tab}!{range}`.
    fn values_url(&self, range: Option<&CellRange>) -> Result<Url> {
        let target = match range {
            Some(range) => format!("{}!{}", self.tab_name, range),
            None => self.tab_name.clone(),
        };

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| EnrichError::ConfigError {
                message: format!("sheet.base_url cannot be a base: {}", self.base_url),
            })?
            .pop_if_empty()
            .extend([
                "v4",
                "spreadsheets",
                self.spreadsheet_id.as_str(),
                "values",
                target.as_str(),
            ]);
        Ok(url)
    }
}

fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl SheetSource for GoogleSheet {
    async fn read_values(&self) -> Result<Vec<Vec<String>>> {
        let mut url = self.values_url(None)?;
        url.query_pairs_mut().append_pair("alt", "json");
        if let Some(key) = &self.api_key {
            url.query_pairs_mut().append_pair("key", key);
        }

        tracing::debug!("📥 Reading sheet tab '{}'", self.tab_name);
        let mut request = self.client.get(url);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let body: ValueRange = request.send().await?.error_for_status()?.json().await?;
        let rows: Vec<Vec<String>> = body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect();

        tracing::info!("📥 Read {} rows from '{}'", rows.len(), self.tab_name);
        Ok(rows)
    }
}

#[async_trait]
impl SheetSink for GoogleSheet {
    async fn write_range(&self, range: &CellRange, values: Vec<Vec<String>>) -> Result<()> {
        let token = self
            .access_token
            .as_deref()
            .ok_or_else(|| EnrichError::MissingConfigError {
                field: "sheet.access_token".to_string(),
            })?;

        let mut url = self.values_url(Some(range))?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED");

        let a1 = format!("{}!{}", self.tab_name, range);
        let request = UpdateRequest {
            range: &a1,
            major_dimension: "ROWS",
            values,
        };

        let response = self
            .client
            .put(url)
            .bearer_auth(token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EnrichError::SheetError {
                status: status.as_u16(),
                message,
            });
        }

        let updated: UpdateResponse = response.json().await?;
        tracing::info!(
            "💾 Updated {} ({} cells)",
            updated.updated_range.as_deref().unwrap_or(&a1),
            updated.updated_cells.unwrap_or(0)
        );
        Ok(())
    }
}
