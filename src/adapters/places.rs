use crate::config::PlacesConfig;
use crate::domain::model::PlaceId;
use crate::utils::error::{EnrichError, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

const FIND_PLACE_PATH: &str = "/maps/api/place/findplacefromtext/json";
const DETAILS_PATH: &str = "/maps/api/place/details/json";
const DETAIL_FIELDS: &str = "address_components,formatted_address,geometry,name";

#[derive(Debug, Deserialize)]
struct FindPlaceResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    status: Option<String>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    place_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    result: Option<PlaceResult>,
    status: Option<String>,
    error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceResult {
    pub name: Option<String>,
    pub formatted_address: Option<String>,
    pub geometry: Geometry,
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

/// Kept as JSON numbers so coordinates print exactly as the provider sent them.
#[derive(Debug, Clone, Deserialize)]
pub struct LatLng {
    pub lat: serde_json::Number,
    pub lng: serde_json::Number,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

/// Google Places 的 Find Place / Place Details 端點
#[derive(Debug, Clone)]
pub struct PlacesClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl PlacesClient {
    pub fn new(config: &PlacesConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        // 金鑰是否必填由設定驗證依執行階段決定
        let api_key = config.api_key.clone().unwrap_or_default();
        Self::with_client(client, &config.base_url, api_key)
    }

    pub fn with_client(client: Client, base_url: &str, api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
            api_key: api_key.into(),
        })
    }

    /// `query` must already be sanitized (word characters joined by `%20`).
    /// Returns the first candidate's id, `None` when there are no candidates.
    pub async fn find_place(&self, query: &str) -> Result<Option<PlaceId>> {
        let mut url = self.base_url.join(FIND_PLACE_PATH)?;
        url.set_query(Some(&format!("input={query}&inputtype=textquery")));
        url.query_pairs_mut().append_pair("key", &self.api_key);

        tracing::debug!("📡 Find place: {}", query);
        let response: FindPlaceResponse = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !status_is_ok(response.status.as_deref(), response.error_message)? {
            return Ok(None);
        }

        Ok(response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.place_id)
            .filter(|id| !id.is_empty()))
    }

    pub async fn place_details(&self, place_id: &str) -> Result<Option<PlaceResult>> {
        let mut url = self.base_url.join(DETAILS_PATH)?;
        url.query_pairs_mut()
            .append_pair("place_id", place_id)
            .append_pair("fields", DETAIL_FIELDS)
            .append_pair("key", &self.api_key);

        tracing::debug!("📡 Place details: {}", place_id);
        let response: DetailsResponse = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !status_is_ok(response.status.as_deref(), response.error_message)? {
            return Ok(None);
        }

        match response.result {
            Some(result) => Ok(Some(result)),
            None => Err(EnrichError::PlacesApiError {
                status: response.status.unwrap_or_else(|| "OK".to_string()),
                message: "response has no result".to_string(),
            }),
        }
    }
}

/// `Ok(true)` to continue, `Ok(false)` for an empty answer, `Err` for provider errors.
/// A response without a status field is treated as OK.
fn status_is_ok(status: Option<&str>, error_message: Option<String>) -> Result<bool> {
    match status {
        None | Some("OK") => Ok(true),
        Some("ZERO_RESULTS") | Some("NOT_FOUND") => Ok(false),
        Some(other) => Err(EnrichError::PlacesApiError {
            status: other.to_string(),
            message: error_message.unwrap_or_default(),
        }),
    }
}
