use crate::adapters::places::{AddressComponent, PlaceResult, PlacesClient};
use crate::core::batch::run_batched;
use crate::domain::model::{Lookup, PlaceDetail, PlaceId};
use crate::domain::ports::RateLimiter;
use std::sync::Arc;

const CITY_TAG: &str = "locality";
const COUNTY_TAG: &str = "administrative_area_level_2";
const POSTAL_CODE_TAG: &str = "postal_code";

/// Maps resolved place ids to structured details through the Place Details API.
pub struct DetailFetcher {
    places: Arc<PlacesClient>,
    limiter: Arc<dyn RateLimiter>,
}

impl DetailFetcher {
    pub fn new(places: Arc<PlacesClient>, limiter: Arc<dyn RateLimiter>) -> Self {
        Self { places, limiter }
    }

    pub async fn fetch_all(&self, place_ids: Vec<Lookup<PlaceId>>) -> Vec<Lookup<PlaceDetail>> {
        tracing::info!("📍 Fetching place details for {} rows", place_ids.len());
        run_batched(place_ids, self.limiter.as_ref(), |index, place_id| async move {
            self.fetch(index, &place_id).await
        })
        .await
    }

    pub async fn fetch(&self, index: usize, place_id: &Lookup<PlaceId>) -> Lookup<PlaceDetail> {
        // 沒有 place id 就不呼叫 API，前一階段的結果原樣保留
        let place_id = match place_id {
            Lookup::Resolved(id) if !id.is_empty() => id,
            Lookup::Resolved(_) | Lookup::Skipped => return Lookup::Skipped,
            Lookup::NotFound => return Lookup::NotFound,
            Lookup::Failed(reason) => return Lookup::Failed(reason.clone()),
        };

        match self.places.place_details(place_id).await {
            Ok(Some(result)) => match detail_from_result(&result) {
                Ok(detail) => Lookup::Resolved(detail),
                Err(e) => {
                    tracing::warn!("⚠️ Row {}: bad geometry for {}: {}", index, place_id, e);
                    Lookup::Failed(e.to_string())
                }
            },
            Ok(None) => Lookup::NotFound,
            Err(e) => {
                tracing::warn!("⚠️ Row {}: failed to fetch details for {}: {}", index, place_id, e);
                Lookup::Failed(e.to_string())
            }
        }
    }
}

pub fn detail_from_result(result: &PlaceResult) -> serde_json::Result<PlaceDetail> {
    let location = &result.geometry.location;
    let coordinates = serde_json::to_string(&[&location.lat, &location.lng])?;

    Ok(PlaceDetail {
        name: result.name.clone(),
        formatted_address: result.formatted_address.clone(),
        city: first_component(&result.address_components, CITY_TAG),
        county: first_component(&result.address_components, COUNTY_TAG),
        postal_code: first_component(&result.address_components, POSTAL_CODE_TAG),
        coordinates: Some(coordinates),
    })
}

fn first_component(components: &[AddressComponent], tag: &str) -> Option<String> {
    components
        .iter()
        .find(|component| component.types.iter().any(|t| t == tag))
        .map(|component| component.long_name.clone())
}
