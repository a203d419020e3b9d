use crate::adapters::places::PlacesClient;
use crate::core::batch::run_batched;
use crate::domain::model::{LocationRecord, Lookup, PlaceId};
use crate::domain::ports::RateLimiter;
use regex::Regex;
use std::sync::{Arc, LazyLock};

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9A-Za-z_\s]").expect("valid sanitizer pattern"));

/// 去除非文字字元，並以 `%20` 連接剩下的詞
pub fn sanitize_query(text: &str) -> String {
    NON_WORD
        .replace_all(text, "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("%20")
}

/// Search text for a record: name and address when both exist, otherwise
/// whichever exists. `None` when nothing usable is left after sanitizing.
pub fn build_query(record: &LocationRecord) -> Option<String> {
    let parts: Vec<String> = [record.name.as_deref(), record.address.as_deref()]
        .into_iter()
        .flatten()
        .map(sanitize_query)
        .filter(|part| !part.is_empty())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("%20"))
    }
}

/// Maps location records to place ids through the Find Place API.
pub struct PlaceResolver {
    places: Arc<PlacesClient>,
    limiter: Arc<dyn RateLimiter>,
}

impl PlaceResolver {
    pub fn new(places: Arc<PlacesClient>, limiter: Arc<dyn RateLimiter>) -> Self {
        Self { places, limiter }
    }

    pub async fn resolve_all(&self, records: Vec<LocationRecord>) -> Vec<Lookup<PlaceId>> {
        tracing::info!("🔎 Resolving place ids for {} records", records.len());
        run_batched(records, self.limiter.as_ref(), |index, record| async move {
            self.resolve(index, &record).await
        })
        .await
    }

    pub async fn resolve(&self, index: usize, record: &LocationRecord) -> Lookup<PlaceId> {
        let Some(query) = build_query(record) else {
            tracing::debug!("Row {}: no name or address, skipping", index);
            return Lookup::Skipped;
        };

        match self.places.find_place(&query).await {
            Ok(Some(place_id)) => Lookup::Resolved(place_id),
            Ok(None) => {
                tracing::debug!("Row {}: no candidates for \"{}\"", index, query);
                Lookup::NotFound
            }
            Err(e) => {
                tracing::warn!("⚠️ Row {}: failed to find place for \"{}\": {}", index, query, e);
                Lookup::Failed(e.to_string())
            }
        }
    }
}
