use crate::adapters::places::PlacesClient;
use crate::config::{EnrichConfig, OutputConfig};
use crate::core::batch::FixedWindowLimiter;
use crate::core::details::DetailFetcher;
use crate::core::ecoregion::EcoregionLookup;
use crate::core::reader::{self, SheetLayout};
use crate::core::resolver::PlaceResolver;
use crate::domain::model::{
    Ecoregions, Lookup, PlaceDetail, RunSummary, Stage, StageSummary,
};
use crate::domain::ports::{BrowserLauncher, RateLimiter, SheetSink, SheetSource};
use crate::domain::range::CellRange;
use crate::utils::error::Result;
use std::sync::Arc;

/// Sink row for a detail outcome: six cells, all empty unless resolved.
pub fn detail_row(outcome: &Lookup<PlaceDetail>) -> Vec<String> {
    match outcome {
        Lookup::Resolved(detail) => detail.to_row(),
        _ => PlaceDetail::default().to_row(),
    }
}

/// Sink row for an ecoregion outcome, clamped to `width` cells.
/// Misses and failures blank the whole span; skipped rows are left alone.
pub fn ecoregion_row(outcome: &Lookup<Ecoregions>, width: usize) -> Vec<String> {
    match outcome {
        Lookup::Resolved(regions) => {
            if regions.len() > width {
                tracing::warn!(
                    "✂️ {} ecoregions exceed the {} output columns, extra levels dropped",
                    regions.len(),
                    width
                );
            }
            regions.iter().take(width).cloned().collect()
        }
        Lookup::NotFound | Lookup::Failed(_) => vec![String::new(); width],
        Lookup::Skipped => Vec::new(),
    }
}

/// 串接兩條管線：地點細節 (A) 與生態區 (B)
pub struct EnrichmentEngine {
    source: Arc<dyn SheetSource>,
    sink: Arc<dyn SheetSink>,
    resolver: PlaceResolver,
    fetcher: DetailFetcher,
    ecoregions: EcoregionLookup,
    layout: SheetLayout,
    output: OutputConfig,
}

impl EnrichmentEngine {
    pub fn new(
        config: &EnrichConfig,
        source: Arc<dyn SheetSource>,
        sink: Arc<dyn SheetSink>,
        launcher: Arc<dyn BrowserLauncher>,
    ) -> Result<Self> {
        let limiter: Arc<dyn RateLimiter> =
            Arc::new(FixedWindowLimiter::from_config(&config.rate_limit));
        let places = Arc::new(PlacesClient::new(&config.places)?);
        Ok(Self::with_parts(config, source, sink, launcher, places, limiter))
    }

    pub fn with_parts(
        config: &EnrichConfig,
        source: Arc<dyn SheetSource>,
        sink: Arc<dyn SheetSink>,
        launcher: Arc<dyn BrowserLauncher>,
        places: Arc<PlacesClient>,
        limiter: Arc<dyn RateLimiter>,
    ) -> Self {
        Self {
            source,
            sink,
            resolver: PlaceResolver::new(places.clone(), limiter.clone()),
            fetcher: DetailFetcher::new(places, limiter),
            ecoregions: EcoregionLookup::new(launcher, config.ecoregion.clone()),
            layout: SheetLayout::from(&config.sheet),
            output: config.output.clone(),
        }
    }

    pub async fn run(&self, stage: Stage) -> Result<RunSummary> {
        tracing::info!("🚀 Starting enrichment run ({:?})", stage);
        let mut summary = RunSummary::start(stage);

        if stage.includes_details() {
            summary.details = Some(self.run_details().await?);
        }
        if stage.includes_ecoregions() {
            summary.ecoregions = Some(self.run_ecoregions().await?);
        }

        Ok(summary.finish())
    }

    /// Pipeline A: records -> place ids -> details, written in one call.
    pub async fn run_details(&self) -> Result<StageSummary> {
        let range = CellRange::parse(&self.output.details_range)?;
        let values = self.source.read_values().await?;
        let records = reader::read_locations(&values, &self.layout);
        tracing::info!("📥 {} location records", records.len());

        let place_ids = self.resolver.resolve_all(records).await;
        let resolved = StageSummary::tally(&place_ids);
        tracing::info!(
            "🔎 Place ids: {} resolved, {} not found, {} failed, {} skipped",
            resolved.resolved,
            resolved.not_found,
            resolved.failed,
            resolved.skipped
        );

        let details = self.fetcher.fetch_all(place_ids).await;
        let mut summary = StageSummary::tally(&details);

        let rows: Vec<Vec<String>> = details.iter().map(detail_row).collect();
        if rows.len() != range.height() {
            tracing::warn!(
                "⚠️ {} detail rows but range {} spans {} rows",
                rows.len(),
                range,
                range.height()
            );
        }

        let row_count = rows.len();
        match self.sink.write_range(&range, rows).await {
            Ok(()) => summary.rows_written = row_count,
            Err(e) => {
                tracing::error!("❌ Failed to write place details to {}: {}", range, e);
                summary.write_failures += 1;
            }
        }

        Ok(summary)
    }

    /// Pipeline B: one address at a time, each row written as soon as it is known.
    pub async fn run_ecoregions(&self) -> Result<StageSummary> {
        let values = self.source.read_values().await?;
        let addresses = reader::read_addresses(&values, &self.layout);

        let resume_from = self.output.resume_from.min(addresses.len());
        let mut row = self.output.ecoregion_first_row + resume_from as u32;
        tracing::info!(
            "🌿 Classifying {} addresses starting at row {}",
            addresses.len() - resume_from,
            row
        );

        let mut summary = StageSummary::default();
        for address in addresses.iter().skip(resume_from) {
            let range = CellRange::row_span(
                &self.output.ecoregion_start_column,
                &self.output.ecoregion_end_column,
                row,
            )?;

            // 空地址視為已處理，不開瀏覽器
            let outcome = if address.is_empty() {
                Lookup::Skipped
            } else {
                self.ecoregions.lookup(address).await
            };
            summary.record(outcome.kind());

            let cells = ecoregion_row(&outcome, range.width());
            match self.sink.write_range(&range, vec![cells]).await {
                Ok(()) => summary.rows_written += 1,
                Err(e) => {
                    tracing::error!("❌ Failed to write ecoregions to {}: {}", range, e);
                    summary.write_failures += 1;
                }
            }
            row += 1;
        }

        Ok(summary)
    }
}
