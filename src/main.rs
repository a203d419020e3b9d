use anyhow::Context;
use clap::Parser;
use place_enrich::config::SheetBackend;
use place_enrich::domain::ports::{SheetSink, SheetSource};
use place_enrich::utils::logger;
use place_enrich::{
    CliArgs, CsvSheet, EnrichConfig, EnrichError, EnrichmentEngine, GoogleSheet, RunSummary,
    WebDriverLauncher,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose, args.log_json);
    tracing::info!("Starting place-enrich");

    let mut config = match &args.config {
        Some(path) => EnrichConfig::from_file(path)
            .with_context(|| format!("failed to load config file {}", path.display()))?,
        None => EnrichConfig::default(),
    };
    args.apply_to(&mut config);

    let backend = if args.csv.is_some() {
        SheetBackend::LocalCsv
    } else {
        SheetBackend::GoogleSheets
    };
    if let Err(e) = config.validate_for(args.stage, backend) {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(e.exit_code());
    }

    let (source, sink): (Arc<dyn SheetSource>, Arc<dyn SheetSink>) = match &args.csv {
        Some(path) => {
            let sheet = Arc::new(CsvSheet::open(path)?);
            tracing::info!("📁 Using local CSV sheet {}", sheet.path().display());
            let source: Arc<dyn SheetSource> = sheet.clone();
            let sink: Arc<dyn SheetSink> = sheet;
            (source, sink)
        }
        None => {
            let sheet = Arc::new(GoogleSheet::new(&config.sheet)?);
            let source: Arc<dyn SheetSource> = sheet.clone();
            let sink: Arc<dyn SheetSink> = sheet;
            (source, sink)
        }
    };
    let launcher = Arc::new(WebDriverLauncher::new(&config.ecoregion));

    let engine = match EnrichmentEngine::new(&config, source, sink, launcher) {
        Ok(engine) => engine,
        Err(e) => exit_with(e),
    };

    match engine.run(args.stage).await {
        Ok(summary) => {
            report(&summary);
            println!("✅ Enrichment completed");
        }
        Err(e) => exit_with(e),
    }

    Ok(())
}

fn report(summary: &RunSummary) {
    for (name, stage) in [("details", &summary.details), ("ecoregions", &summary.ecoregions)] {
        if let Some(stage) = stage {
            tracing::info!(
                "📊 {}: {} total, {} resolved, {} not found, {} failed, {} skipped, {} rows written, {} write failures",
                name,
                stage.total,
                stage.resolved,
                stage.not_found,
                stage.failed,
                stage.skipped,
                stage.rows_written,
                stage.write_failures
            );
        }
    }
    if let Some(finished_at) = summary.finished_at {
        tracing::info!("⏱️ Finished in {}s", (finished_at - summary.started_at).num_seconds());
    }
}

fn exit_with(e: EnrichError) -> ! {
    tracing::error!("❌ Enrichment failed: {}", e);
    eprintln!("❌ {}", e);
    std::process::exit(e.exit_code());
}
