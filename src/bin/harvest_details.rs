//! Harvests details for every id in the identifier file.

use std::sync::Arc;

use anyhow::{Context, Result};
use grant_harvester::{
    logging, DetailHarvester, GrantsApiClient, HarvestConfig, JsonFileStore, TokioPacer,
};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_tracing();

    let config = HarvestConfig::from_env().context("Failed to load configuration")?;
    let api = GrantsApiClient::new(&config).context("Failed to build HTTP client")?;
    let harvester = DetailHarvester::new(
        &config,
        Arc::new(api),
        Arc::new(JsonFileStore::new(config.ids_path())),
        Arc::new(TokioPacer),
    );

    let report = harvester
        .process_opportunities()
        .await
        .context("Detail harvest failed")?;

    tracing::info!(
        processed = report.statistics.total_opportunities_processed,
        single_attachment = report.results.len(),
        skipped = report.skipped,
        failed = report.failed,
        "Detail harvest finished"
    );
    Ok(())
}
