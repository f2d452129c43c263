//! Runs identifier collection and detail harvesting back to back.

use std::sync::Arc;

use anyhow::{Context, Result};
use grant_harvester::{
    logging, DetailHarvester, GrantsApiClient, HarvestConfig, HarvestPipeline, IdentifierCollector,
    IdentifierStore, JsonFileStore, OpportunityApi, Pacer, TokioPacer,
};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_tracing();

    let config = HarvestConfig::from_env().context("Failed to load configuration")?;
    let api: Arc<dyn OpportunityApi> =
        Arc::new(GrantsApiClient::new(&config).context("Failed to build HTTP client")?);
    let store: Arc<dyn IdentifierStore> = Arc::new(JsonFileStore::new(config.ids_path()));
    let pacer: Arc<dyn Pacer> = Arc::new(TokioPacer);

    let pipeline = HarvestPipeline::new(
        IdentifierCollector::new(&config, api.clone(), store.clone(), pacer.clone()),
        DetailHarvester::new(&config, api, store, pacer),
    );
    let result = pipeline.execute().await.context("Harvest pipeline failed")?;

    tracing::info!(
        ids = result.stats.ids_collected,
        single_attachment = result.report.results.len(),
        total_ms = result.stats.total_duration_ms,
        "Pipeline finished"
    );
    Ok(())
}
