//! Collects every posted grant id and writes them to the identifier file.

use std::sync::Arc;

use anyhow::{Context, Result};
use grant_harvester::{
    logging, GrantsApiClient, HarvestConfig, IdentifierCollector, JsonFileStore, TokioPacer,
};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_tracing();

    let config = HarvestConfig::from_env().context("Failed to load configuration")?;
    let api = GrantsApiClient::new(&config).context("Failed to build HTTP client")?;
    let collector = IdentifierCollector::new(
        &config,
        Arc::new(api),
        Arc::new(JsonFileStore::new(config.ids_path())),
        Arc::new(TokioPacer),
    );

    let batch = collector
        .fetch_all_opportunity_ids()
        .await
        .context("Identifier collection failed")?;

    tracing::info!(
        total = batch.len(),
        path = %config.ids_path().display(),
        "Identifier collection finished"
    );
    Ok(())
}
