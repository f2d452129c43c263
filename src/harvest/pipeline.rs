//! Two-stage harvest pipeline executor.
//!
//! [`HarvestPipeline`] runs the identifier stage and hands its typed
//! [`IdentifierBatch`] straight to the detail stage, with:
//! - Async execution via `tokio`
//! - Structured logging via `tracing`
//! - Per-stage timing in [`PipelineStats`]
//!
//! The identifier stage still persists its batch, so the detail stage can
//! also be rerun on its own from the stored file.

use std::time::Instant;

use tracing::{error, info};

use crate::harvest::details::HarvestReport;
use crate::harvest::traits::HarvestStage;
use crate::storage::IdentifierBatch;

// ============================================================================
// Pipeline Types
// ============================================================================

/// Complete pipeline result with the harvest report and timing.
#[derive(Debug)]
pub struct PipelineResult {
    pub report: HarvestReport,
    pub stats: PipelineStats,
}

/// Statistics about the pipeline run.
#[derive(Debug, Default, Clone)]
pub struct PipelineStats {
    /// Total time spent on the whole run (milliseconds)
    pub total_duration_ms: u64,

    /// Time spent collecting ids (milliseconds)
    pub collection_duration_ms: u64,

    /// Time spent harvesting details (milliseconds)
    pub harvest_duration_ms: u64,

    /// Number of ids handed from the first stage to the second
    pub ids_collected: usize,
}

// ============================================================================
// Pipeline Errors
// ============================================================================

/// Errors that can occur during pipeline execution.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// Identifier stage failed
    #[error("Stage '{stage}' failed: {source}")]
    CollectionFailed {
        stage: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Detail stage failed
    #[error("Stage '{stage}' failed: {source}")]
    HarvestFailed {
        stage: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

// ============================================================================
// Pipeline Executor
// ============================================================================

/// Sequential collector → harvester pipeline.
///
/// # Example
///
/// ```ignore
/// let config = HarvestConfig::from_env()?;
/// let api: Arc<dyn OpportunityApi> = Arc::new(GrantsApiClient::new(&config)?);
/// let store: Arc<dyn IdentifierStore> = Arc::new(JsonFileStore::new(config.ids_path()));
/// let pacer: Arc<dyn Pacer> = Arc::new(TokioPacer);
///
/// let pipeline = HarvestPipeline::new(
///     IdentifierCollector::new(&config, api.clone(), store.clone(), pacer.clone()),
///     DetailHarvester::new(&config, api, store, pacer),
/// );
/// let result = pipeline.execute().await?;
/// println!("{} single-attachment grants", result.report.results.len());
/// ```
pub struct HarvestPipeline<C, H>
where
    C: HarvestStage<Input = (), Output = IdentifierBatch>,
    H: HarvestStage<Input = IdentifierBatch, Output = HarvestReport>,
{
    collector: C,
    harvester: H,
}

impl<C, H> HarvestPipeline<C, H>
where
    C: HarvestStage<Input = (), Output = IdentifierBatch>,
    H: HarvestStage<Input = IdentifierBatch, Output = HarvestReport>,
{
    pub fn new(collector: C, harvester: H) -> Self {
        Self {
            collector,
            harvester,
        }
    }

    /// Runs both stages. A collector failure stops the run before any
    /// detail request is made.
    pub async fn execute(&self) -> Result<PipelineResult, PipelineError> {
        let start = Instant::now();
        let mut stats = PipelineStats::default();

        // ====================================================================
        // Stage 1: Identifier collection
        // ====================================================================

        info!(stage = self.collector.stage_name(), "Starting stage");
        let collection_start = Instant::now();

        let batch = self.collector.execute(()).await.map_err(|e| {
            error!(stage = self.collector.stage_name(), "Stage failed: {}", e);
            PipelineError::CollectionFailed {
                stage: self.collector.stage_name(),
                source: Box::new(e),
            }
        })?;

        stats.collection_duration_ms = collection_start.elapsed().as_millis() as u64;
        stats.ids_collected = batch.len();
        info!(
            duration_ms = stats.collection_duration_ms,
            ids = stats.ids_collected,
            "Collection completed"
        );

        // ====================================================================
        // Stage 2: Detail harvest
        // ====================================================================

        info!(stage = self.harvester.stage_name(), "Starting stage");
        let harvest_start = Instant::now();

        let report = self.harvester.execute(batch).await.map_err(|e| {
            PipelineError::HarvestFailed {
                stage: self.harvester.stage_name(),
                source: Box::new(e),
            }
        })?;

        stats.harvest_duration_ms = harvest_start.elapsed().as_millis() as u64;
        info!(
            duration_ms = stats.harvest_duration_ms,
            processed = report.statistics.total_opportunities_processed,
            single_attachment = report.results.len(),
            "Harvest completed"
        );

        stats.total_duration_ms = start.elapsed().as_millis() as u64;

        Ok(PipelineResult { report, stats })
    }
}

// ============================================================================
// Tests
// ============================================================================
