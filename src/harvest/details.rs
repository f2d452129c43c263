//! Stage 2: per-opportunity detail harvesting, filtering and statistics.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use crate::config::HarvestConfig;
use crate::harvest::stats::{StatisticsAccumulator, StatisticsSummary};
use crate::harvest::traits::{HarvestError, HarvestStage};
use crate::model::{FilteredOpportunity, OpportunityDetail};
use crate::pacing::Pacer;
use crate::storage::{write_json, IdentifierBatch, IdentifierStore};
use crate::traits::{ApiError, OpportunityApi};

/// Outcome of one detail harvesting run.
#[derive(Debug, Clone)]
pub struct HarvestReport {
    /// Opportunities with exactly one downloadable attachment
    pub results: Vec<FilteredOpportunity>,

    pub statistics: StatisticsSummary,

    /// Ids whose response carried no data
    pub skipped: usize,

    /// Ids whose request failed
    pub failed: usize,
}

pub struct DetailHarvester {
    api: Arc<dyn OpportunityApi>,
    store: Arc<dyn IdentifierStore>,
    pacer: Arc<dyn Pacer>,
    delay: Duration,
    details_path: PathBuf,
    statistics_path: PathBuf,
}

impl DetailHarvester {
    pub fn new(
        config: &HarvestConfig,
        api: Arc<dyn OpportunityApi>,
        store: Arc<dyn IdentifierStore>,
        pacer: Arc<dyn Pacer>,
    ) -> Self {
        Self {
            api,
            store,
            pacer,
            delay: config.detail_delay,
            details_path: config.details_path(),
            statistics_path: config.statistics_path(),
        }
    }

    /// Fetches one opportunity and derives its attachment summary.
    ///
    /// Returns `Ok(None)` when the API responds without a data payload.
    pub async fn fetch_opportunity_details(
        &self,
        id: &str,
    ) -> Result<Option<OpportunityDetail>, ApiError> {
        let raw = self.api.fetch_opportunity(id).await?;
        Ok(raw.map(OpportunityDetail::from))
    }

    /// Loads ids from the store, then harvests them.
    ///
    /// Fails before any request if the identifier input is missing.
    pub async fn process_opportunities(&self) -> Result<HarvestReport, HarvestError> {
        let batch = self.store.load().await?;
        info!(count = batch.len(), "Loaded opportunity ids");
        self.process(&batch).await
    }

    /// Harvests `batch` in order; failed or empty ids are skipped.
    #[instrument(skip(self, batch), fields(count = batch.len()))]
    pub async fn process(&self, batch: &IdentifierBatch) -> Result<HarvestReport, HarvestError> {
        let mut stats = StatisticsAccumulator::new();
        let mut results = Vec::new();
        let mut skipped = 0;
        let mut failed = 0;

        for (index, id) in batch.iter().enumerate() {
            if index > 0 {
                self.pacer.wait(self.delay).await;
            }

            let detail = match self.fetch_opportunity_details(id).await {
                Ok(Some(detail)) => detail,
                Ok(None) => {
                    debug!(id = %id, "No data for opportunity");
                    skipped += 1;
                    continue;
                }
                Err(err) => {
                    warn!(
                        id = %id,
                        payload = err.payload().unwrap_or("<none>"),
                        "Error fetching details for opportunity: {}",
                        err
                    );
                    failed += 1;
                    continue;
                }
            };

            stats.record(&detail);
            if let Some(filtered) = detail.as_filtered() {
                results.push(filtered);
            }

            if stats.total() % 100 == 0 {
                info!(processed = stats.total(), of = batch.len(), "Harvest progress");
            }
        }

        let statistics = stats.summary(Utc::now());
        write_json(&self.details_path, &results).await?;
        write_json(&self.statistics_path, &statistics).await?;

        info!(
            processed = statistics.total_opportunities_processed,
            single_attachment = results.len(),
            skipped,
            failed,
            details = %self.details_path.display(),
            statistics = %self.statistics_path.display(),
            "Detail harvest complete"
        );

        Ok(HarvestReport {
            results,
            statistics,
            skipped,
            failed,
        })
    }
}

#[async_trait]
impl HarvestStage for DetailHarvester {
    type Input = IdentifierBatch;
    type Output = HarvestReport;
    type Error = HarvestError;

    async fn execute(&self, input: IdentifierBatch) -> Result<HarvestReport, HarvestError> {
        self.process(&input).await
    }

    fn stage_name(&self) -> &'static str {
        "detail_harvester"
    }
}
