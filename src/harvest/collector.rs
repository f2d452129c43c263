//! Stage 1: paginated identifier collection.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, info, instrument};

use crate::config::HarvestConfig;
use crate::harvest::traits::{CollectError, HarvestStage};
use crate::model::OpportunityPage;
use crate::pacing::Pacer;
use crate::storage::{IdentifierBatch, IdentifierStore};
use crate::traits::{ApiError, OpportunityApi};

/// Walks the search endpoint page by page and persists every id it sees.
pub struct IdentifierCollector {
    api: Arc<dyn OpportunityApi>,
    store: Arc<dyn IdentifierStore>,
    pacer: Arc<dyn Pacer>,
    delay: Duration,
}

impl IdentifierCollector {
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
            delay: config.collect_delay,
        }
    }

    pub async fn fetch_opportunity_page(&self, page: u32) -> Result<OpportunityPage, ApiError> {
        self.api.fetch_opportunity_page(page).await
    }

    /// Collects ids from page 1 through the server-reported last page.
    ///
    /// The accumulated ids are always written to the store, even when a
    /// page request fails part way; the failure is returned afterwards.
    #[instrument(skip(self))]
    pub async fn fetch_all_opportunity_ids(&self) -> Result<IdentifierBatch, CollectError> {
        let mut ids = Vec::new();
        let mut page: u32 = 1;
        let mut failure = None;

        loop {
            match self.fetch_opportunity_page(page).await {
                Ok(result) => {
                    info!(
                        page,
                        total_pages = result.total_pages,
                        count = result.ids.len(),
                        "Fetched search page"
                    );
                    ids.extend(result.ids);

                    if page >= result.total_pages {
                        break;
                    }
                    page += 1;
                    self.pacer.wait(self.delay).await;
                }
                Err(err) => {
                    error!(
                        page,
                        collected = ids.len(),
                        payload = err.payload().unwrap_or("<none>"),
                        "Error fetching search page: {}",
                        err
                    );
                    failure = Some(err);
                    break;
                }
            }
        }

        let batch = IdentifierBatch::from(ids);
        self.store.save(&batch).await?;

        match failure {
            Some(source) => Err(CollectError::Aborted {
                page,
                collected: batch.len(),
                source,
            }),
            None => {
                info!(total = batch.len(), "Collected all opportunity ids");
                Ok(batch)
            }
        }
    }
}

#[async_trait]
impl HarvestStage for IdentifierCollector {
    type Input = ();
    type Output = IdentifierBatch;
    type Error = CollectError;

    async fn execute(&self, _input: ()) -> Result<IdentifierBatch, CollectError> {
        self.fetch_all_opportunity_ids().await
    }

    fn stage_name(&self) -> &'static str {
        "identifier_collector"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harvest::testing::{MockApi, RecordingPacer};
    use crate::storage::JsonFileStore;
    use tempfile::tempdir;

    fn collector(
        api: Arc<MockApi>,
        store: Arc<JsonFileStore>,
        pacer: Arc<RecordingPacer>,
    ) -> IdentifierCollector {
        IdentifierCollector::new(&HarvestConfig::default(), api, store, pacer)
    }

    #[tokio::test]
    async fn test_requests_every_page_in_order() {
        let dir = tempdir().unwrap();
        let api = Arc::new(
            MockApi::default()
                .with_page(1, &["1", "2"], 3)
                .with_page(2, &["3", "4"], 3)
                .with_page(3, &["5"], 3),
        );
        let store = Arc::new(JsonFileStore::new(dir.path().join("ids.json")));
        let pacer = Arc::new(RecordingPacer::default());

        let batch = collector(api.clone(), store.clone(), pacer.clone())
            .fetch_all_opportunity_ids()
            .await
            .unwrap();

        assert_eq!(api.requested_pages(), vec![1, 2, 3]);
        assert_eq!(batch.0, vec!["1", "2", "3", "4", "5"]);
        assert_eq!(store.load().await.unwrap(), batch);
        assert_eq!(pacer.waits(), vec![Duration::from_millis(300); 2]);
    }

    #[tokio::test]
    async fn test_single_page_when_total_is_zero() {
        let dir = tempdir().unwrap();
        let api = Arc::new(MockApi::default().with_page(1, &[], 0));
        let store = Arc::new(JsonFileStore::new(dir.path().join("ids.json")));

        let batch = collector(api.clone(), store.clone(), Arc::new(RecordingPacer::default()))
            .fetch_all_opportunity_ids()
            .await
            .unwrap();

        assert!(batch.is_empty());
        assert_eq!(api.requested_pages(), vec![1]);
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn test_failure_aborts_and_persists_partial_ids() {
        let dir = tempdir().unwrap();
        let api = Arc::new(
            MockApi::default()
                .with_page(1, &["a", "b"], 4)
                .with_failing_page(2)
                .with_page(3, &["c"], 4),
        );
        let store = Arc::new(JsonFileStore::new(dir.path().join("out/ids.json")));

        let err = collector(api.clone(), store.clone(), Arc::new(RecordingPacer::default()))
            .fetch_all_opportunity_ids()
            .await
            .unwrap_err();

        assert!(matches!(err, CollectError::Aborted { page: 2, collected: 2, .. }));
        assert_eq!(api.requested_pages(), vec![1, 2]);
        assert_eq!(store.load().await.unwrap().0, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_failure_on_first_page_writes_empty_file() {
        let dir = tempdir().unwrap();
        let api = Arc::new(MockApi::default().with_failing_page(1));
        let store = Arc::new(JsonFileStore::new(dir.path().join("ids.json")));

        let result = collector(api, store.clone(), Arc::new(RecordingPacer::default()))
            .execute(())
            .await;

        assert!(result.is_err());
        assert!(store.load().await.unwrap().is_empty());
    }
}
