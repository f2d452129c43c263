//! In-memory API and pacer doubles shared by the stage tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::model::{OpportunityPage, RawAttachment, RawOpportunity};
use crate::pacing::Pacer;
use crate::traits::{ApiError, OpportunityApi};

enum Detail {
    Found(RawOpportunity),
    Empty,
    Fail,
}

#[derive(Default)]
pub struct MockApi {
    pages: HashMap<u32, Option<OpportunityPage>>,
    details: HashMap<String, Detail>,
    page_log: Mutex<Vec<u32>>,
    detail_log: Mutex<Vec<String>>,
}

impl MockApi {
    pub fn with_page(mut self, page: u32, ids: &[&str], total_pages: u32) -> Self {
        let ids = ids.iter().map(|s| s.to_string()).collect();
        self.pages.insert(page, Some(OpportunityPage { ids, total_pages }));
        self
    }

    pub fn with_failing_page(mut self, page: u32) -> Self {
        self.pages.insert(page, None);
        self
    }

    /// Registers a detail record; each attachment is `(mime_type, download_path)`.
    pub fn with_detail(mut self, id: &str, attachments: &[(Option<&str>, &str)]) -> Self {
        let raw = RawOpportunity {
            opportunity_id: id.to_string(),
            opportunity_title: Some(format!("Opportunity {}", id)),
            attachments: attachments
                .iter()
                .enumerate()
                .map(|(i, (mime, path))| RawAttachment {
                    mime_type: mime.map(str::to_string),
                    file_description: Some(format!("{} attachment {}", id, i)),
                    download_path: Some(path.to_string()),
                })
                .collect(),
        };
        self.details.insert(id.to_string(), Detail::Found(raw));
        self
    }

    pub fn with_empty_detail(mut self, id: &str) -> Self {
        self.details.insert(id.to_string(), Detail::Empty);
        self
    }

    pub fn with_failing_detail(mut self, id: &str) -> Self {
        self.details.insert(id.to_string(), Detail::Fail);
        self
    }

    pub fn requested_pages(&self) -> Vec<u32> {
        self.page_log.lock().unwrap().clone()
    }

    pub fn requested_ids(&self) -> Vec<String> {
        self.detail_log.lock().unwrap().clone()
    }

    fn server_error(what: String) -> ApiError {
        ApiError::Status {
            status: 500,
            url: format!("mock://{}", what),
            body: r#"{"message":"Internal Server Error"}"#.to_string(),
        }
    }
}

#[async_trait]
impl OpportunityApi for MockApi {
    async fn fetch_opportunity_page(&self, page: u32) -> Result<OpportunityPage, ApiError> {
        self.page_log.lock().unwrap().push(page);
        match self.pages.get(&page) {
            Some(Some(result)) => Ok(result.clone()),
            _ => Err(Self::server_error(format!("search/{}", page))),
        }
    }

    async fn fetch_opportunity(&self, id: &str) -> Result<Option<RawOpportunity>, ApiError> {
        self.detail_log.lock().unwrap().push(id.to_string());
        match self.details.get(id) {
            Some(Detail::Found(raw)) => Ok(Some(raw.clone())),
            Some(Detail::Empty) => Ok(None),
            Some(Detail::Fail) | None => Err(Self::server_error(format!("opportunities/{}", id))),
        }
    }
}

/// Records requested delays instead of sleeping.
#[derive(Default)]
pub struct RecordingPacer {
    waits: Mutex<Vec<Duration>>,
}

impl RecordingPacer {
    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }
}

#[async_trait]
impl Pacer for RecordingPacer {
    async fn wait(&self, delay: Duration) {
        self.waits.lock().unwrap().push(delay);
    }
}
