use crate::model::{OpportunityPage, RawOpportunity};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP status {status} for {url}: {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },
    #[error("Failed to decode {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// Remote error payload, when the server returned one.
    pub fn payload(&self) -> Option<&str> {
        match self {
            ApiError::Status { body, .. } if !body.is_empty() => Some(body.as_str()),
            _ => None,
        }
    }
}

#[async_trait]
pub trait OpportunityApi: Send + Sync {
    /// Fetches one page (1-based) of posted grant ids, sorted ascending.
    async fn fetch_opportunity_page(&self, page: u32) -> Result<OpportunityPage, ApiError>;

    /// Fetches one opportunity; `None` when the response carries no data.
    async fn fetch_opportunity(&self, id: &str) -> Result<Option<RawOpportunity>, ApiError>;
}
