//! HTTP implementation of [`OpportunityApi`] backed by `reqwest`.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::config::HarvestConfig;
use crate::model::{
    DetailResponse, OpportunityPage, RawOpportunity, SearchRequest, SearchResponse,
};
use crate::traits::{ApiError, OpportunityApi};

const API_KEY_HEADER: &str = "X-API-Key";

pub struct GrantsApiClient {
    client: reqwest::Client,
    base_url: String,
    page_size: u32,
}

impl GrantsApiClient {
    pub fn new(config: &HarvestConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        // A key with invalid header bytes is sent as nothing and surfaces as a 401.
        if let Ok(value) = HeaderValue::from_str(&config.api_key) {
            headers.insert(API_KEY_HEADER, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .user_agent(concat!("grant-harvester/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            page_size: config.page_size,
        })
    }

    fn search_url(&self) -> String {
        format!("{}/v1/opportunities/search", self.base_url)
    }

    fn detail_url(&self, id: &str) -> String {
        format!("{}/v1/opportunities/{}", self.base_url, id)
    }

    async fn read_json<T: DeserializeOwned>(
        resp: reqwest::Response,
        context: String,
    ) -> Result<T, ApiError> {
        let status = resp.status();
        let url = resp.url().to_string();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url,
                body,
            });
        }

        serde_json::from_str(&body).map_err(|source| ApiError::Decode { context, source })
    }
}

#[async_trait]
impl OpportunityApi for GrantsApiClient {
    #[instrument(skip(self))]
    async fn fetch_opportunity_page(&self, page: u32) -> Result<OpportunityPage, ApiError> {
        let resp = self
            .client
            .post(self.search_url())
            .json(&SearchRequest::posted_grants(page, self.page_size))
            .send()
            .await?;

        let parsed: SearchResponse =
            Self::read_json(resp, format!("search page {}", page)).await?;
        debug!(
            hits = parsed.data.len(),
            total_pages = parsed.pagination_info.total_pages,
            total_records = ?parsed.pagination_info.total_records,
            "Search page received"
        );

        Ok(OpportunityPage {
            ids: parsed.data.into_iter().map(|hit| hit.opportunity_id).collect(),
            total_pages: parsed.pagination_info.total_pages,
        })
    }

    #[instrument(skip(self))]
    async fn fetch_opportunity(&self, id: &str) -> Result<Option<RawOpportunity>, ApiError> {
        let resp = self.client.get(self.detail_url(id)).send().await?;
        let parsed: DetailResponse = Self::read_json(resp, format!("opportunity {}", id)).await?;
        Ok(parsed.data)
    }
}
