//! Runtime configuration for both harvest stages.

use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.simpler.grants.gov";
pub const DEFAULT_PAGE_SIZE: u32 = 25;
pub const DEFAULT_COLLECT_DELAY: Duration = Duration::from_millis(300);
pub const DEFAULT_DETAIL_DELAY: Duration = Duration::from_millis(250);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_OUTPUT_DIR: &str = "data";

const IDS_FILE: &str = "opportunity_ids.json";
const DETAILS_FILE: &str = "opportunity_details.json";
const STATISTICS_FILE: &str = "statistics.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{var} must be a valid number, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{var} must be greater than zero")]
    Zero { var: &'static str },
}

/// Settings passed into each component at construction.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Root of the search and detail endpoints
    pub base_url: String,

    /// Static credential sent as `X-API-Key`; not validated locally
    pub api_key: String,

    /// Search results requested per page
    pub page_size: u32,

    /// Pause between search page requests
    pub collect_delay: Duration,

    /// Pause between detail requests
    pub detail_delay: Duration,

    /// Per-request HTTP timeout
    pub request_timeout: Duration,

    /// Directory holding the identifier, details and statistics files
    pub output_dir: PathBuf,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            page_size: DEFAULT_PAGE_SIZE,
            collect_delay: DEFAULT_COLLECT_DELAY,
            detail_delay: DEFAULT_DETAIL_DELAY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl HarvestConfig {
    /// Loads configuration from the environment, reading `.env` first if present.
    ///
    /// Unset variables fall back to the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_key = lookup("GRANTS_API_KEY").unwrap_or_default();
        if api_key.is_empty() {
            tracing::warn!("GRANTS_API_KEY is not set; the API will reject requests");
        }

        let page_size: u32 = parse_var(&lookup, "GRANTS_PAGE_SIZE")?.unwrap_or(defaults.page_size);
        if page_size == 0 {
            return Err(ConfigError::Zero {
                var: "GRANTS_PAGE_SIZE",
            });
        }

        Ok(Self {
            base_url: lookup("GRANTS_API_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            api_key,
            page_size,
            collect_delay: parse_var(&lookup, "GRANTS_COLLECT_DELAY_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.collect_delay),
            detail_delay: parse_var(&lookup, "GRANTS_DETAIL_DELAY_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.detail_delay),
            request_timeout: parse_var(&lookup, "GRANTS_REQUEST_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            output_dir: lookup("GRANTS_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_collect_delay(mut self, delay: Duration) -> Self {
        self.collect_delay = delay;
        self
    }

    pub fn with_detail_delay(mut self, delay: Duration) -> Self {
        self.detail_delay = delay;
        self
    }

    pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn ids_path(&self) -> PathBuf {
        self.output_dir.join(IDS_FILE)
    }

    pub fn details_path(&self) -> PathBuf {
        self.output_dir.join(DETAILS_FILE)
    }

    pub fn statistics_path(&self) -> PathBuf {
        self.output_dir.join(STATISTICS_FILE)
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { var, value }),
    }
}
