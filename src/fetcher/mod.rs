//! Page fetching. A fetcher loads a URL, runs the configured extraction
//! strategy over the result and reports the outcome as a [`FetchResult`].

use async_trait::async_trait;
use serde_json::Map;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

use crate::extraction::ExtractionStrategy;
use crate::models::FieldMap;
use crate::utils::error::ScrapingError;

pub mod browser;
pub mod http;

pub use browser::{BrowserFetcher, BrowserPool};
pub use http::HttpFetcher;

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub strategy: Arc<ExtractionStrategy>,
    /// Ask intermediaries for a fresh copy.
    pub cache_bypass: bool,
    pub wait_for: Option<String>,
    pub wait_timeout: Option<Duration>,
    pub dynamic_wait: Option<Duration>,
}

impl FetchConfig {
    pub fn new(strategy: Arc<ExtractionStrategy>) -> Self {
        Self {
            strategy,
            cache_bypass: true,
            wait_for: None,
            wait_timeout: None,
            dynamic_wait: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchResult {
    pub success: bool,
    /// Field maps produced by the strategy.
    pub content: Vec<FieldMap>,
    pub error: Option<String>,
    pub status_code: Option<u16>,
    pub final_url: String,
    pub response_time_ms: u64,
}

impl FetchResult {
    pub fn failure(
        url: &str,
        error: impl ToString,
        status_code: Option<u16>,
        started: Instant,
    ) -> Self {
        Self {
            success: false,
            content: Vec::new(),
            error: Some(error.to_string()),
            status_code,
            final_url: url.to_string(),
            response_time_ms: started.elapsed().as_millis() as u64,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Never fails outright; problems are reported through `success` and `error`.
    async fn fetch(&self, url: &str, config: &FetchConfig) -> FetchResult;

    fn engine(&self) -> &'static str;
}

/// Runs the strategy over fetched HTML and wraps the outcome.
pub(crate) async fn extract_page(
    html: &str,
    final_url: String,
    status_code: Option<u16>,
    config: &FetchConfig,
    started: Instant,
) -> FetchResult {
    let page_url = Url::parse(&final_url).ok();
    match config.strategy.extract(html, page_url.as_ref()).await {
        Ok(content) => FetchResult {
            success: true,
            content,
            error: None,
            status_code,
            final_url,
            response_time_ms: started.elapsed().as_millis() as u64,
        },
        Err(e) => {
            let error = ScrapingError::extraction(e.to_string(), Map::new());
            FetchResult::failure(&final_url, error, status_code, started)
        }
    }
}
