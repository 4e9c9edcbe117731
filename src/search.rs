use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use validator::Validate;

use crate::config::{AppConfig, FetchEngine};
use crate::extraction::{LlmExtractionStrategy, LlmSettings, OpenAiBackend};
use crate::fetcher::{BrowserFetcher, HttpFetcher, PageFetcher};
use crate::models::{JobRecord, PlatformFailure, SearchFilters, SearchRequest, SearchResponse};
use crate::platforms::PlatformRegistry;
use crate::platforms::registry::PlatformAdapterRef;
use crate::scraper::{JobScraperClient, ScrapeOptions};
use crate::utils::error::{AppError, Result};

/// Runs one search request across the selected platforms.
#[derive(Clone)]
pub struct SearchService {
    registry: Arc<PlatformRegistry>,
    client: JobScraperClient,
    platform_timeout: Duration,
    wait_timeout: Duration,
}

impl SearchService {
    pub fn new(
        registry: Arc<PlatformRegistry>,
        client: JobScraperClient,
        platform_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            client,
            platform_timeout,
            wait_timeout: platform_timeout,
        }
    }

    pub fn with_wait_timeout(mut self, wait_timeout: Duration) -> Self {
        self.wait_timeout = wait_timeout;
        self
    }

    /// Wires fetcher, strategies and registry from configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let fetcher: Arc<dyn PageFetcher> = match config.scraper.engine {
            FetchEngine::Browser => Arc::new(BrowserFetcher::new(&config.scraper)?),
            FetchEngine::Http => Arc::new(HttpFetcher::new(&config.scraper)?),
        };

        let llm_strategy = if config.llm.enabled {
            if config.llm.api_key.is_none() {
                warn!("LLM extraction enabled without an API key");
            }
            let backend = OpenAiBackend::from_config(&config.llm)?;
            Some(LlmExtractionStrategy::new(Arc::new(backend), LlmSettings::from(&config.llm)))
        } else {
            None
        };

        let client = JobScraperClient::new(fetcher, llm_strategy)
            .with_primary(config.scraper.primary_strategy);
        info!(
            "Search service ready: engine={:?}, primary={}, llm_fallback={}",
            config.scraper.engine, config.scraper.primary_strategy, config.llm.enabled
        );

        Ok(Self::new(Arc::new(PlatformRegistry::new()), client, config.scraper.platform_timeout())
            .with_wait_timeout(config.scraper.request_timeout()))
    }

    pub fn registry(&self) -> &PlatformRegistry {
        &self.registry
    }

    /// Validates the request, scrapes every platform concurrently and merges
    /// the results in platform order. A failing platform contributes no jobs
    /// and is listed in `failed_platforms`.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        request.validate()?;
        if request.query.trim().is_empty() {
            return Err(AppError::Validation("invalid fields: query".to_string()));
        }

        let adapters = self.registry.resolve(&request.platforms)?;
        let keywords = request.query_keywords();
        let filters = request.filters.clone().unwrap_or_default();

        info!(
            "Searching '{}' on {}",
            request.query,
            adapters.iter().map(|a| a.id()).collect::<Vec<_>>().join(", ")
        );

        let runs = adapters
            .iter()
            .map(|adapter| self.scrape_platform(adapter, &keywords, &filters));
        let outcomes = join_all(runs).await;

        let mut jobs = Vec::new();
        let mut failed_platforms = Vec::new();
        for (adapter, outcome) in adapters.iter().zip(outcomes) {
            match outcome {
                Ok(platform_jobs) => jobs.extend(platform_jobs),
                Err(e) => {
                    warn!("Platform {} failed: {}", adapter.id(), e);
                    failed_platforms.push(PlatformFailure {
                        platform: adapter.id().to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(SearchResponse {
            total_count: jobs.len(),
            jobs,
            query: request.query.clone(),
            platforms: request.platforms.clone(),
            failed_platforms,
        })
    }

    async fn scrape_platform(
        &self,
        adapter: &PlatformAdapterRef,
        keywords: &[String],
        filters: &SearchFilters,
    ) -> Result<Vec<JobRecord>> {
        let platform = adapter.config();
        let url = adapter.build_search_url(keywords, filters.location.as_deref());
        let client = self.client.for_platform(adapter.extraction_config());

        let options = ScrapeOptions {
            wait_for: platform.wait_for.clone(),
            wait_timeout: Some(self.wait_timeout),
            dynamic_wait: platform
                .dynamic_wait
                .filter(|secs| secs.is_finite() && *secs > 0.0)
                .map(Duration::from_secs_f64),
            allow_fallback: true,
        };

        tokio::time::timeout(
            self.platform_timeout,
            client.scrape_jobs(&url, adapter.name(), filters, &options),
        )
        .await
        .map_err(|_| AppError::Timeout(self.platform_timeout))?
    }
}
