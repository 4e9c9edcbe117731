use serde_json::{Map, json};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::extraction::{
    CssExtractionStrategy, ExtractionConfig, ExtractionStrategy, LlmExtractionStrategy,
    SelectorOverrides, StrategyKind,
};
use crate::fetcher::{FetchConfig, FetchResult, PageFetcher};
use crate::filter::filter_jobs;
use crate::models::{JobRecord, SearchFilters};
use crate::utils::error::{Result, ScrapingError};

#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    /// Selector to wait for before extracting.
    pub wait_for: Option<String>,
    pub wait_timeout: Option<Duration>,
    pub dynamic_wait: Option<Duration>,
    pub allow_fallback: bool,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            wait_for: None,
            wait_timeout: None,
            dynamic_wait: None,
            allow_fallback: true,
        }
    }
}

/// Fetch, extract, validate and filter one listing page.
///
/// Each client owns its CSS strategy; use [`for_platform`](Self::for_platform)
/// to get an independent client per platform.
#[derive(Clone)]
pub struct JobScraperClient {
    fetcher: Arc<dyn PageFetcher>,
    css_strategy: CssExtractionStrategy,
    llm_strategy: Option<LlmExtractionStrategy>,
    primary: StrategyKind,
}

impl JobScraperClient {
    pub fn new(fetcher: Arc<dyn PageFetcher>, llm_strategy: Option<LlmExtractionStrategy>) -> Self {
        Self {
            fetcher,
            css_strategy: CssExtractionStrategy::new(ExtractionConfig::default()),
            llm_strategy,
            primary: StrategyKind::Css,
        }
    }

    pub fn with_primary(mut self, primary: StrategyKind) -> Self {
        self.primary = primary;
        self
    }

    /// Copy of this client whose CSS strategy is configured for one platform.
    pub fn for_platform(&self, config: ExtractionConfig) -> Self {
        let mut client = self.clone();
        client.update_css_selectors(config.into());
        client
    }

    pub fn update_css_selectors(&mut self, overrides: SelectorOverrides) {
        self.css_strategy.configure_for_platform(overrides);
    }

    pub fn css_strategy(&self) -> &CssExtractionStrategy {
        &self.css_strategy
    }

    fn primary_strategy(&self) -> ExtractionStrategy {
        match (&self.primary, &self.llm_strategy) {
            (StrategyKind::Llm, Some(llm)) => ExtractionStrategy::Llm(llm.clone()),
            _ => ExtractionStrategy::Css(self.css_strategy.clone()),
        }
    }

    /// Generative strategy to retry with, unless it already ran as primary.
    fn fallback_strategy(&self, primary: StrategyKind) -> Option<ExtractionStrategy> {
        match (primary, &self.llm_strategy) {
            (StrategyKind::Css, Some(llm)) => Some(ExtractionStrategy::Llm(llm.clone())),
            _ => None,
        }
    }

    pub async fn scrape_jobs(
        &self,
        url: &str,
        platform: &str,
        criteria: &SearchFilters,
        options: &ScrapeOptions,
    ) -> Result<Vec<JobRecord>> {
        let primary = self.primary_strategy();
        let primary_kind = primary.kind();

        let mut config = FetchConfig::new(Arc::new(primary));
        config.cache_bypass = true;
        config.wait_for = options.wait_for.clone();
        config.wait_timeout = options.wait_timeout;
        config.dynamic_wait = options.dynamic_wait;

        debug!("Scraping {} ({}) with {} strategy", platform, url, primary_kind);
        let mut result = self.fetcher.fetch(url, &config).await;
        record_fetch(platform, self.fetcher.engine(), &result);

        if !result.success && options.allow_fallback {
            if let Some(fallback) = self.fallback_strategy(primary_kind) {
                warn!(
                    "{} extraction failed for {}: {}; retrying with {} strategy",
                    primary_kind,
                    platform,
                    result.error.as_deref().unwrap_or("unknown error"),
                    fallback.kind()
                );
                metrics::counter!("job_scout_fallbacks_total", "platform" => platform.to_string())
                    .increment(1);

                config.strategy = Arc::new(fallback);
                result = self.fetcher.fetch(url, &config).await;
                record_fetch(platform, self.fetcher.engine(), &result);
            }
        }

        if !result.success {
            let error = result.error.unwrap_or_else(|| "Unknown error".to_string());
            let mut details = Map::new();
            details.insert("platform".into(), json!(platform));
            details.insert("url".into(), json!(url));
            details.insert("error".into(), json!(error));
            let message = format!("Failed to scrape {}: {}", platform, error);
            return Err(ScrapingError::extraction(message, details).into());
        }

        let extracted = result.content.len();
        let mut jobs = Vec::with_capacity(extracted);
        for fields in &result.content {
            match JobRecord::from_field_map(fields, platform) {
                Ok(job) => jobs.push(job),
                Err(e) => {
                    debug!("Dropping invalid {} record: {}", platform, e);
                    metrics::counter!(
                        "job_scout_rejected_records_total",
                        "platform" => platform.to_string()
                    )
                    .increment(1);
                }
            }
        }

        let valid = jobs.len();
        let jobs = filter_jobs(jobs, criteria);
        info!(
            "{}: {} extracted, {} valid, {} after filtering ({}ms)",
            platform,
            extracted,
            valid,
            jobs.len(),
            result.response_time_ms
        );

        Ok(jobs)
    }
}

fn record_fetch(platform: &str, engine: &'static str, result: &FetchResult) {
    let outcome = if result.success { "success" } else { "failure" };
    metrics::counter!(
        "job_scout_fetches_total",
        "platform" => platform.to_string(),
        "engine" => engine,
        "outcome" => outcome
    )
    .increment(1);
}
