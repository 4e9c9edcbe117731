// Shared fixtures for the HTTP-level tests.

pub mod api_tests;
pub mod search_tests;

use async_trait::async_trait;
use axum::{
    body::{Body, to_bytes},
    http::{Method, Request, Response},
    Router,
};
use job_scout::{
    AppConfig, JobScraperClient, PlatformRegistry, SearchService,
    config::{FetchEngine, LlmConfig, LoggingConfig, MetricsConfig, ScraperConfig, ServerConfig},
    extraction::StrategyKind,
    fetcher::{FetchConfig, FetchResult, PageFetcher},
    web::{AppState, create_router},
};
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tower::ServiceExt;
use url::Url;

/// Two DOU-style listings; the second one has no requirements block.
pub const DOU_LISTING_HTML: &str = r#"
<html><body><ul class="lt">
  <li class="l-vacancy">
    <div class="title"><a href="/companies/acme/vacancies/101/">Senior Rust Developer</a></div>
    <a class="company">Acme</a>
    <span class="cities">Київ, віддалено</span>
    <span class="salary">$5000-6000</span>
    <div class="text">Remote friendly team building async services</div>
    <div class="requirements">5+ years of Rust</div>
    <div class="requirements">Tokio</div>
  </li>
  <li class="l-vacancy">
    <div class="title"><a href="/companies/beta/vacancies/102/">QA Engineer</a></div>
    <a class="company">Beta</a>
    <span class="cities">Львів</span>
    <div class="text">Office based manual testing</div>
  </li>
  <li class="l-vacancy">
    <div class="title"><a href="/companies/gamma/vacancies/103/">Python Developer</a></div>
    <a class="company">Gamma</a>
    <span class="cities">Львів</span>
    <div class="text">Django backend in the office</div>
    <div class="requirements">Python 3</div>
  </li>
</ul></body></html>
"#;

pub fn get_test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            request_timeout: 30,
        },
        scraper: ScraperConfig {
            engine: FetchEngine::Http,
            primary_strategy: StrategyKind::Css,
            browser_pool_size: 1,
            request_timeout: 5,
            platform_timeout: 10,
            user_agent: "JobScout-Test/1.0".to_string(),
            chrome_path: None,
        },
        llm: LlmConfig {
            enabled: false,
            provider: "openai/gpt-4".to_string(),
            fallback_provider: None,
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            max_retries: 1,
            chunk_token_threshold: 1400,
            request_timeout: 5,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            directory: None,
            file_prefix: "job-scout-test.log".to_string(),
        },
        metrics: MetricsConfig {
            enabled: false,
            endpoint: "/metrics".to_string(),
        },
    }
}

/// Serves the same page for every URL, failing for URLs containing `fail_marker`.
pub struct StubFetcher {
    html: String,
    fail_marker: Option<String>,
    pub calls: AtomicUsize,
}

impl StubFetcher {
    pub fn new(html: &str) -> Self {
        Self {
            html: html.to_string(),
            fail_marker: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_for(mut self, marker: &str) -> Self {
        self.fail_marker = Some(marker.to_string());
        self
    }
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch(&self, url: &str, config: &FetchConfig) -> FetchResult {
        let started = Instant::now();
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_marker.as_deref().is_some_and(|m| url.contains(m)) {
            return FetchResult::failure(url, "NETWORK_ERROR: connection reset", None, started);
        }

        let page_url = Url::parse(url).ok();
        match config.strategy.extract(&self.html, page_url.as_ref()).await {
            Ok(content) => FetchResult {
                success: true,
                content,
                error: None,
                status_code: Some(200),
                final_url: url.to_string(),
                response_time_ms: started.elapsed().as_millis() as u64,
            },
            Err(e) => FetchResult::failure(url, e, Some(200), started),
        }
    }

    fn engine(&self) -> &'static str {
        "stub"
    }
}

pub fn create_search_service(fetcher: Arc<dyn PageFetcher>) -> SearchService {
    let client = JobScraperClient::new(fetcher, None);
    SearchService::new(Arc::new(PlatformRegistry::new()), client, Duration::from_secs(5))
}

pub fn create_test_app(fetcher: Arc<dyn PageFetcher>) -> Router {
    let state = AppState {
        search: Arc::new(create_search_service(fetcher)),
        config: Arc::new(get_test_config()),
        metrics: None,
    };
    create_router(state)
}

pub async fn make_request(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<String>,
) -> anyhow::Result<Response<Body>> {
    let mut request = Request::builder().method(method).uri(uri);
    if body.is_some() {
        request = request.header("content-type", "application/json");
    }
    let request = request.body(Body::from(body.unwrap_or_default()))?;

    let response = app.clone().oneshot(request).await?;
    Ok(response)
}

pub async fn read_json(response: Response<Body>) -> anyhow::Result<Value> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}
