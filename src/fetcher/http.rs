use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{CACHE_CONTROL, HeaderValue, PRAGMA};
use serde_json::{Map, json};
use std::time::Instant;
use tracing::debug;

use super::{FetchConfig, FetchResult, PageFetcher, extract_page};
use crate::config::ScraperConfig;
use crate::utils::error::{Result, ScrapingError};

/// Plain HTTP fetcher for server-rendered pages.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, config: &FetchConfig) -> FetchResult {
        let started = Instant::now();

        let mut request = self.client.get(url);
        if config.cache_bypass {
            request = request
                .header(CACHE_CONTROL, HeaderValue::from_static("no-cache"))
                .header(PRAGMA, HeaderValue::from_static("no-cache"));
        }
        if let Some(timeout) = config.wait_timeout {
            request = request.timeout(timeout);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let mut details = Map::new();
                details.insert("url".into(), json!(url));
                let error = ScrapingError::network(format!("Request failed: {}", e), details);
                return FetchResult::failure(url, error, None, started);
            }
        };

        let status = response.status();
        let final_url = response.url().to_string();
        debug!("GET {} -> {} in {}ms", url, status, started.elapsed().as_millis());

        if status == StatusCode::TOO_MANY_REQUESTS {
            let error = ScrapingError::rate_limit(format!("HTTP 429 from {}", url), Map::new());
            return FetchResult::failure(&final_url, error, Some(status.as_u16()), started);
        }
        if !status.is_success() {
            let message = format!("HTTP {} from {}", status.as_u16(), url);
            let error = ScrapingError::network(message, Map::new());
            return FetchResult::failure(&final_url, error, Some(status.as_u16()), started);
        }

        let html = match response.text().await {
            Ok(html) => html,
            Err(e) => {
                let message = format!("Failed to read body: {}", e);
                let error = ScrapingError::network(message, Map::new());
                return FetchResult::failure(&final_url, error, Some(status.as_u16()), started);
            }
        };

        extract_page(&html, final_url, Some(status.as_u16()), config, started).await
    }

    fn engine(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FetchEngine;
    use crate::extraction::{
        CssExtractionStrategy, ExtractionConfig, ExtractionStrategy, StrategyKind,
    };
    use std::sync::Arc;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn scraper_config() -> ScraperConfig {
        ScraperConfig {
            engine: FetchEngine::Http,
            primary_strategy: StrategyKind::Css,
            browser_pool_size: 1,
            request_timeout: 5,
            platform_timeout: 10,
            user_agent: "JobScout-Test/1.0".to_string(),
            chrome_path: None,
        }
    }

    fn fetch_config() -> FetchConfig {
        let strategy =
            ExtractionStrategy::Css(CssExtractionStrategy::new(ExtractionConfig::default()));
        FetchConfig::new(Arc::new(strategy))
    }

    const PAGE: &str = r#"
        <div class="job-posting">
          <h2 class="job-title">Backend Engineer</h2>
          <div class="company-name">Initech</div>
          <div class="job-location">Remote</div>
          <div class="job-description">APIs</div>
          <ul class="requirements"><li>Rust</li></ul>
          <a class="job-link" href="/jobs/42">Details</a>
        </div>
    "#;

    #[tokio::test]
    async fn test_fetch_and_extract() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jobs"))
            .and(header("cache-control", "no-cache"))
            .and(header("user-agent", "JobScout-Test/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&scraper_config()).unwrap();
        let result = fetcher.fetch(&format!("{}/jobs", server.uri()), &fetch_config()).await;

        assert!(result.success, "{:?}", result.error);
        assert_eq!(result.status_code, Some(200));
        assert_eq!(result.content.len(), 1);
        assert_eq!(result.content[0]["url"], format!("{}/jobs/42", server.uri()));
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&scraper_config()).unwrap();
        let result = fetcher.fetch(&server.uri(), &fetch_config()).await;

        assert!(!result.success);
        assert_eq!(result.status_code, Some(429));
        assert!(result.error.unwrap().starts_with("RATE_LIMIT_ERROR"));
    }

    #[tokio::test]
    async fn test_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&scraper_config()).unwrap();
        let result = fetcher.fetch(&server.uri(), &fetch_config()).await;

        assert!(!result.success);
        assert!(result.error.unwrap().starts_with("NETWORK_ERROR: HTTP 503"));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let fetcher = HttpFetcher::new(&scraper_config()).unwrap();
        let result = fetcher.fetch("http://127.0.0.1:1/", &fetch_config()).await;

        assert!(!result.success);
        assert!(result.content.is_empty());
        assert!(result.error.unwrap().starts_with("NETWORK_ERROR"));
    }

    #[tokio::test]
    async fn test_invalid_selector_reported_as_extraction_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&server)
            .await;

        let mut config = ExtractionConfig::default();
        config.base_selector = "div..broken".to_string();
        let strategy = ExtractionStrategy::Css(CssExtractionStrategy::new(config));
        let fetch_config = FetchConfig::new(Arc::new(strategy));

        let fetcher = HttpFetcher::new(&scraper_config()).unwrap();
        let result = fetcher.fetch(&server.uri(), &fetch_config).await;

        assert!(!result.success);
        assert!(result.error.unwrap().contains("div..broken"));
    }
}
