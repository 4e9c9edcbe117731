use super::*;
use job_scout::{
    PlatformAdapter, SearchRequest, SearchFilters,
    fetcher::HttpFetcher,
    platforms::{DouAdapter, PlatformConfig},
};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// DOU selectors pointed at a local server.
struct LocalBoard {
    config: PlatformConfig,
}

impl LocalBoard {
    fn new(base_url: &str) -> Self {
        let mut config = DouAdapter::new().config().clone();
        config.name = "Local Board".to_string();
        config.base_url = format!("{}/search", base_url);
        config.dynamic_wait = None;
        Self { config }
    }
}

impl PlatformAdapter for LocalBoard {
    fn id(&self) -> &'static str {
        "local"
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }

    fn build_search_url(&self, keywords: &[String], _location: Option<&str>) -> String {
        Url::parse_with_params(&self.config.base_url, [("q", keywords.join(" "))])
            .map(|u| u.to_string())
            .unwrap_or_else(|_| self.config.base_url.clone())
    }
}

fn local_service(server: &MockServer) -> anyhow::Result<SearchService> {
    let config = get_test_config();
    let fetcher = Arc::new(HttpFetcher::new(&config.scraper)?);
    let registry = PlatformRegistry::with_adapters(vec![Arc::new(LocalBoard::new(&server.uri()))]);
    Ok(SearchService::new(
        Arc::new(registry),
        JobScraperClient::new(fetcher, None),
        Duration::from_secs(5),
    ))
}

#[tokio::test]
async fn test_http_fetch_end_to_end() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "rust developer"))
        .and(header("cache-control", "no-cache"))
        .respond_with(ResponseTemplate::new(200).set_body_string(DOU_LISTING_HTML))
        .expect(1)
        .mount(&server)
        .await;

    let service = local_service(&server)?;
    let request = SearchRequest::new("rust developer").with_platforms(["local"]);
    let response = tokio_test::assert_ok!(service.search(&request).await);

    assert_eq!(response.total_count, 2);
    assert!(response.failed_platforms.is_empty());

    let job = &response.jobs[0];
    assert_eq!(job.platform, "Local Board");
    assert_eq!(job.salary.as_deref(), Some("$5000-6000"));
    assert_eq!(job.url, format!("{}/companies/acme/vacancies/101/", server.uri()));
    Ok(())
}

#[tokio::test]
async fn test_http_error_becomes_platform_failure() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let service = local_service(&server)?;
    let response = service.search(&SearchRequest::new("rust")).await?;

    assert_eq!(response.total_count, 0);
    assert_eq!(response.failed_platforms.len(), 1);
    assert_eq!(response.failed_platforms[0].platform, "local");
    assert!(response.failed_platforms[0].error.contains("HTTP 503"));
    Ok(())
}

#[tokio::test]
async fn test_rate_limit_reported() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let service = local_service(&server)?;
    let response = service.search(&SearchRequest::new("rust")).await?;

    assert!(response.failed_platforms[0].error.contains("RATE_LIMIT_ERROR"));
    Ok(())
}

#[tokio::test]
async fn test_one_failing_platform_does_not_sink_search() -> anyhow::Result<()> {
    let fetcher = Arc::new(StubFetcher::new(DOU_LISTING_HTML).failing_for("djinni.co"));
    let service = create_search_service(fetcher.clone());

    let response = service.search(&SearchRequest::new("python")).await?;

    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 4);
    assert_eq!(response.platforms, vec!["all"]);
    assert_eq!(response.total_count, 2);
    assert_eq!(response.failed_platforms.len(), 1);
    assert_eq!(response.failed_platforms[0].platform, "djinni");
    assert!(response.failed_platforms[0].error.contains("connection reset"));
    Ok(())
}

#[tokio::test]
async fn test_location_filter_across_platforms() -> anyhow::Result<()> {
    let service = create_search_service(Arc::new(StubFetcher::new(DOU_LISTING_HTML)));
    let filters = SearchFilters {
        location: Some("львів".to_string()),
        ..Default::default()
    };
    let request = SearchRequest::new("developer")
        .with_platforms(["dou", "linkedin"])
        .with_filters(filters);

    let response = service.search(&request).await?;

    assert_eq!(response.total_count, 1);
    assert_eq!(response.jobs[0].company, "Gamma");
    Ok(())
}
