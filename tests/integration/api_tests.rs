use super::*;
use axum::http::{Method, StatusCode};
use serde_json::json;

fn default_app() -> Router {
    create_test_app(Arc::new(StubFetcher::new(DOU_LISTING_HTML)))
}

#[tokio::test]
async fn test_health_check() -> anyhow::Result<()> {
    let app = default_app();

    for uri in ["/health", "/health/"] {
        let response = make_request(&app, Method::GET, uri, None).await?;
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await?;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }
    Ok(())
}

#[tokio::test]
async fn test_list_platforms() -> anyhow::Result<()> {
    let app = default_app();

    let response = make_request(&app, Method::GET, "/platforms", None).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await?;
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["linkedin", "dou", "djinni", "workua"]);
    assert_eq!(body[1]["name"], "DOU");
    assert_eq!(body[1]["max_pages"], 10);
    Ok(())
}

#[tokio::test]
async fn test_search_returns_valid_jobs() -> anyhow::Result<()> {
    let app = default_app();
    let request = json!({"query": "rust developer", "platforms": ["dou"]});

    let response = make_request(&app, Method::POST, "/search", Some(request.to_string())).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await?;
    assert_eq!(body["query"], "rust developer");
    assert_eq!(body["platforms"], json!(["dou"]));
    // The QA listing has no requirements and is dropped
    assert_eq!(body["total_count"], 2);
    assert!(body.get("failed_platforms").is_none());

    let first = &body["jobs"][0];
    assert_eq!(first["title"], "Senior Rust Developer");
    assert_eq!(first["platform"], "DOU");
    assert_eq!(first["requirements"], json!(["5+ years of Rust", "Tokio"]));
    assert_eq!(first["url"], "https://jobs.dou.ua/companies/acme/vacancies/101/");
    assert_eq!(body["jobs"][1]["title"], "Python Developer");
    Ok(())
}

#[tokio::test]
async fn test_search_applies_filters() -> anyhow::Result<()> {
    let app = default_app();
    let request = json!({
        "query": "developer",
        "platforms": ["DOU"],
        "filters": {"remote": true, "keywords": ["rust"]}
    });

    let response = make_request(&app, Method::POST, "/search", Some(request.to_string())).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await?;
    assert_eq!(body["total_count"], 1);
    assert_eq!(body["jobs"][0]["company"], "Acme");
    Ok(())
}

#[tokio::test]
async fn test_search_rejects_empty_query() -> anyhow::Result<()> {
    let app = default_app();

    for query in ["", "   "] {
        let request = json!({"query": query});
        let body = Some(request.to_string());
        let response = make_request(&app, Method::POST, "/search", body).await?;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = read_json(response).await?;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["message"].as_str().unwrap().contains("query"));
    }
    Ok(())
}

#[tokio::test]
async fn test_search_rejects_malformed_body() -> anyhow::Result<()> {
    let app = default_app();

    let truncated = Some("{\"query\": ".to_string());
    let response = make_request(&app, Method::POST, "/search", truncated).await?;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let missing_query = Some(json!({"platforms": []}).to_string());
    let response = make_request(&app, Method::POST, "/search", missing_query).await?;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[tokio::test]
async fn test_search_rejects_unknown_platform() -> anyhow::Result<()> {
    let fetcher = Arc::new(StubFetcher::new(DOU_LISTING_HTML));
    let app = create_test_app(fetcher.clone());
    let request = json!({"query": "rust", "platforms": ["dou", "monster"]});

    let response = make_request(&app, Method::POST, "/search", Some(request.to_string())).await?;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = read_json(response).await?;
    assert!(body["error"]["message"].as_str().unwrap().contains("monster"));
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn test_metrics_route_absent_when_disabled() -> anyhow::Result<()> {
    let app = default_app();

    let response = make_request(&app, Method::GET, "/metrics", None).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}
