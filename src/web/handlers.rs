use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

use super::{AppState, HealthResponse, HttpError, PlatformInfo};
use crate::models::{SearchRequest, SearchResponse};

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

pub async fn search(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, HttpError> {
    let Json(request) =
        payload.map_err(|rejection| HttpError::unprocessable(rejection.body_text()))?;

    let response = state.search.search(&request).await?;
    tracing::info!(
        "Search '{}' returned {} job(s), {} platform failure(s)",
        response.query,
        response.total_count,
        response.failed_platforms.len()
    );
    Ok(Json(response))
}

pub async fn list_platforms(State(state): State<AppState>) -> Json<Vec<PlatformInfo>> {
    let platforms = state
        .search
        .registry()
        .all()
        .iter()
        .map(|adapter| PlatformInfo {
            id: adapter.id().to_string(),
            name: adapter.name().to_string(),
            base_url: adapter.config().base_url.clone(),
            max_pages: adapter.config().max_pages,
        })
        .collect();
    Json(platforms)
}

pub async fn render_metrics(State(state): State<AppState>) -> Result<String, HttpError> {
    state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .ok_or_else(|| HttpError::NotFound("Metrics are disabled".to_string()))
}
