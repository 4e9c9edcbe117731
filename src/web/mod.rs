use axum::{
    Router,
    http::StatusCode,
    middleware::from_fn,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::CorsLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::AppConfig;
use crate::search::SearchService;

pub mod handlers;
pub mod middleware;
pub mod responses;

pub use handlers::{health_check, list_platforms, render_metrics, search};
pub use middleware::request_logging;
pub use responses::*;

#[derive(Clone)]
pub struct AppState {
    pub search: Arc<SearchService>,
    pub config: Arc<AppConfig>,
    pub metrics: Option<PrometheusHandle>,
}

pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(health_check))
        .route("/health/", get(health_check))
        .route("/search", post(search))
        .route("/platforms", get(list_platforms));

    if state.config.metrics.enabled && state.metrics.is_some() {
        router = router.route(&state.config.metrics.endpoint, get(render_metrics));
    }

    let request_timeout = Duration::from_secs(state.config.server.request_timeout);

    router
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(TimeoutLayer::new(request_timeout))
                .layer(CompressionLayer::new())
                .layer(CorsLayer::permissive())
                .layer(from_fn(request_logging)),
        )
        .with_state(state)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("Handler panicked: {}", detail);

    let body = ApiResponse::error("INTERNAL_SERVER_ERROR", "Internal server error", None);
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
}
