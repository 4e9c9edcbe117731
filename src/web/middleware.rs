use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::Instrument;

use crate::models::generate_id;

/// Logs every request with its outcome, tagged with a per-request id.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = generate_id();
    let user_agent = request
        .headers()
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let span = tracing::info_span!("request", id = %request_id, method = %method, uri = %uri);
    async move {
        tracing::info!(user_agent = %user_agent, "Request started");

        let response = next.run(request).await;
        let status = response.status();
        let duration_ms = start.elapsed().as_millis();

        if status.is_server_error() {
            tracing::error!(status = %status, duration_ms = %duration_ms, "Request completed");
        } else if status.is_client_error() {
            tracing::warn!(status = %status, duration_ms = %duration_ms, "Request completed");
        } else {
            tracing::info!(status = %status, duration_ms = %duration_ms, "Request completed");
        }

        metrics::counter!(
            "job_scout_http_requests_total",
            "status" => status.as_u16().to_string()
        )
        .increment(1);
        response
    }
    .instrument(span)
    .await
}
