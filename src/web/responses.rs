use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

use crate::utils::error::{AppError, ScrapingErrorKind};

/// Error envelope shared by every failing endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiResponse {
    pub fn error(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Option<Value>,
    ) -> Self {
        ApiResponse {
            success: false,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
                details,
            }),
            timestamp: chrono::Utc::now(),
        }
    }
}

/// Error returned by handlers. Internal failures never expose their message.
#[derive(Debug)]
pub enum HttpError {
    NotFound(String),
    UnprocessableEntity { message: String, details: Option<Value> },
    InternalServerError,
    ServiceUnavailable(String),
}

impl HttpError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            HttpError::NotFound(_) => StatusCode::NOT_FOUND,
            HttpError::UnprocessableEntity { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            HttpError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            HttpError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            HttpError::NotFound(_) => "NOT_FOUND",
            HttpError::UnprocessableEntity { .. } => "VALIDATION_ERROR",
            HttpError::InternalServerError => "INTERNAL_SERVER_ERROR",
            HttpError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    pub fn message(&self) -> String {
        match self {
            HttpError::NotFound(msg) | HttpError::ServiceUnavailable(msg) => msg.clone(),
            HttpError::UnprocessableEntity { message, .. } => message.clone(),
            HttpError::InternalServerError => "Internal server error".to_string(),
        }
    }

    pub fn unprocessable(msg: impl Into<String>) -> Self {
        Self::UnprocessableEntity {
            message: msg.into(),
            details: None,
        }
    }
}

impl From<AppError> for HttpError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Validation(message) => HttpError::UnprocessableEntity {
                message,
                details: None,
            },
            AppError::Scraping(e) if e.kind == ScrapingErrorKind::Validation => {
                HttpError::UnprocessableEntity {
                    message: e.message.clone(),
                    details: Some(Value::Object(e.details)),
                }
            }
            AppError::Timeout(_) => HttpError::ServiceUnavailable("Search timed out".to_string()),
            other => {
                error!("Request failed: {}", other);
                HttpError::InternalServerError
            }
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let details = match &self {
            HttpError::UnprocessableEntity { details, .. } => details.clone(),
            _ => None,
        };
        let body = ApiResponse::error(self.error_code(), self.message(), details);
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlatformInfo {
    pub id: String,
    pub name: String,
    pub base_url: String,
    pub max_pages: u32,
}
