use serde_json::{Map, Value, json};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Scraping(#[from] ScrapingError),

    #[error("Parsing error: {message}")]
    Parse { message: String },

    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("LLM error: {provider}: {message}")]
    Llm { provider: String, message: String },

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let fields = invalid_fields(&err);
        AppError::Validation(format!("invalid fields: {}", fields.join(", ")))
    }
}

/// Sorted names of the fields that failed validation.
pub fn invalid_fields(err: &validator::ValidationErrors) -> Vec<String> {
    let mut fields: Vec<String> = err.field_errors().keys().map(|k| k.to_string()).collect();
    fields.sort();
    fields
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapingErrorKind {
    Extraction,
    Network,
    RateLimit,
    Validation,
}

impl ScrapingErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScrapingErrorKind::Extraction => "EXTRACTION_ERROR",
            ScrapingErrorKind::Network => "NETWORK_ERROR",
            ScrapingErrorKind::RateLimit => "RATE_LIMIT_ERROR",
            ScrapingErrorKind::Validation => "VALIDATION_ERROR",
        }
    }
}

impl fmt::Display for ScrapingErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a scraping operation, tagged with its kind and free-form context.
#[derive(Error, Debug, Clone)]
#[error("{kind}: {message}")]
pub struct ScrapingError {
    pub kind: ScrapingErrorKind,
    pub message: String,
    pub details: Map<String, Value>,
}

impl ScrapingError {
    pub fn new(
        kind: ScrapingErrorKind,
        message: impl Into<String>,
        details: Map<String, Value>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            details,
        }
    }

    pub fn extraction(message: impl Into<String>, details: Map<String, Value>) -> Self {
        Self::new(ScrapingErrorKind::Extraction, message, details)
    }

    pub fn network(message: impl Into<String>, details: Map<String, Value>) -> Self {
        Self::new(ScrapingErrorKind::Network, message, details)
    }

    pub fn rate_limit(message: impl Into<String>, details: Map<String, Value>) -> Self {
        Self::new(ScrapingErrorKind::RateLimit, message, details)
    }

    pub fn validation(message: impl Into<String>, details: Map<String, Value>) -> Self {
        Self::new(ScrapingErrorKind::Validation, message, details)
    }

    pub fn detail(&self, key: &str) -> Option<&str> {
        self.details.get(key).and_then(|v| v.as_str())
    }

    pub fn to_json(&self) -> Value {
        json!({
            "error_type": self.kind.as_str(),
            "message": self.message,
            "details": self.details,
        })
    }
}

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
