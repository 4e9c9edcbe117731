use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::LlmConfig;
use crate::models::{FieldMap, JobRecord};
use crate::utils::error::{AppError, Result};

pub const DEFAULT_INSTRUCTION: &str = "Extract detailed job posting information including:
- Job title and company name
- Location and salary details if available
- Complete job description
- List of requirements and qualifications
- Job posting URL
Respond with a single JSON object matching the schema, or null if the page holds no job posting.";

/// One completion call against a generative model.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmRequest {
    /// `vendor/model` identifier.
    pub provider: String,
    pub instruction: String,
    pub schema: Value,
    pub content: String,
}

/// Generative backend. Returns the model's answer already parsed as JSON.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmBackend: Send + Sync {
    async fn generate(&self, request: &LlmRequest) -> Result<Value>;
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub provider: String,
    pub fallback_provider: Option<String>,
    pub max_retries: u32,
    pub chunk_token_threshold: usize,
    pub request_timeout: Duration,
    pub instruction: String,
}

impl From<&LlmConfig> for LlmSettings {
    fn from(config: &LlmConfig) -> Self {
        Self {
            provider: config.provider.clone(),
            fallback_provider: config.fallback_provider.clone(),
            max_retries: config.max_retries,
            chunk_token_threshold: config.chunk_token_threshold,
            request_timeout: config.request_timeout(),
            instruction: DEFAULT_INSTRUCTION.to_string(),
        }
    }
}

enum AttemptState {
    Attempting(u32),
    FallbackAttempt,
    Succeeded(FieldMap),
    Failed(AppError),
}

/// Schema-guided extraction through a generative model, with bounded retries
/// and a single extra attempt on the fallback provider.
#[derive(Clone)]
pub struct LlmExtractionStrategy {
    backend: Arc<dyn LlmBackend>,
    settings: LlmSettings,
    schema: Value,
}

impl LlmExtractionStrategy {
    pub fn new(backend: Arc<dyn LlmBackend>, settings: LlmSettings) -> Self {
        Self {
            backend,
            settings,
            schema: JobRecord::extraction_schema(),
        }
    }

    /// Runs extraction until it succeeds or every attempt is spent.
    ///
    /// An empty map is a soft miss: the model answered but found nothing.
    /// When attempts run out the error of the last attempt is returned.
    pub async fn extract_with_retries(&self, content: &str) -> Result<FieldMap> {
        let attempts = self.settings.max_retries.max(1);
        let chunks = chunk_content(content, self.settings.chunk_token_threshold);
        if chunks.len() > 1 {
            debug!("Content split into {} chunks for LLM extraction", chunks.len());
        }

        let mut state = AttemptState::Attempting(1);
        loop {
            state = match state {
                AttemptState::Attempting(attempt) => {
                    match self.run_provider(&self.settings.provider, &chunks).await {
                        Ok(fields) => AttemptState::Succeeded(fields),
                        Err(e) => {
                            warn!(
                                "LLM extraction attempt {}/{} with {} failed: {}",
                                attempt, attempts, self.settings.provider, e
                            );
                            if attempt < attempts {
                                AttemptState::Attempting(attempt + 1)
                            } else if self.settings.fallback_provider.is_some() {
                                AttemptState::FallbackAttempt
                            } else {
                                AttemptState::Failed(e)
                            }
                        }
                    }
                }
                AttemptState::FallbackAttempt => {
                    let Some(fallback) = self.settings.fallback_provider.as_deref() else {
                        return Err(AppError::Internal("fallback provider missing".to_string()));
                    };
                    info!("Retrying LLM extraction with fallback provider {}", fallback);
                    match self.run_provider(fallback, &chunks).await {
                        Ok(fields) => AttemptState::Succeeded(fields),
                        Err(e) => {
                            warn!("LLM fallback provider {} failed: {}", fallback, e);
                            AttemptState::Failed(e)
                        }
                    }
                }
                AttemptState::Succeeded(fields) => return Ok(fields),
                AttemptState::Failed(e) => return Err(e),
            };
        }
    }

    /// Asks one provider about every chunk; the first non-empty answer wins.
    async fn run_provider(&self, provider: &str, chunks: &[String]) -> Result<FieldMap> {
        metrics::counter!("job_scout_llm_attempts_total", "provider" => provider.to_string())
            .increment(1);

        for chunk in chunks {
            let request = LlmRequest {
                provider: provider.to_string(),
                instruction: self.settings.instruction.clone(),
                schema: self.schema.clone(),
                content: chunk.clone(),
            };

            let timeout = self.settings.request_timeout;
            let response = tokio::time::timeout(timeout, self.backend.generate(&request))
                .await
                .map_err(|_| AppError::Timeout(timeout))??;

            let fields = normalize_response(response)?;
            if !fields.is_empty() {
                return Ok(fields);
            }
        }

        Ok(FieldMap::new())
    }
}

/// Rough token count used to decide on chunking.
pub fn estimate_tokens(content: &str) -> usize {
    (content.split_whitespace().count() as f64 / 0.75).ceil() as usize
}

/// Splits content into word windows whose estimated token count stays within
/// `threshold`, once the whole content exceeds it.
pub fn chunk_content(content: &str, threshold: usize) -> Vec<String> {
    if threshold == 0 || estimate_tokens(content) <= threshold {
        return vec![content.to_string()];
    }

    let window = ((threshold as f64) * 0.75).floor().max(1.0) as usize;
    let words: Vec<&str> = content.split_whitespace().collect();
    words.chunks(window).map(|w| w.join(" ")).collect()
}

/// Reduces a model answer to a single field map.
///
/// Empty and falsy answers (`null`, `false`, `0`, blank strings, empty lists
/// and objects) are a soft miss. A string holding JSON is parsed first. Lists
/// contribute their first non-empty object; other list items are skipped.
/// Any other truthy scalar is an error.
pub fn normalize_response(response: Value) -> Result<FieldMap> {
    match response {
        Value::Object(map) => Ok(map),
        Value::Null | Value::Bool(false) => Ok(FieldMap::new()),
        Value::Number(n) if n.as_f64() == Some(0.0) => Ok(FieldMap::new()),
        Value::String(s) if s.trim().is_empty() => Ok(FieldMap::new()),
        Value::String(s) => match serde_json::from_str::<Value>(s.trim()) {
            Ok(Value::String(_)) | Err(_) => Err(AppError::Parse {
                message: format!("unexpected model output: {:?}", s),
            }),
            Ok(parsed) => normalize_response(parsed),
        },
        Value::Array(items) => {
            for item in items {
                match normalize_response(item) {
                    Ok(fields) if !fields.is_empty() => return Ok(fields),
                    Ok(_) => {}
                    Err(e) => debug!("Skipping list item in model output: {}", e),
                }
            }
            Ok(FieldMap::new())
        }
        other => Err(AppError::Parse {
            message: format!("unexpected model output: {}", other),
        }),
    }
}
