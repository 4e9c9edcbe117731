use async_trait::async_trait;
use regex::Regex;
use reqwest::StatusCode;
use serde_json::{Map, Value, json};
use std::time::Duration;
use tracing::debug;

use super::llm::{LlmBackend, LlmRequest};
use crate::config::LlmConfig;
use crate::utils::error::{AppError, Result, ScrapingError};

/// Chat-completions client for OpenAI-compatible endpoints.
pub struct OpenAiBackend {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    fence: Regex,
}

impl OpenAiBackend {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let fence = Regex::new(r"(?s)^\s*```(?:json)?\s*(.*?)\s*```\s*$")
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            fence,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        Self::new(&config.base_url, config.api_key.clone(), config.request_timeout())
    }

    /// Model name without the vendor prefix.
    fn model_name(provider: &str) -> &str {
        provider.split_once('/').map(|(_, model)| model).unwrap_or(provider)
    }

    /// Model output as JSON, tolerating Markdown code fences around it.
    /// A blank answer is `null`.
    fn parse_content(&self, content: &str) -> Result<Value> {
        let body = match self.fence.captures(content) {
            Some(caps) => caps.get(1).map(|m| m.as_str()).unwrap_or_default(),
            None => content.trim(),
        };
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(body).map_err(|e| AppError::Parse {
            message: format!("model returned invalid JSON: {}", e),
        })
    }
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    async fn generate(&self, request: &LlmRequest) -> Result<Value> {
        let model = Self::model_name(&request.provider);
        let system = format!(
            "{}\n\nJSON schema:\n{}",
            request.instruction,
            serde_json::to_string(&request.schema)?
        );
        let body = json!({
            "model": model,
            "temperature": 0,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": request.content},
            ],
        });

        let mut builder = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        debug!("Calling {} ({} bytes of content)", request.provider, request.content.len());
        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let mut details = Map::new();
            details.insert("provider".into(), json!(request.provider));
            return Err(ScrapingError::rate_limit(
                format!("{} rate limited the request", request.provider),
                details,
            )
            .into());
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Llm {
                provider: request.provider.clone(),
                message: format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    text.chars().take(200).collect::<String>()
                ),
            });
        }

        let payload: Value = response.json().await?;
        let content = payload
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .ok_or_else(|| AppError::Llm {
                provider: request.provider.clone(),
                message: "response has no message content".to_string(),
            })?;

        self.parse_content(content)
    }
}
