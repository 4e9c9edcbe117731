use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

use crate::extraction::StrategyKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub scraper: ScraperConfig,
    pub llm: LlmConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FetchEngine {
    Browser,
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    pub engine: FetchEngine,
    pub primary_strategy: StrategyKind,
    pub browser_pool_size: usize,
    /// Page load and wait-for-selector budget, in seconds.
    pub request_timeout: u64,
    /// Upper bound for one platform's fetch/extract/validate sequence, in seconds.
    pub platform_timeout: u64,
    pub user_agent: String,
    pub chrome_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub enabled: bool,
    /// `vendor/model`, e.g. `openai/gpt-4o-mini`.
    pub provider: String,
    pub fallback_provider: Option<String>,
    pub api_key: Option<String>,
    pub base_url: String,
    pub max_retries: u32,
    pub chunk_token_threshold: usize,
    pub request_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: Option<String>,
    pub file_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub endpoint: String,
}

impl ScraperConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn platform_timeout(&self) -> Duration {
        Duration::from_secs(self.platform_timeout)
    }
}

impl LlmConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8000)?
        .set_default("server.request_timeout", 120)?
        .set_default("scraper.engine", "browser")?
        .set_default("scraper.primary_strategy", "css")?
        .set_default("scraper.browser_pool_size", 2)?
        .set_default("scraper.request_timeout", 30)?
        .set_default("scraper.platform_timeout", 90)?
        .set_default(
            "scraper.user_agent",
            "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36",
        )?
        .set_default("llm.enabled", false)?
        .set_default("llm.provider", "openai/gpt-4")?
        .set_default("llm.base_url", "https://api.openai.com/v1")?
        .set_default("llm.max_retries", 2)?
        .set_default("llm.chunk_token_threshold", 1400)?
        .set_default("llm.request_timeout", 60)?
        .set_default("logging.level", "info")?
        .set_default("logging.file_prefix", "job-scout.log")?
        .set_default("metrics.enabled", false)?
        .set_default("metrics.endpoint", "/metrics")
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add local config (ignored by git)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables with prefix "JOB_SCOUT__"
            .add_source(Environment::with_prefix("JOB_SCOUT").separator("__"))
            .build()?;

        Self::finish(s.try_deserialize()?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let s = defaults()?
            .add_source(File::from(path.as_ref()))
            .add_source(Environment::with_prefix("JOB_SCOUT").separator("__"))
            .build()?;

        Self::finish(s.try_deserialize()?)
    }

    fn finish(mut config: AppConfig) -> Result<Self, ConfigError> {
        if config.scraper.chrome_path.is_none() {
            config.scraper.chrome_path = env::var("CHROME_PATH").ok();
        }
        if config.llm.api_key.is_none() {
            config.llm.api_key = env::var("LLM_API_KEY")
                .or_else(|_| env::var("OPENAI_API_KEY"))
                .ok();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message("Server port must be greater than 0".into()));
        }

        if self.server.request_timeout == 0 {
            return Err(ConfigError::Message(
                "Server request_timeout must be greater than 0".into(),
            ));
        }

        if self.scraper.browser_pool_size == 0 {
            return Err(ConfigError::Message(
                "Scraper browser_pool_size must be greater than 0".into(),
            ));
        }

        if self.scraper.request_timeout == 0 || self.scraper.platform_timeout == 0 {
            return Err(ConfigError::Message("Scraper timeouts must be greater than 0".into()));
        }

        if self.scraper.user_agent.trim().is_empty() {
            return Err(ConfigError::Message("Scraper user_agent cannot be empty".into()));
        }

        if self.llm.enabled {
            if self.llm.max_retries == 0 {
                return Err(ConfigError::Message("LLM max_retries must be at least 1".into()));
            }
            if self.llm.chunk_token_threshold == 0 {
                return Err(ConfigError::Message(
                    "LLM chunk_token_threshold must be greater than 0".into(),
                ));
            }
            if url::Url::parse(&self.llm.base_url).is_err() {
                return Err(ConfigError::Message("Invalid LLM base_url format".into()));
            }
        }

        if self.scraper.primary_strategy == StrategyKind::Llm && !self.llm.enabled {
            return Err(ConfigError::Message(
                "primary_strategy 'llm' requires llm.enabled".into(),
            ));
        }

        if !self.metrics.endpoint.starts_with('/') {
            return Err(ConfigError::Message("Metrics endpoint must start with '/'".into()));
        }

        Ok(())
    }
}
