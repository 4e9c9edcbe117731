//! Turning fetched pages into raw field maps.
//!
//! Two strategies share one contract: [`CssExtractionStrategy`] reads listings
//! through CSS selectors, [`LlmExtractionStrategy`] asks a generative model to
//! fill the job schema. Neither validates; that is the job of
//! [`JobRecord::from_field_map`](crate::models::JobRecord::from_field_map).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::models::FieldMap;
use crate::utils::error::Result;

pub mod css;
pub mod llm;
pub mod openai;

pub use css::CssExtractionStrategy;
pub use llm::{LlmBackend, LlmExtractionStrategy, LlmRequest, LlmSettings};
pub use openai::OpenAiBackend;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    #[default]
    Text,
    TextArray,
    Attribute,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldSelector {
    pub name: String,
    pub selector: String,
    #[serde(default, rename = "type")]
    pub kind: FieldKind,
    #[serde(default)]
    pub attribute: Option<String>,
    #[serde(default)]
    pub optional: bool,
}

impl FieldSelector {
    pub fn text(name: &str, selector: &str) -> Self {
        Self {
            name: name.to_string(),
            selector: selector.to_string(),
            kind: FieldKind::Text,
            attribute: None,
            optional: false,
        }
    }

    pub fn text_array(name: &str, selector: &str) -> Self {
        Self {
            kind: FieldKind::TextArray,
            ..Self::text(name, selector)
        }
    }

    pub fn attribute(name: &str, selector: &str, attribute: &str) -> Self {
        Self {
            kind: FieldKind::Attribute,
            attribute: Some(attribute.to_string()),
            ..Self::text(name, selector)
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractionConfig {
    pub name: String,
    pub base_selector: String,
    pub fields: Vec<FieldSelector>,
}

impl Default for ExtractionConfig {
    /// Generic listing layout, replaced per platform before use.
    fn default() -> Self {
        Self {
            name: "Job Listings".to_string(),
            base_selector: "div.job-posting".to_string(),
            fields: vec![
                FieldSelector::text("title", "h2.job-title"),
                FieldSelector::text("company", "div.company-name"),
                FieldSelector::text("location", "div.job-location"),
                FieldSelector::text("salary", "div.salary").optional(),
                FieldSelector::text("description", "div.job-description"),
                FieldSelector::text_array("requirements", "ul.requirements li"),
                FieldSelector::attribute("url", "a.job-link", "href"),
            ],
        }
    }
}

/// Partial replacement of an [`ExtractionConfig`]. Absent parts keep the base values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SelectorOverrides {
    #[serde(default)]
    pub base_selector: Option<String>,
    #[serde(default)]
    pub fields: Option<Vec<FieldSelector>>,
}

impl From<ExtractionConfig> for SelectorOverrides {
    fn from(config: ExtractionConfig) -> Self {
        Self {
            base_selector: Some(config.base_selector),
            fields: Some(config.fields),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StrategyKind {
    #[default]
    Css,
    Llm,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Css => "css",
            StrategyKind::Llm => "llm",
        }
    }
}

impl FromStr for StrategyKind {
    type Err = std::convert::Infallible;

    /// Unknown names select the CSS strategy.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "llm" => StrategyKind::Llm,
            _ => StrategyKind::Css,
        })
    }
}

impl From<String> for StrategyKind {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

impl From<StrategyKind> for String {
    fn from(kind: StrategyKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone)]
pub enum ExtractionStrategy {
    Css(CssExtractionStrategy),
    Llm(LlmExtractionStrategy),
}

impl ExtractionStrategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            ExtractionStrategy::Css(_) => StrategyKind::Css,
            ExtractionStrategy::Llm(_) => StrategyKind::Llm,
        }
    }

    /// Runs the strategy over a page. `page_url` is used to resolve relative links.
    pub async fn extract(&self, html: &str, page_url: Option<&Url>) -> Result<Vec<FieldMap>> {
        match self {
            ExtractionStrategy::Css(css) => css.extract(html, page_url),
            ExtractionStrategy::Llm(llm) => {
                let fields = llm.extract_with_retries(html).await?;
                Ok(if fields.is_empty() { Vec::new() } else { vec![fields] })
            }
        }
    }
}

impl fmt::Debug for ExtractionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ExtractionStrategy").field(&self.kind()).finish()
    }
}
