use serde::{Deserialize, Serialize};
use validator::Validate;

use super::JobRecord;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SalaryRange {
    #[serde(default, alias = "min")]
    pub min_amount: Option<f64>,
    #[serde(default, alias = "max")]
    pub max_amount: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Optional post-extraction criteria. Every field is independent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchFilters {
    pub keywords: Option<Vec<String>>,
    pub location: Option<String>,
    pub salary_range: Option<SalaryRange>,
    pub remote: Option<bool>,
    pub experience_level: Option<String>,
    pub job_type: Option<String>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
}

fn default_platforms() -> Vec<String> {
    vec!["all".to_string()]
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchRequest {
    #[validate(length(min = 1))]
    pub query: String,
    #[serde(default = "default_platforms")]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub filters: Option<SearchFilters>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            platforms: default_platforms(),
            filters: None,
        }
    }

    pub fn with_platforms<I, S>(mut self, platforms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.platforms = platforms.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = Some(filters);
        self
    }

    /// Words of the query, used to build each platform's search URL.
    pub fn query_keywords(&self) -> Vec<String> {
        self.query.split_whitespace().map(String::from).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlatformFailure {
    pub platform: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub jobs: Vec<JobRecord>,
    pub total_count: usize,
    pub query: String,
    pub platforms: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_platforms: Vec<PlatformFailure>,
}
