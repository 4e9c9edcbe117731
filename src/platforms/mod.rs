//! Static per-site configuration: search URL builders and CSS selector maps.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::extraction::{ExtractionConfig, FieldSelector};

pub mod djinni;
pub mod dou;
pub mod linkedin;
pub mod registry;
pub mod workua;

pub use djinni::DjinniAdapter;
pub use dou::DouAdapter;
pub use linkedin::LinkedInAdapter;
pub use registry::PlatformRegistry;
pub use workua::WorkUaAdapter;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectorConfig {
    /// Container matched once per listing.
    pub base_selector: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: Option<String>,
    pub description: String,
    pub requirements: String,
    pub url: Option<String>,
    pub apply_link: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlatformConfig {
    pub name: String,
    pub base_url: String,
    pub selectors: SelectorConfig,
    /// Element to wait for before extraction.
    pub wait_for: Option<String>,
    /// Extra settle time for dynamically loaded listings, in seconds.
    pub dynamic_wait: Option<f64>,
    pub pagination_selector: Option<String>,
    pub max_pages: u32,
}

impl PlatformConfig {
    /// Copy of this config with different selectors. The original is left untouched.
    pub fn with_selectors(&self, selectors: SelectorConfig) -> PlatformConfig {
        PlatformConfig {
            selectors,
            ..self.clone()
        }
    }

    pub fn extraction_config(&self) -> ExtractionConfig {
        let s = &self.selectors;
        let mut fields = vec![
            FieldSelector::text("title", &s.title),
            FieldSelector::text("company", &s.company),
            FieldSelector::text("location", &s.location),
        ];
        if let Some(salary) = &s.salary {
            fields.push(FieldSelector::text("salary", salary).optional());
        }
        fields.push(FieldSelector::text("description", &s.description));
        fields.push(FieldSelector::text_array("requirements", &s.requirements));
        if let Some(url) = &s.url {
            fields.push(FieldSelector::attribute("url", url, "href"));
        }
        if let Some(apply_link) = &s.apply_link {
            fields.push(FieldSelector::attribute("apply_url", apply_link, "href").optional());
        }

        ExtractionConfig {
            name: format!("{} Jobs", self.name),
            base_selector: s.base_selector.clone(),
            fields,
        }
    }
}

/// A supported job board.
pub trait PlatformAdapter: Send + Sync {
    /// Stable lowercase identifier used in search requests.
    fn id(&self) -> &'static str;

    fn config(&self) -> &PlatformConfig;

    /// Builds the search page URL. Pure function of its inputs.
    fn build_search_url(&self, keywords: &[String], location: Option<&str>) -> String;

    fn extraction_config(&self) -> ExtractionConfig {
        self.config().extraction_config()
    }

    fn name(&self) -> &str {
        &self.config().name
    }
}

/// Latin spelling of the Ukrainian city names the boards expect.
pub(crate) fn map_city(location: &str) -> Option<&'static str> {
    match location.trim() {
        "Київ" => Some("Kyiv"),
        "Львів" => Some("Lviv"),
        "Харків" => Some("Kharkiv"),
        "Дніпро" => Some("Dnipro"),
        "Одеса" => Some("Odesa"),
        _ => None,
    }
}

/// `base?k=v&...` with form encoding (spaces as `+`).
pub(crate) fn with_query(base: &str, params: &[(&str, String)]) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())))
        .finish();
    if query.is_empty() {
        base.to_string()
    } else {
        format!("{}?{}", base, query)
    }
}
