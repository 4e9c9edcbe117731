use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::{ExtractionConfig, FieldKind, FieldSelector, SelectorOverrides};
use crate::models::FieldMap;
use crate::utils::error::{AppError, Result};

/// Selector-driven extractor.
///
/// Keeps the config it was built with and derives the active config from it on
/// every [`configure_for_platform`](Self::configure_for_platform) call, so
/// reconfiguring twice never stacks overrides.
#[derive(Debug, Clone)]
pub struct CssExtractionStrategy {
    base: ExtractionConfig,
    active: ExtractionConfig,
}

struct CompiledField<'a> {
    field: &'a FieldSelector,
    selector: Selector,
}

impl CssExtractionStrategy {
    pub fn new(config: ExtractionConfig) -> Self {
        Self {
            active: config.clone(),
            base: config,
        }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.active
    }

    pub fn configure_for_platform(&mut self, overrides: SelectorOverrides) {
        let mut config = self.base.clone();
        if let Some(base_selector) = overrides.base_selector {
            config.base_selector = base_selector;
        }
        if let Some(fields) = overrides.fields {
            config.fields = fields;
        }
        debug!("CSS strategy reconfigured for '{}'", config.name);
        self.active = config;
    }

    /// One field map per container matching the base selector, in document order.
    /// Containers missing a required field are skipped.
    pub fn extract(&self, html: &str, page_url: Option<&Url>) -> Result<Vec<FieldMap>> {
        let base = parse_selector(&self.active.base_selector)?;
        let fields = self
            .active
            .fields
            .iter()
            .map(|field| {
                Ok(CompiledField {
                    field,
                    selector: parse_selector(&field.selector)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let document = Html::parse_document(html);
        let mut records = Vec::new();
        let mut skipped = 0usize;

        for container in document.select(&base) {
            match extract_listing(container, &fields, page_url) {
                Some(record) => records.push(record),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            debug!(
                "'{}': skipped {} listing(s) with missing required fields",
                self.active.name, skipped
            );
        }

        Ok(records)
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| AppError::InvalidSelector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

fn extract_listing(
    container: ElementRef<'_>,
    fields: &[CompiledField<'_>],
    page_url: Option<&Url>,
) -> Option<FieldMap> {
    let mut record = FieldMap::new();

    for compiled in fields {
        let field = compiled.field;
        let value = match field.kind {
            FieldKind::Text => container
                .select(&compiled.selector)
                .next()
                .map(element_text)
                .filter(|text| !text.is_empty())
                .map(Value::String),
            FieldKind::TextArray => {
                let items: Vec<Value> = container
                    .select(&compiled.selector)
                    .map(element_text)
                    .filter(|text| !text.is_empty())
                    .map(Value::String)
                    .collect();
                (!items.is_empty()).then_some(Value::Array(items))
            }
            FieldKind::Attribute => {
                let attribute = field.attribute.as_deref().unwrap_or("href");
                container
                    .select(&compiled.selector)
                    .find_map(|el| el.value().attr(attribute))
                    .map(str::trim)
                    .filter(|raw| !raw.is_empty())
                    .map(|raw| Value::String(resolve_link(raw, page_url)))
            }
        };

        match value {
            Some(value) => {
                record.insert(field.name.clone(), value);
            }
            None if field.optional => {}
            None => return None,
        }
    }

    Some(record)
}

/// Text content with runs of whitespace collapsed to single spaces.
fn element_text(element: ElementRef<'_>) -> String {
    element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}

fn resolve_link(raw: &str, page_url: Option<&Url>) -> String {
    match page_url {
        Some(base) => base.join(raw).map(String::from).unwrap_or_else(|_| raw.to_string()),
        None => raw.to_string(),
    }
}
