use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::borrow::Cow;
use url::Url;
use validator::{Validate, ValidationError, ValidationErrors};

use super::{FieldMap, generate_id};
use crate::utils::error::{ScrapingError, invalid_fields};

/// A validated job posting. Only constructed through [`JobRecord::from_field_map`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct JobRecord {
    pub id: String,
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub company: String,
    #[validate(length(min = 1))]
    pub location: String,
    pub salary: Option<String>,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(length(min = 1))]
    pub requirements: Vec<String>,
    pub url: String,
    pub apply_url: Option<String>,
    pub platform: String,
    pub remote: Option<bool>,
    pub experience_level: Option<String>,
    pub employment_type: Option<String>,
    pub created_at: Option<String>,
    pub raw_data: Option<Value>,
}

impl JobRecord {
    /// Normalizes an extracted field map and validates it.
    ///
    /// Strings are trimmed, blank requirements are dropped and blank optional
    /// fields become `None`. Every offending field is listed in the error's
    /// `fields` detail.
    pub fn from_field_map(fields: &FieldMap, platform: &str) -> Result<Self, ScrapingError> {
        let record = JobRecord {
            id: generate_id(),
            title: text_field(fields, "title").unwrap_or_default(),
            company: text_field(fields, "company").unwrap_or_default(),
            location: text_field(fields, "location").unwrap_or_default(),
            salary: text_field(fields, "salary"),
            description: text_field(fields, "description").unwrap_or_default(),
            requirements: requirements_field(fields),
            url: text_field(fields, "url").unwrap_or_default(),
            apply_url: text_field(fields, "apply_url"),
            platform: platform.to_string(),
            remote: bool_field(fields, "remote"),
            experience_level: text_field(fields, "experience_level"),
            employment_type: text_field(fields, "employment_type"),
            created_at: text_field(fields, "created_at"),
            raw_data: Some(Value::Object(fields.clone())),
        };

        record.check()?;
        Ok(record)
    }

    fn check(&self) -> Result<(), ScrapingError> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        if let Err(e) = validate_http_url(&self.url) {
            errors.add("url", e);
        }
        if let Some(apply_url) = &self.apply_url {
            if let Err(e) = validate_http_url(apply_url) {
                errors.add("apply_url", e);
            }
        }

        if errors.is_empty() {
            return Ok(());
        }

        let fields = invalid_fields(&errors);
        let mut details = Map::new();
        details.insert("fields".into(), json!(fields));
        details.insert("platform".into(), json!(self.platform));
        Err(ScrapingError::validation(
            format!("Job record failed validation: {}", fields.join(", ")),
            details,
        ))
    }

    /// JSON schema handed to the generative extractor.
    pub fn extraction_schema() -> Value {
        json!({
            "title": "JobPosting",
            "type": "object",
            "properties": {
                "title": {"type": "string", "description": "Job title"},
                "company": {"type": "string", "description": "Company name"},
                "location": {"type": "string", "description": "Job location"},
                "salary": {"type": ["string", "null"], "description": "Salary information"},
                "description": {"type": "string", "description": "Job description"},
                "requirements": {
                    "type": "array",
                    "items": {"type": "string"},
                    "minItems": 1,
                    "description": "List of job requirements and qualifications"
                },
                "url": {"type": "string", "format": "uri", "description": "Original job posting URL"},
                "apply_url": {"type": ["string", "null"], "format": "uri", "description": "Direct application URL"},
                "remote": {"type": ["boolean", "null"]},
                "experience_level": {"type": ["string", "null"]},
                "employment_type": {"type": ["string", "null"]}
            },
            "required": ["title", "company", "location", "description", "requirements", "url"]
        })
    }
}

fn validate_http_url(value: &str) -> Result<(), ValidationError> {
    let valid = match Url::parse(value) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some_and(|h| !h.is_empty())
        }
        Err(_) => false,
    };

    if valid {
        Ok(())
    } else {
        let mut err = ValidationError::new("http_url");
        err.message = Some(Cow::from("URL must use http or https scheme and have a host"));
        Err(err)
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn text_field(fields: &FieldMap, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(scalar_text).collect();
            (!parts.is_empty()).then(|| parts.join(" "))
        }
        other => scalar_text(other),
    }
}

fn requirements_field(fields: &FieldMap) -> Vec<String> {
    match fields.get("requirements") {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
        Some(Value::String(text)) => text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}

fn bool_field(fields: &FieldMap, key: &str) -> Option<bool> {
    match fields.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
