use super::{PlatformAdapter, PlatformConfig, SelectorConfig, map_city, with_query};

/// Keywords DOU exposes as a dedicated vacancy category.
fn category_for(keyword: &str) -> Option<&'static str> {
    match keyword.to_lowercase().as_str() {
        "python" => Some("Python"),
        "javascript" => Some("JavaScript"),
        "java" => Some("Java"),
        "nodejs" => Some("Node.js"),
        "react" => Some("React"),
        "angular" => Some("Angular"),
        "devops" => Some("DevOps"),
        "qa" => Some("QA"),
        "android" => Some("Android"),
        "ios" => Some("iOS"),
        _ => None,
    }
}

pub struct DouAdapter {
    config: PlatformConfig,
}

impl DouAdapter {
    pub fn new() -> Self {
        Self {
            config: PlatformConfig {
                name: "DOU".to_string(),
                base_url: "https://jobs.dou.ua/vacancies/".to_string(),
                selectors: SelectorConfig {
                    base_selector: "li.l-vacancy".to_string(),
                    title: "div.title > a".to_string(),
                    company: "a.company".to_string(),
                    location: "span.cities".to_string(),
                    salary: Some("span.salary".to_string()),
                    description: "div.text".to_string(),
                    requirements: "div.requirements".to_string(),
                    url: Some("div.title > a".to_string()),
                    apply_link: Some("a.btn-apply".to_string()),
                },
                wait_for: Some("ul.lt".to_string()),
                // Listings arrive over AJAX
                dynamic_wait: Some(1.0),
                pagination_selector: Some("a.more-btn".to_string()),
                max_pages: 10,
            },
        }
    }
}

impl Default for DouAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformAdapter for DouAdapter {
    fn id(&self) -> &'static str {
        "dou"
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }

    fn build_search_url(&self, keywords: &[String], location: Option<&str>) -> String {
        let mut params = vec![
            ("search", keywords.join(" ")),
            // Match in descriptions too
            ("descr", "1".to_string()),
        ];

        if let Some(category) = keywords.iter().find_map(|k| category_for(k)) {
            params.push(("category", category.to_string()));
        }

        if let Some(location) = location.filter(|l| !l.trim().is_empty()) {
            let city = map_city(location).map(String::from).unwrap_or_else(|| location.to_string());
            params.push(("city", city));
        }

        with_query(&self.config.base_url, &params)
    }
}
