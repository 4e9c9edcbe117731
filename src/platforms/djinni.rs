use super::{PlatformAdapter, PlatformConfig, SelectorConfig, map_city, with_query};

pub struct DjinniAdapter {
    config: PlatformConfig,
}

impl DjinniAdapter {
    pub fn new() -> Self {
        Self {
            config: PlatformConfig {
                name: "Djinni".to_string(),
                base_url: "https://djinni.co/jobs/".to_string(),
                selectors: SelectorConfig {
                    base_selector: "div.list-jobs__item".to_string(),
                    title: "div.job-list-item__title > a".to_string(),
                    company: "a.mr-2".to_string(),
                    location: "span.location-text".to_string(),
                    salary: Some("span.public-salary-item".to_string()),
                    description: "div.job-post__description-text".to_string(),
                    requirements: "ul.job-additional-info--item-text".to_string(),
                    url: Some("div.job-list-item__title > a".to_string()),
                    apply_link: Some("a.btn-green".to_string()),
                },
                wait_for: Some("div.list-jobs".to_string()),
                dynamic_wait: None,
                pagination_selector: Some("li.page-item > a.page-link:not(.disabled)".to_string()),
                max_pages: 10,
            },
        }
    }
}

impl Default for DjinniAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformAdapter for DjinniAdapter {
    fn id(&self) -> &'static str {
        "djinni"
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }

    fn build_search_url(&self, keywords: &[String], location: Option<&str>) -> String {
        let mut params = vec![
            ("primary_keyword", keywords.join("-").to_lowercase()),
            ("page", "1".to_string()),
        ];

        if let Some(location) = location.filter(|l| !l.trim().is_empty()) {
            let normalized = map_city(location)
                .map(str::to_lowercase)
                .unwrap_or_else(|| location.to_lowercase());
            params.push(("location", normalized));
        }

        with_query(&self.config.base_url, &params)
    }
}
