use super::{PlatformAdapter, PlatformConfig, SelectorConfig, with_query};

pub struct LinkedInAdapter {
    config: PlatformConfig,
}

impl LinkedInAdapter {
    pub fn new() -> Self {
        Self {
            config: PlatformConfig {
                name: "LinkedIn".to_string(),
                base_url: "https://www.linkedin.com/jobs/search".to_string(),
                selectors: SelectorConfig {
                    base_selector: "div.jobs-search__results-list li.jobs-search-results__list-item"
                        .to_string(),
                    title: "h3.base-search-card__title".to_string(),
                    company: "h4.base-search-card__subtitle".to_string(),
                    location: "span.job-search-card__location".to_string(),
                    salary: Some("span.job-search-card__salary-info".to_string()),
                    description: "div.show-more-less-html__markup".to_string(),
                    requirements: "div.description__text".to_string(),
                    url: Some("a.base-card__full-link".to_string()),
                    apply_link: Some("button.jobs-apply-button".to_string()),
                },
                wait_for: Some("div.jobs-search__results-list".to_string()),
                // Infinite scroll needs time to render the first batch
                dynamic_wait: Some(1.0),
                pagination_selector: Some("button.infinite-scroller__show-more-button".to_string()),
                max_pages: 10,
            },
        }
    }
}

impl Default for LinkedInAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformAdapter for LinkedInAdapter {
    fn id(&self) -> &'static str {
        "linkedin"
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }

    fn build_search_url(&self, keywords: &[String], location: Option<&str>) -> String {
        let mut params = vec![
            ("keywords", keywords.join(" ")),
            // Posted in the last 24 hours
            ("f_TPR", "r86400".to_string()),
            ("position", "1".to_string()),
            ("pageNum", "0".to_string()),
        ];
        if let Some(location) = location.filter(|l| !l.trim().is_empty()) {
            params.push(("location", location.to_string()));
        }

        with_query(&self.config.base_url, &params)
    }
}
