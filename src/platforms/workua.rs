use url::form_urlencoded;

use super::{PlatformAdapter, PlatformConfig, SelectorConfig, map_city, with_query};

pub struct WorkUaAdapter {
    config: PlatformConfig,
}

impl WorkUaAdapter {
    pub fn new() -> Self {
        Self {
            config: PlatformConfig {
                name: "Work.ua".to_string(),
                base_url: "https://www.work.ua/jobs-it-".to_string(),
                selectors: SelectorConfig {
                    base_selector: "div#pjax-job-list div.job-link".to_string(),
                    title: "h2 > a".to_string(),
                    company: "div.add-top-xs > span > b".to_string(),
                    location: "div.add-top-xs span.middot + span:not(.nowrap)".to_string(),
                    salary: Some("span.middot + span.nowrap".to_string()),
                    description: "div#job-description".to_string(),
                    requirements: "div.text-muted ul".to_string(),
                    url: Some("h2 > a".to_string()),
                    apply_link: Some("div.pull-right a.btn-default".to_string()),
                },
                wait_for: Some("div#pjax-job-list".to_string()),
                dynamic_wait: None,
                pagination_selector: Some("ul.pagination li:last-child:not(.active) a".to_string()),
                max_pages: 10,
            },
        }
    }
}

impl Default for WorkUaAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformAdapter for WorkUaAdapter {
    fn id(&self) -> &'static str {
        "workua"
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }

    /// Keywords live in the path: `/jobs-it-<kw1>+<kw2>/?page=1`.
    fn build_search_url(&self, keywords: &[String], location: Option<&str>) -> String {
        let path_keywords = keywords
            .iter()
            .map(|k| {
                form_urlencoded::byte_serialize(k.to_lowercase().as_bytes()).collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("+");

        let mut params = vec![("page", "1".to_string())];
        if let Some(location) = location.filter(|l| !l.trim().is_empty()) {
            let city = map_city(location)
                .map(str::to_lowercase)
                .unwrap_or_else(|| location.to_lowercase());
            params.push(("city", city));
        }

        with_query(&format!("{}{}/", self.config.base_url, path_keywords), &params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_search_url_path_keywords() {
        let adapter = WorkUaAdapter::new();
        let keywords = ["Python".to_string(), "Django".to_string()];
        let url = adapter.build_search_url(&keywords, Some("Київ"));
        assert_eq!(url, "https://www.work.ua/jobs-it-python+django/?page=1&city=kyiv");
    }

    #[test]
    fn test_path_keywords_are_encoded() {
        let adapter = WorkUaAdapter::new();
        let keywords = ["C#".to_string(), "розробник".to_string()];
        let url = adapter.build_search_url(&keywords, None);
        assert_eq!(
            url,
            "https://www.work.ua/jobs-it-c%23+%D1%80%D0%BE%D0%B7%D1%80%D0%BE%D0%B1%D0%BD%D0%B8%D0%BA/?page=1"
        );
    }
}
