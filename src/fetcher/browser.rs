use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde_json::{Map, json};
use std::ffi::OsStr;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::{FetchConfig, FetchResult, PageFetcher, extract_page};
use crate::config::ScraperConfig;
use crate::utils::error::{AppError, Result, ScrapingError};

static CHROME_ARGS: [&str; 7] = [
    "--no-sandbox",
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--disable-extensions",
    "--disable-background-timer-throttling",
    "--disable-backgrounding-occluded-windows",
    "--disable-renderer-backgrounding",
];

pub(crate) fn launch_options(config: &ScraperConfig) -> Result<LaunchOptions<'static>> {
    let mut options = LaunchOptions::default_builder()
        .headless(true)
        .sandbox(false)
        .window_size(Some((1920, 1080)))
        .args(CHROME_ARGS.iter().map(OsStr::new).collect())
        .build()
        .map_err(|e| AppError::Internal(format!("Failed to create launch options: {}", e)))?;

    if let Some(chrome_path) = &config.chrome_path {
        options.path = Some(PathBuf::from(chrome_path));
    }

    Ok(options)
}

/// Fixed set of headless browsers handed out round-robin.
pub struct BrowserPool {
    browsers: Vec<Arc<Browser>>,
    current_index: AtomicUsize,
}

impl BrowserPool {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let size = config.browser_pool_size.max(1);
        let mut browsers = Vec::with_capacity(size);

        for _ in 0..size {
            let browser = Browser::new(launch_options(config)?)
                .map_err(|e| AppError::Internal(format!("Failed to launch browser: {}", e)))?;
            browsers.push(Arc::new(browser));
        }

        info!("Launched {} headless browser(s)", browsers.len());
        Ok(Self {
            browsers,
            current_index: AtomicUsize::new(0),
        })
    }

    pub fn get_browser(&self) -> Arc<Browser> {
        let index = self.current_index.fetch_add(1, Ordering::Relaxed) % self.browsers.len();
        self.browsers[index].clone()
    }

}

struct RenderedPage {
    html: String,
    final_url: String,
}

/// Raises the flag when the owning fetch future is dropped, so the blocking
/// render stops at its next step.
struct CancelOnDrop(Arc<AtomicBool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

const SETTLE_STEP: Duration = Duration::from_millis(100);

fn ensure_active(cancelled: &AtomicBool) -> std::result::Result<(), String> {
    if cancelled.load(Ordering::SeqCst) {
        Err("Render cancelled".to_string())
    } else {
        Ok(())
    }
}

/// Sleeps for `duration` in short steps, stopping early once cancelled.
fn settle(duration: Duration, cancelled: &AtomicBool) -> std::result::Result<(), String> {
    let deadline = Instant::now() + duration;
    loop {
        ensure_active(cancelled)?;
        let now = Instant::now();
        if now >= deadline {
            return Ok(());
        }
        std::thread::sleep(SETTLE_STEP.min(deadline - now));
    }
}

struct RenderJob {
    url: String,
    user_agent: String,
    config: FetchConfig,
    timeout: Duration,
    cancelled: Arc<AtomicBool>,
}

/// Fetcher for script-rendered pages.
pub struct BrowserFetcher {
    pool: Arc<BrowserPool>,
    user_agent: String,
    request_timeout: Duration,
}

impl BrowserFetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        Ok(Self {
            pool: Arc::new(BrowserPool::new(config)?),
            user_agent: config.user_agent.clone(),
            request_timeout: config.request_timeout(),
        })
    }

    /// Blocking navigation; runs on the blocking thread pool. The tab is
    /// closed whatever the outcome.
    fn render(browser: &Browser, job: &RenderJob) -> std::result::Result<RenderedPage, String> {
        ensure_active(&job.cancelled)?;
        let tab = browser.new_tab().map_err(|e| format!("Failed to create tab: {}", e))?;

        let outcome = Self::load(&tab, job);
        if let Err(e) = tab.close(true) {
            debug!("Failed to close tab for {}: {}", job.url, e);
        }
        outcome
    }

    fn load(tab: &Tab, job: &RenderJob) -> std::result::Result<RenderedPage, String> {
        tab.set_default_timeout(job.timeout);
        tab.set_user_agent(&job.user_agent, None, None)
            .map_err(|e| format!("Failed to set user agent: {}", e))?;

        ensure_active(&job.cancelled)?;
        tab.navigate_to(&job.url)
            .map_err(|e| format!("Navigation failed: {}", e))?;
        tab.wait_until_navigated()
            .map_err(|e| format!("Page load failed: {}", e))?;

        if let Some(selector) = &job.config.wait_for {
            ensure_active(&job.cancelled)?;
            let wait = job.config.wait_timeout.unwrap_or(job.timeout);
            tab.wait_for_element_with_custom_timeout(selector, wait)
                .map_err(|e| format!("Wait for selector '{}' failed: {}", selector, e))?;
        }

        if let Some(duration) = job.config.dynamic_wait {
            settle(duration, &job.cancelled)?;
        }

        ensure_active(&job.cancelled)?;
        let html = tab
            .get_content()
            .map_err(|e| format!("Failed to get page content: {}", e))?;
        let final_url = match tab.get_url() {
            current if current.is_empty() => job.url.clone(),
            current => current,
        };

        Ok(RenderedPage { html, final_url })
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    async fn fetch(&self, url: &str, config: &FetchConfig) -> FetchResult {
        let started = Instant::now();
        let browser = self.pool.get_browser();

        let cancelled = Arc::new(AtomicBool::new(false));
        let _cancel_guard = CancelOnDrop(cancelled.clone());
        let job = RenderJob {
            url: url.to_string(),
            user_agent: self.user_agent.clone(),
            config: config.clone(),
            timeout: self.request_timeout,
            cancelled,
        };

        let rendered = tokio::task::spawn_blocking(move || Self::render(&browser, &job)).await;

        let page = match rendered {
            Ok(Ok(page)) => page,
            Ok(Err(message)) => {
                let mut details = Map::new();
                details.insert("url".into(), json!(url));
                let error = ScrapingError::network(message, details);
                return FetchResult::failure(url, error, None, started);
            }
            Err(e) => {
                let message = format!("Browser task failed: {}", e);
                let error = ScrapingError::network(message, Map::new());
                return FetchResult::failure(url, error, None, started);
            }
        };

        debug!("Rendered {} in {}ms", page.final_url, started.elapsed().as_millis());
        extract_page(&page.html, page.final_url, None, config, started).await
    }

    fn engine(&self) -> &'static str {
        "browser"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FetchEngine;
    use crate::extraction::StrategyKind;

    fn scraper_config(chrome_path: Option<&str>) -> ScraperConfig {
        ScraperConfig {
            engine: FetchEngine::Browser,
            primary_strategy: StrategyKind::Css,
            browser_pool_size: 2,
            request_timeout: 10,
            platform_timeout: 30,
            user_agent: "TestAgent/1.0".to_string(),
            chrome_path: chrome_path.map(String::from),
        }
    }

    #[test]
    fn test_launch_options() {
        let options = launch_options(&scraper_config(Some("/usr/bin/chromium"))).unwrap();
        assert!(options.headless);
        assert!(!options.sandbox);
        assert_eq!(options.path, Some(PathBuf::from("/usr/bin/chromium")));
        assert_eq!(options.args.len(), CHROME_ARGS.len());
    }

    #[test]
    fn test_launch_options_default_path() {
        let options = launch_options(&scraper_config(None)).unwrap();
        assert!(options.path.is_none());
    }

    #[test]
    fn test_cancel_guard_raises_flag_on_drop() {
        let flag = Arc::new(AtomicBool::new(false));
        {
            let _guard = CancelOnDrop(flag.clone());
            assert!(ensure_active(&flag).is_ok());
        }
        assert_eq!(ensure_active(&flag), Err("Render cancelled".to_string()));
    }

    #[test]
    fn test_settle_stops_when_cancelled() {
        let flag = AtomicBool::new(true);
        let started = Instant::now();
        assert!(settle(Duration::from_secs(30), &flag).is_err());
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_settle_waits_full_duration() {
        let flag = AtomicBool::new(false);
        let started = Instant::now();
        assert!(settle(Duration::from_millis(150), &flag).is_ok());
        assert!(started.elapsed() >= Duration::from_millis(150));
    }

    #[tokio::test]
    async fn test_dropped_fetch_cancels_blocking_work() {
        let flag = Arc::new(AtomicBool::new(false));
        let guard = CancelOnDrop(flag.clone());
        let worker_flag = flag.clone();
        let worker =
            tokio::task::spawn_blocking(move || settle(Duration::from_secs(30), &worker_flag));

        let fetch = async move {
            let _guard = guard;
            std::future::pending::<()>().await
        };
        let timed_out = tokio::time::timeout(Duration::from_millis(50), fetch).await;
        assert!(timed_out.is_err());

        let result = tokio::time::timeout(Duration::from_secs(5), worker).await.unwrap().unwrap();
        assert!(result.is_err());
    }
}
