pub mod cli;
pub mod config;
pub mod extraction;
pub mod fetcher;
pub mod filter;
pub mod models;
pub mod platforms;
pub mod scraper;
pub mod search;
pub mod utils;
pub mod web;

// Re-export commonly used types
pub use config::AppConfig;
pub use extraction::{ExtractionConfig, ExtractionStrategy, StrategyKind};
pub use filter::filter_jobs;
pub use models::{JobRecord, SearchFilters, SearchRequest, SearchResponse};
pub use platforms::{PlatformAdapter, PlatformRegistry};
pub use scraper::{JobScraperClient, ScrapeOptions};
pub use search::SearchService;
pub use utils::error::{AppError, ScrapingError, ScrapingErrorKind};

pub type Result<T> = std::result::Result<T, AppError>;
