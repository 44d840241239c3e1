//! Page-Harvest: a bounded-concurrency pagination harvester
//!
//! This crate discovers how many pages a paginated listing has, fetches every page
//! with a fixed cap on in-flight requests, extracts text items from each page, and
//! persists the sorted, deduplicated collection.

pub mod aggregate;
pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Page-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Page count discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("Crawl failed: {0}")]
    Crawl(#[from] CrawlError),

    #[error("Output error: {0}")]
    Sink(#[from] output::SinkError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector: {0}")]
    InvalidSelector(String),
}

/// Errors raised while determining the number of pages to crawl
///
/// Every variant is fatal: without a page count the work set cannot be bounded.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Failed to fetch reference page: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Last page marker '{selector}' not found on {url}")]
    MarkerNotFound { url: String, selector: String },

    #[error("Last page marker has no usable page number: {0}")]
    MissingValue(String),

    #[error("Last page value '{0}' is not a positive integer")]
    InvalidPageCount(String),

    #[error("Invalid last page selector: {0}")]
    InvalidSelector(#[from] crawler::ExtractError),
}

/// Crawl-fatal errors
///
/// Per-page failures are never reported through this type; they are recorded in
/// the crawl outcome instead.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Concurrency limit must be at least 1")]
    InvalidConcurrency,

    #[error("All {attempted} pages failed")]
    AllPagesFailed { attempted: u32 },

    #[error("Admission semaphore closed before all pages were issued")]
    AdmissionClosed,
}

/// Result type alias for Page-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use aggregate::{aggregate, FinalCollection};
pub use config::Config;
pub use crawler::{BoundedCrawler, CrawlOutcome, ItemExtractor, PageFetcher};
pub use output::{CollectionDocument, CrawlSummary, ResultSink};
pub use state::{CrawlProgress, PageState};
