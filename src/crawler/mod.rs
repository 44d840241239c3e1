//! Crawler module for page discovery, fetching and extraction
//!
//! This module contains the core harvesting logic, including:
//! - Page count discovery from the reference page
//! - HTTP fetching behind the `PageFetcher` seam
//! - Item extraction behind the `ItemExtractor` seam
//! - Bounded-concurrency crawling of the page range
//! - Overall run coordination

mod coordinator;
mod discovery;
mod extractor;
mod fetcher;
mod scheduler;

pub use coordinator::{run_harvest, Coordinator};
pub use discovery::PageCountDiscoverer;
pub use extractor::{ExtractError, ItemExtractor, SelectorExtractor};
pub use fetcher::{build_http_client, FetchError, HttpFetcher, PageFetcher};
pub use scheduler::{BoundedCrawler, CrawlOutcome, PageReport, ResultSet};
