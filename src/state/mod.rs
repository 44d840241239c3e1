//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PageState`: lifecycle of a single page job (pending, fetching, extracted, failed)
//! - `CrawlProgress`: completed-vs-total observation emitted after each page finishes

mod page_state;
mod progress;

// Re-export main types
pub use page_state::PageState;
pub use progress::CrawlProgress;
