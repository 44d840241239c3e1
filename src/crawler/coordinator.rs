//! Harvest coordinator - end-to-end run orchestration
//!
//! This module sequences a complete harvest run:
//! - Discovering the page count from the reference page
//! - Crawling every page through the bounded crawler
//! - Aggregating the raw items into the final collection
//! - Persisting the collection and reporting the run

use crate::aggregate::aggregate;
use crate::config::{Config, PageUrlTemplate};
use crate::crawler::{
    BoundedCrawler, HttpFetcher, ItemExtractor, PageCountDiscoverer, PageFetcher,
    SelectorExtractor,
};
use crate::output::{build_sink, generate_markdown_summary, CrawlSummary, ResultSink};
use crate::state::CrawlProgress;
use crate::{ConfigError, HarvestError};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Drives one harvest run from discovery to persistence
pub struct Coordinator {
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<dyn ItemExtractor>,
    discoverer: PageCountDiscoverer,
    crawler: BoundedCrawler,
    sink: Box<dyn ResultSink>,
    reference_url: String,
    template: PageUrlTemplate,
    collection_field: String,
    summary_path: Option<PathBuf>,
    config_hash: Option<String>,
}

impl Coordinator {
    /// Creates a coordinator wired with the HTTP fetcher, the selector extractor
    /// and the sink selected by the configuration
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    /// * `config_hash` - Hash of the configuration file, if known
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(HarvestError)` - Client or selector setup failed
    pub fn new(config: &Config, config_hash: Option<String>) -> Result<Self, HarvestError> {
        let fetcher = HttpFetcher::from_config(&config.user_agent, &config.crawler)?;

        let extractor = SelectorExtractor::new(&config.site.row_selector, &config.site.item_selector)
            .map_err(|e| ConfigError::InvalidSelector(e.to_string()))?;

        let sink = build_sink(&config.output, config_hash.as_deref().unwrap_or(""));

        Self::with_parts(config, Arc::new(fetcher), Arc::new(extractor), sink, config_hash)
    }

    /// Creates a coordinator from explicit collaborators
    pub fn with_parts(
        config: &Config,
        fetcher: Arc<dyn PageFetcher>,
        extractor: Arc<dyn ItemExtractor>,
        sink: Box<dyn ResultSink>,
        config_hash: Option<String>,
    ) -> Result<Self, HarvestError> {
        Ok(Self {
            fetcher,
            extractor,
            discoverer: PageCountDiscoverer::from_site(&config.site)?,
            crawler: BoundedCrawler::new(config.crawler.concurrency_limit)?,
            sink,
            reference_url: config.site.reference_url.clone(),
            template: config.site.page_url_template.clone(),
            collection_field: config.output.collection_field.clone(),
            summary_path: config.output.summary_path.as_ref().map(PathBuf::from),
            config_hash,
        })
    }

    /// Forwards per-page progress to `sender`
    pub fn with_progress(mut self, sender: mpsc::UnboundedSender<CrawlProgress>) -> Self {
        self.crawler = self.crawler.with_progress(sender);
        self
    }

    /// Runs discovery, the crawl, aggregation and persistence
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlSummary)` - The run finished, possibly with tolerated page failures
    /// * `Err(HarvestError)` - Discovery failed, every page failed, or the sink failed
    pub async fn run(&mut self) -> Result<CrawlSummary, HarvestError> {
        let started = Utc::now();

        let page_count = self
            .discoverer
            .discover(self.fetcher.as_ref(), &self.reference_url)
            .await?;

        let outcome = self
            .crawler
            .crawl(
                page_count,
                &self.template,
                Arc::clone(&self.fetcher),
                Arc::clone(&self.extractor),
            )
            .await?;

        let pages_attempted = outcome.attempted();
        let pages_succeeded = outcome.succeeded();
        let failed_pages = outcome.failed_pages();
        if !failed_pages.is_empty() {
            tracing::warn!("{} pages failed: {:?}", failed_pages.len(), failed_pages);
        }

        let raw_items = outcome.raw_item_count();
        tracing::info!("Number of entries: {}", raw_items);

        let collection = aggregate(outcome.items);
        let unique_items = collection.len();
        tracing::info!("Unique entries: {}", unique_items);

        let destination = self.sink.destination();
        let output_written = if collection.is_empty() {
            tracing::warn!("No entries collected, nothing written to {}", destination);
            false
        } else {
            let document = collection.into_document(&self.collection_field);
            self.sink.persist(&document)?;
            tracing::info!("Saved {} entries to {}", document.len(), destination);
            true
        };

        let finished = Utc::now();
        let summary = CrawlSummary {
            started_at: started.to_rfc3339(),
            finished_at: finished.to_rfc3339(),
            duration_seconds: (finished - started).num_milliseconds() as f64 / 1000.0,
            config_hash: self.config_hash.clone(),
            concurrency_limit: self.crawler.concurrency_limit() as u32,
            pages_attempted,
            pages_succeeded,
            pages_failed: failed_pages.len() as u32,
            failed_pages,
            raw_items,
            unique_items,
            destination,
            output_written,
        };

        if let Some(path) = &self.summary_path {
            write_summary(&summary, path)?;
        }

        Ok(summary)
    }
}

fn write_summary(summary: &CrawlSummary, path: &Path) -> Result<(), HarvestError> {
    generate_markdown_summary(summary, path)?;
    tracing::info!("Summary written to {}", path.display());
    Ok(())
}

/// Runs a complete harvest from configuration
///
/// This is the main entry point for a run. It will:
/// 1. Build the HTTP client, extractor and sink
/// 2. Discover the page count
/// 3. Crawl all pages with bounded concurrency
/// 4. Sort and deduplicate the items
/// 5. Persist the collection and optional markdown summary
pub async fn run_harvest(
    config: &Config,
    config_hash: Option<String>,
) -> Result<CrawlSummary, HarvestError> {
    let mut coordinator = Coordinator::new(config, config_hash)?;
    coordinator.run().await
}
