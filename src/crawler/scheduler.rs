//! Bounded-concurrency page scheduler
//!
//! This module handles:
//! - Generating the fixed work set of page numbers `1..=N`
//! - Admission control via a semaphore (at most `concurrency_limit` jobs in flight)
//! - Collecting extracted items into a shared, mutex-guarded result set
//! - Per-page failure tolerance and progress reporting
//! - The completion barrier: the result set is read only after every job finished

use crate::config::PageUrlTemplate;
use crate::crawler::{ItemExtractor, PageFetcher};
use crate::state::{CrawlProgress, PageState};
use crate::CrawlError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{JoinError, JoinSet};

/// Unordered, append-only multiset of extracted items shared by all page jobs
///
/// Each append takes the lock once for the whole batch, so concurrent appends
/// never interleave or lose items. Empty strings are dropped on the way in.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    items: Arc<Mutex<Vec<String>>>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends every non-empty item of `batch`, returning how many were kept
    pub fn append(&self, batch: Vec<String>) -> usize {
        let kept: Vec<String> = batch.into_iter().filter(|item| !item.is_empty()).collect();
        let count = kept.len();

        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.extend(kept);
        count
    }

    pub fn len(&self) -> usize {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Takes the accumulated items out of the set
    ///
    /// Only called after the completion barrier, when no job holds a handle.
    pub fn into_items(self) -> Vec<String> {
        match Arc::try_unwrap(self.items) {
            Ok(mutex) => mutex.into_inner().unwrap_or_else(PoisonError::into_inner),
            Err(shared) => shared
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        }
    }
}

/// Terminal record of one page job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageReport {
    /// Page number in `1..=N`
    pub page: u32,

    /// Terminal state reached by the job
    pub state: PageState,

    /// Number of non-empty items this page contributed
    pub items: usize,

    /// Error description for failed pages
    pub error: Option<String>,
}

impl PageReport {
    fn extracted(page: u32, items: usize) -> Self {
        Self {
            page,
            state: PageState::Extracted,
            items,
            error: None,
        }
    }

    fn failed(page: u32, state: PageState, error: String) -> Self {
        Self {
            page,
            state,
            items: 0,
            error: Some(error),
        }
    }
}

/// Result of a complete crawl: the frozen result set plus one report per page
#[derive(Debug, Clone, Default)]
pub struct CrawlOutcome {
    /// Raw items from every successful page, in no particular order
    pub items: Vec<String>,

    /// Page reports ordered by page number
    pub pages: Vec<PageReport>,
}

impl CrawlOutcome {
    /// Number of pages a job was issued for
    pub fn attempted(&self) -> u32 {
        self.pages.len() as u32
    }

    pub fn succeeded(&self) -> u32 {
        self.pages.iter().filter(|p| p.state.is_success()).count() as u32
    }

    pub fn failed(&self) -> u32 {
        self.attempted() - self.succeeded()
    }

    /// Page numbers of every failed page, ascending
    pub fn failed_pages(&self) -> Vec<u32> {
        self.pages
            .iter()
            .filter(|p| p.state.is_error())
            .map(|p| p.page)
            .collect()
    }

    pub fn raw_item_count(&self) -> usize {
        self.items.len()
    }
}

/// Issues exactly one fetch+extract job per page with a fixed in-flight cap
///
/// # Example
///
/// ```no_run
/// use page_harvest::config::PageUrlTemplate;
/// use page_harvest::crawler::{BoundedCrawler, HttpFetcher, SelectorExtractor};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = Arc::new(HttpFetcher::new(reqwest::Client::new()));
/// let extractor = Arc::new(SelectorExtractor::new(".views-row", ".createYourOwn")?);
/// let template = PageUrlTemplate::new("https://example.com/facts?page={page}");
///
/// let outcome = BoundedCrawler::new(20)?
///     .crawl(12, &template, fetcher, extractor)
///     .await?;
/// println!("{} items from {} pages", outcome.raw_item_count(), outcome.succeeded());
/// # Ok(())
/// # }
/// ```
pub struct BoundedCrawler {
    concurrency_limit: usize,
    progress: Option<mpsc::UnboundedSender<CrawlProgress>>,
}

impl BoundedCrawler {
    /// Creates a crawler admitting at most `concurrency_limit` jobs at once
    pub fn new(concurrency_limit: u32) -> Result<Self, CrawlError> {
        if concurrency_limit == 0 {
            return Err(CrawlError::InvalidConcurrency);
        }

        Ok(Self {
            concurrency_limit: concurrency_limit as usize,
            progress: None,
        })
    }

    /// Sends a `CrawlProgress` on `sender` after every page reaches a terminal state
    ///
    /// A dropped receiver is ignored.
    pub fn with_progress(mut self, sender: mpsc::UnboundedSender<CrawlProgress>) -> Self {
        self.progress = Some(sender);
        self
    }

    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    /// Crawls pages `1..=page_count`
    ///
    /// Pages are admitted in ascending order as permits free up; completion order
    /// is unconstrained. Per-page failures are recorded, never propagated.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOutcome)` - Every job finished and at least one page succeeded
    ///   (or `page_count` was zero)
    /// * `Err(CrawlError::AllPagesFailed)` - Every attempted page failed
    pub async fn crawl(
        &self,
        page_count: u32,
        template: &PageUrlTemplate,
        fetcher: Arc<dyn PageFetcher>,
        extractor: Arc<dyn ItemExtractor>,
    ) -> Result<CrawlOutcome, CrawlError> {
        tracing::info!(
            "Crawling {} pages with at most {} in flight",
            page_count,
            self.concurrency_limit
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency_limit));
        let results = ResultSet::new();
        let mut jobs: JoinSet<PageReport> = JoinSet::new();
        let mut job_pages: HashMap<tokio::task::Id, u32> = HashMap::new();
        let mut tracker = CompletionTracker::new(page_count, self.progress.clone());

        for page in 1..=page_count {
            // Wait for a free permit, reaping finished jobs in the meantime
            let permit = loop {
                tokio::select! {
                    permit = semaphore.clone().acquire_owned() => break permit,
                    Some(joined) = jobs.join_next(), if !jobs.is_empty() => {
                        tracker.record(joined, &job_pages);
                    }
                }
            };
            let permit = permit.map_err(|_| CrawlError::AdmissionClosed)?;

            let url = template.url_for(page);
            let fetcher = Arc::clone(&fetcher);
            let extractor = Arc::clone(&extractor);
            let results = results.clone();

            let handle = jobs.spawn(async move {
                let report = run_page(page, url, fetcher.as_ref(), extractor.as_ref(), &results).await;
                drop(permit);
                report
            });
            job_pages.insert(handle.id(), page);
        }

        // Completion barrier
        while let Some(joined) = jobs.join_next().await {
            tracker.record(joined, &job_pages);
        }

        let pages = tracker.into_reports();
        let outcome = CrawlOutcome {
            items: results.into_items(),
            pages,
        };

        tracing::info!(
            "Crawl finished: {} attempted, {} succeeded, {} failed, {} items",
            outcome.attempted(),
            outcome.succeeded(),
            outcome.failed(),
            outcome.raw_item_count()
        );

        if outcome.attempted() > 0 && outcome.succeeded() == 0 {
            return Err(CrawlError::AllPagesFailed {
                attempted: outcome.attempted(),
            });
        }

        Ok(outcome)
    }
}

/// Lifecycle of a single page job
struct PageJob {
    page: u32,
    state: PageState,
}

impl PageJob {
    fn new(page: u32) -> Self {
        Self {
            page,
            state: PageState::Pending,
        }
    }

    fn advance(&mut self, next: PageState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid page transition {:?} -> {:?}",
            self.state,
            next
        );
        tracing::trace!("Page {}: {} -> {}", self.page, self.state, next);
        self.state = next;
    }

    fn fail(mut self, state: PageState, error: String) -> PageReport {
        self.advance(state);
        tracing::warn!("Page {} failed: {}", self.page, error);
        PageReport::failed(self.page, state, error)
    }
}

/// Fetches one page, extracts its items, and appends them to the result set
async fn run_page(
    page: u32,
    url: String,
    fetcher: &dyn PageFetcher,
    extractor: &dyn ItemExtractor,
    results: &ResultSet,
) -> PageReport {
    let mut job = PageJob::new(page);
    job.advance(PageState::Fetching);
    tracing::debug!("Fetching page {}: {}", page, url);

    let content = match fetcher.fetch(&url).await {
        Ok(content) => content,
        Err(e) => return job.fail(PageState::FetchFailed, e.to_string()),
    };

    let items = match extractor.extract(&content) {
        Ok(items) => items,
        Err(e) => return job.fail(PageState::ExtractFailed, e.to_string()),
    };

    let kept = results.append(items);
    job.advance(PageState::Extracted);
    PageReport::extracted(page, kept)
}

/// Collects terminal page reports and emits progress
///
/// Lives on the crawl loop only; completed counts are never shared with jobs.
struct CompletionTracker {
    total: u32,
    completed: u32,
    reports: Vec<PageReport>,
    progress: Option<mpsc::UnboundedSender<CrawlProgress>>,
}

impl CompletionTracker {
    fn new(total: u32, progress: Option<mpsc::UnboundedSender<CrawlProgress>>) -> Self {
        Self {
            total,
            completed: 0,
            reports: Vec::new(),
            progress,
        }
    }

    fn record(
        &mut self,
        joined: Result<PageReport, JoinError>,
        job_pages: &HashMap<tokio::task::Id, u32>,
    ) {
        let report = match joined {
            Ok(report) => report,
            Err(e) => {
                let Some(&page) = job_pages.get(&e.id()) else {
                    tracing::error!("Unknown page job ended abnormally: {}", e);
                    return;
                };
                tracing::warn!("Page {} failed: job aborted: {}", page, e);
                PageReport::failed(page, PageState::Aborted, format!("job aborted: {}", e))
            }
        };

        let page = report.page;
        let state = report.state;
        self.reports.push(report);

        self.completed += 1;
        let progress = CrawlProgress {
            completed: self.completed,
            total: self.total,
            page,
            state,
        };
        tracing::info!("DONE: {}", progress);

        if let Some(sender) = &self.progress {
            let _ = sender.send(progress);
        }
    }

    /// Reports ordered by page number
    fn into_reports(mut self) -> Vec<PageReport> {
        self.reports.sort_unstable_by_key(|report| report.page);
        self.reports
    }
}
