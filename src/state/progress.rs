use crate::state::PageState;
use std::fmt;

/// One progress observation, emitted after a page job reaches a terminal state
///
/// Purely informational; the crawler never reads these back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlProgress {
    /// Number of page jobs that have finished so far
    pub completed: u32,

    /// Total number of page jobs in this crawl
    pub total: u32,

    /// The page whose completion produced this observation
    pub page: u32,

    /// Terminal state of that page
    pub state: PageState,
}

impl CrawlProgress {
    /// Completion percentage in `[0, 100]`
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.completed as f64 / self.total as f64) * 100.0
    }

    pub fn is_finished(&self) -> bool {
        self.completed >= self.total
    }
}

impl fmt::Display for CrawlProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} ({:.2}%) || processed page {} [{}]",
            self.completed,
            self.total,
            self.percent(),
            self.page,
            self.state
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent() {
        let progress = CrawlProgress {
            completed: 1,
            total: 4,
            page: 3,
            state: PageState::Extracted,
        };
        assert!((progress.percent() - 25.0).abs() < 0.001);
        assert!(!progress.is_finished());
    }

    #[test]
    fn test_display() {
        let progress = CrawlProgress {
            completed: 2,
            total: 2,
            page: 1,
            state: PageState::FetchFailed,
        };
        assert_eq!(
            progress.to_string(),
            "2/2 (100.00%) || processed page 1 [fetch_failed]"
        );
        assert!(progress.is_finished());
    }
}
