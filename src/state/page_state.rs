/// Page state definitions for tracking crawl progress
///
/// This module defines all possible states a page job can be in during a crawl.
use std::fmt;

/// Represents the current state of a page job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    // ===== Active States =====
    /// Page number is in the work set but has not been admitted yet
    Pending,

    /// Page holds an admission permit and is being fetched or extracted
    Fetching,

    // ===== Terminal Success States =====
    /// Page was fetched and its items extracted
    Extracted,

    // ===== Terminal Error States =====
    /// Transport failure, HTTP error status, or timeout
    FetchFailed,

    /// Content was fetched but could not be turned into items
    ExtractFailed,

    /// The page job panicked before reporting a result
    Aborted,
}

impl PageState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending | Self::Fetching)
    }

    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Extracted)
    }

    /// Returns true if this represents an error state
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::FetchFailed | Self::ExtractFailed | Self::Aborted
        )
    }

    /// Returns true if moving from `self` to `next` follows the page lifecycle
    ///
    /// `Pending -> Fetching -> {Extracted, FetchFailed, ExtractFailed}`; a job may
    /// be aborted from either active state. Terminal states never change.
    pub fn can_transition_to(&self, next: PageState) -> bool {
        match (self, next) {
            (Self::Pending, Self::Fetching) => true,
            (Self::Fetching, Self::Extracted | Self::FetchFailed | Self::ExtractFailed) => true,
            (Self::Pending | Self::Fetching, Self::Aborted) => true,
            _ => false,
        }
    }

    /// Short name used in logs and progress lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetching => "fetching",
            Self::Extracted => "extracted",
            Self::FetchFailed => "fetch_failed",
            Self::ExtractFailed => "extract_failed",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
