/// Crawl phase definitions
///
/// This module defines every phase one orchestrator invocation moves through.
use serde::Serialize;
use std::fmt;

/// Represents where a crawl invocation currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlPhase {
    // ===== Initial State =====
    /// Nothing has happened yet
    Idle,

    // ===== Active States =====
    /// Looking for a sitemap via robots.txt or the default path
    DiscoveringSitemap,

    /// Choosing which sitemap pages to fetch
    SamplingPages,

    /// Fetching the page at this index of the plan
    FetchingPage(usize),

    /// Merging page results and scoring
    Compiling,

    // ===== Terminal States =====
    /// An analysis was produced
    Done,

    /// The caller cancelled; no analysis is produced
    Cancelled,

    /// The caller's input was unusable; nothing was fetched
    Failed,
}

impl CrawlPhase {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Cancelled | Self::Failed)
    }

    /// Returns true if cancellation may still take effect from this phase
    pub fn is_cancellable(&self) -> bool {
        matches!(
            self,
            Self::DiscoveringSitemap | Self::SamplingPages | Self::FetchingPage(_)
        )
    }

    /// Checks whether moving to `next` is a legal transition
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        use CrawlPhase::*;

        if next == Cancelled {
            return self.is_cancellable();
        }

        match (*self, next) {
            (Idle, DiscoveringSitemap) | (Idle, FetchingPage(0)) | (Idle, Failed) => true,
            (DiscoveringSitemap, SamplingPages) | (DiscoveringSitemap, FetchingPage(0)) => true,
            (SamplingPages, FetchingPage(0)) | (SamplingPages, Compiling) => true,
            (FetchingPage(i), FetchingPage(j)) => j == i + 1,
            (FetchingPage(_), Compiling) => true,
            (Compiling, Done) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::DiscoveringSitemap => "discovering_sitemap",
            Self::SamplingPages => "sampling_pages",
            Self::FetchingPage(_) => "fetching_page",
            Self::Compiling => "compiling",
            Self::Done => "done",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FetchingPage(i) => write!(f, "fetching_page({})", i),
            other => f.write_str(other.as_str()),
        }
    }
}
