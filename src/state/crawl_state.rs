use crate::state::CrawlPhase;
use crate::AuditError;
use serde::Serialize;

/// A page whose fetch or parse failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedPage {
    pub url: String,
    pub error: String,
}

/// Progress of one crawl invocation
///
/// Owned by a single orchestrator run and threaded through each step by
/// mutable reference; it is never shared between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlState {
    pub phase: CrawlPhase,

    /// Pages selected for fetching
    pub pages_planned: Vec<String>,

    /// Pages fetched and extracted successfully
    pub completed: Vec<String>,

    /// Pages whose fetch or parse failed, with the reason
    pub failed: Vec<FailedPage>,

    pub cancelled: bool,

    /// Page count found in the sitemap before sampling
    pub total_pages_discovered: usize,
}

impl CrawlState {
    pub fn new() -> Self {
        Self {
            phase: CrawlPhase::Idle,
            pages_planned: Vec::new(),
            completed: Vec::new(),
            failed: Vec::new(),
            cancelled: false,
            total_pages_discovered: 0,
        }
    }

    /// Moves to the next phase, rejecting illegal transitions
    pub fn transition(&mut self, next: CrawlPhase) -> Result<(), AuditError> {
        if !self.phase.can_transition_to(next) {
            return Err(AuditError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }

        tracing::trace!("Crawl phase {} -> {}", self.phase, next);
        self.phase = next;
        if next == CrawlPhase::Cancelled {
            self.cancelled = true;
        }
        Ok(())
    }

    pub fn record_success(&mut self, url: &str) {
        self.completed.push(url.to_string());
    }

    pub fn record_failure(&mut self, url: &str, error: impl Into<String>) {
        self.failed.push(FailedPage {
            url: url.to_string(),
            error: error.into(),
        });
    }

    /// Number of planned pages that have been attempted
    pub fn pages_attempted(&self) -> usize {
        self.completed.len() + self.failed.len()
    }
}

impl Default for CrawlState {
    fn default() -> Self {
        Self::new()
    }
}
