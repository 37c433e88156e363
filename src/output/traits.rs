//! Output handler traits and types
//!
//! This module defines the trait interface for report writers and the audit
//! summary they render.

use crate::crawler::CrawlReport;
use crate::score::savings::{total_estimated_savings, SavingsEstimate};
use crate::score::AnalysisResult;
use crate::state::CrawlState;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to format output: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for OutputError {
    fn from(e: serde_json::Error) -> Self {
        Self::Format(e.to_string())
    }
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Crawl metadata for site audits
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlDetails {
    pub state: CrawlState,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlDetails {
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}

/// Savings estimates with their total
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsSummary {
    pub estimates: Vec<SavingsEstimate>,
    pub total_estimated_savings_bytes: u64,
}

impl SavingsSummary {
    pub fn new(estimates: Vec<SavingsEstimate>) -> Self {
        let total_estimated_savings_bytes = total_estimated_savings(&estimates);
        Self {
            estimates,
            total_estimated_savings_bytes,
        }
    }
}

/// Everything a report renders
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditSummary {
    /// What was audited: a URL, a file path or a site
    pub source: String,

    pub analysis: AnalysisResult,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub crawl: Option<CrawlDetails>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub savings: Option<SavingsSummary>,
}

impl AuditSummary {
    pub fn from_analysis(source: impl Into<String>, analysis: AnalysisResult) -> Self {
        Self {
            source: source.into(),
            analysis,
            crawl: None,
            savings: None,
        }
    }

    pub fn from_report(source: impl Into<String>, report: CrawlReport) -> Self {
        Self {
            source: source.into(),
            analysis: report.analysis,
            crawl: Some(CrawlDetails {
                state: report.state,
                started_at: report.started_at,
                finished_at: report.finished_at,
            }),
            savings: None,
        }
    }

    pub fn with_savings(mut self, estimates: Vec<SavingsEstimate>) -> Self {
        self.savings = Some(SavingsSummary::new(estimates));
        self
    }
}

/// Trait for rendering audit summaries
pub trait OutputHandler {
    /// Writes the summary to the given sink
    fn write_summary(&self, summary: &AuditSummary, out: &mut dyn Write) -> OutputResult<()>;
}
