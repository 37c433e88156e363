//! Output module for rendering audit reports
//!
//! This module handles:
//! - Markdown reports for people
//! - JSON reports for tooling
//! - Writing either to stdout or a file

mod json;
mod markdown;
mod traits;

pub use json::JsonOutput;
pub use markdown::{format_markdown_report, MarkdownOutput};
pub use traits::{
    AuditSummary, CrawlDetails, OutputError, OutputHandler, OutputResult, SavingsSummary,
};

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Report format selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Markdown,
    Json,
}

impl OutputFormat {
    pub fn handler(&self) -> Box<dyn OutputHandler> {
        match self {
            Self::Markdown => Box::new(MarkdownOutput),
            Self::Json => Box::new(JsonOutput),
        }
    }
}

/// Writes a summary to a file, or to stdout when no path is given
pub fn emit_summary(
    summary: &AuditSummary,
    format: OutputFormat,
    path: Option<&Path>,
) -> OutputResult<()> {
    let handler = format.handler();
    match path {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            handler.write_summary(summary, &mut writer)?;
            writer.flush()?;
            tracing::info!("Report written to {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            handler.write_summary(summary, &mut lock)?;
            lock.flush()?;
        }
    }
    Ok(())
}
