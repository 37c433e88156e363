//! Markdown report generation
//!
//! This module renders human-readable audit reports: the score, coverage
//! breakdown, suggestions, per-asset issues and, for site audits, the crawl
//! outcome per page.

use crate::output::traits::{AuditSummary, OutputHandler, OutputResult};
use std::io::Write;

/// Renders summaries as markdown
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownOutput;

impl OutputHandler for MarkdownOutput {
    fn write_summary(&self, summary: &AuditSummary, out: &mut dyn Write) -> OutputResult<()> {
        out.write_all(format_markdown_report(summary).as_bytes())?;
        Ok(())
    }
}

/// Formats an audit summary as markdown
pub fn format_markdown_report(summary: &AuditSummary) -> String {
    let analysis = &summary.analysis;
    let coverage = &analysis.coverage;
    let mut md = String::new();

    md.push_str("# CDN Optimization Audit\n\n");
    md.push_str(&format!("- **Source**: {}\n", summary.source));
    md.push_str(&format!("- **Score**: {}/100\n", analysis.score));
    md.push_str(&format!("- **Requests inspected**: {}\n", analysis.total_requests));
    if let Some(sampling) = &analysis.sampling {
        md.push_str(&format!(
            "- **Pages sampled**: {} of {} ({}%)\n",
            sampling.pages_sampled, sampling.total_pages_in_sitemap, sampling.percentage
        ));
    }
    md.push('\n');

    // Coverage
    md.push_str("## Coverage\n\n");
    md.push_str("| Metric | Count |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| Media assets | {} |\n", coverage.total));
    md.push_str(&format!("| Served by CDN | {} |\n", coverage.cdn));
    md.push_str(&format!("| Not on CDN | {} |\n", coverage.non_cdn));
    md.push_str(&format!("| f_auto | {} |\n", coverage.auto_format));
    md.push_str(&format!("| q_auto | {} |\n", coverage.auto_quality));
    md.push_str(&format!("| Fully optimized | {} |\n", coverage.fully_optimized));
    md.push_str(&format!("| Missing sizing | {} |\n", coverage.missing_sizing));
    md.push_str(&format!("| Exempt (raw/SVG) | {} |\n", coverage.exempt));
    md.push('\n');

    if !analysis.suggestions.is_empty() {
        md.push_str("## Suggestions\n\n");
        for suggestion in &analysis.suggestions {
            md.push_str(&format!("- `{}`: {}\n", suggestion.code(), suggestion));
        }
        md.push('\n');
    }

    let flagged: Vec<_> = analysis
        .per_asset
        .iter()
        .filter(|a| !a.issues.is_empty())
        .collect();
    if !flagged.is_empty() {
        md.push_str("## Assets With Issues\n\n");
        md.push_str("| Asset | Issues | Fix |\n");
        md.push_str("|-------|--------|-----|\n");
        for asset in flagged {
            let issues: Vec<&str> = asset.issues.iter().map(|i| i.as_str()).collect();
            let fixes: Vec<&str> = asset.issues.iter().map(|i| i.fix()).collect();
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                asset.url,
                issues.join(", "),
                fixes.join(", ")
            ));
        }
        md.push('\n');
    }

    if !analysis.non_cdn_media_assets.is_empty() {
        md.push_str("## Media Not Served By The CDN\n\n");
        for url in &analysis.non_cdn_media_assets {
            md.push_str(&format!("- {}\n", url));
        }
        md.push('\n');
    }

    if let Some(savings) = &summary.savings {
        md.push_str("## Estimated Savings\n\n");
        md.push_str("| Asset | Size | Reduction | Savings |\n");
        md.push_str("|-------|------|-----------|---------|\n");
        for estimate in savings.estimates.iter().filter(|e| e.percent > 0) {
            md.push_str(&format!(
                "| {} | {} | {}% | {} |\n",
                estimate.url,
                format_bytes(estimate.bytes),
                estimate.percent,
                format_bytes(estimate.estimated_savings_bytes)
            ));
        }
        md.push_str(&format!(
            "\n**Total estimated savings**: {}\n\n",
            format_bytes(Some(savings.total_estimated_savings_bytes))
        ));
    }

    if let Some(crawl) = &summary.crawl {
        md.push_str("## Crawl\n\n");
        md.push_str(&format!("- **Started**: {}\n", crawl.started_at.to_rfc3339()));
        md.push_str(&format!("- **Finished**: {}\n", crawl.finished_at.to_rfc3339()));
        md.push_str(&format!("- **Duration**: {} seconds\n", crawl.duration_seconds()));
        md.push_str(&format!(
            "- **Pages**: {} succeeded, {} failed\n\n",
            crawl.state.completed.len(),
            crawl.state.failed.len()
        ));

        if !crawl.state.failed.is_empty() {
            md.push_str("### Failed Pages\n\n");
            md.push_str("| Page | Error |\n");
            md.push_str("|------|-------|\n");
            for failed in &crawl.state.failed {
                md.push_str(&format!("| {} | {} |\n", failed.url, failed.error));
            }
            md.push('\n');
        }
    }

    md
}

fn format_bytes(bytes: Option<u64>) -> String {
    match bytes {
        None => "unknown".to_string(),
        Some(b) if b >= 1024 * 1024 => format!("{:.1} MB", b as f64 / (1024.0 * 1024.0)),
        Some(b) if b >= 1024 => format!("{:.1} KB", b as f64 / 1024.0),
        Some(b) => format!("{} B", b),
    }
}
