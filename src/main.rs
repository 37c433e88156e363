//! cdn-audit main entry point
//!
//! This is the command-line interface for the cdn-audit optimization auditor.

use anyhow::{bail, Context};
use cdn_audit::config::{load_config_with_hash, Config};
use cdn_audit::crawler::{estimate_analysis_savings, CrawlOutcome, Orchestrator};
use cdn_audit::extract::{extract_from_capture, extract_from_markup, extract_literal};
use cdn_audit::output::{emit_summary, AuditSummary, OutputFormat};
use cdn_audit::score::finalize;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use url::Url;

/// cdn-audit: media CDN optimization auditor
///
/// Measures how well a site uses its media CDN's automatic format, automatic
/// quality and resizing features, and suggests what to fix.
#[derive(Parser, Debug)]
#[command(name = "cdn-audit")]
#[command(version)]
#[command(about = "Audit media CDN optimization coverage", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Emit JSON instead of a markdown report
    #[arg(long, global = true)]
    json: bool,

    /// Write the report to a file instead of stdout
    #[arg(short, long, global = true, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify and score a single delivery URL
    Url {
        url: String,
    },

    /// Audit the media referenced by an HTML document
    Html {
        file: PathBuf,

        /// Resolve relative asset URLs against this page URL
        #[arg(long, value_name = "URL")]
        base_url: Option<Url>,
    },

    /// Audit the media requests recorded in a HAR capture
    Har {
        file: PathBuf,
    },

    /// Sample a live site through its sitemap and audit the sampled pages
    Site {
        url: String,

        /// Audit only the given page, skipping sitemap discovery
        #[arg(long)]
        no_sitemap: bool,

        /// Probe asset sizes and estimate bandwidth savings
        #[arg(long)]
        estimate_savings: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_configuration(cli.config.as_deref())?;
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Markdown
    };

    let summary = match cli.command {
        Command::Url { url } => {
            let extraction = extract_literal(&url, &config.cdn)?;
            AuditSummary::from_analysis(url, finalize(&extraction, &config.scoring))
        }
        Command::Html { file, base_url } => {
            let html = read_input(&file)?;
            let extraction = extract_from_markup(&html, base_url.as_ref(), &config.cdn)?;
            AuditSummary::from_analysis(
                file.display().to_string(),
                finalize(&extraction, &config.scoring),
            )
        }
        Command::Har { file } => {
            let document = read_input(&file)?;
            let extraction = extract_from_capture(&document, &config.cdn)?;
            AuditSummary::from_analysis(
                file.display().to_string(),
                finalize(&extraction, &config.scoring),
            )
        }
        Command::Site {
            url,
            no_sitemap,
            estimate_savings,
        } => {
            let mut config = config;
            if no_sitemap {
                config.crawl.use_sitemap = false;
            }
            match handle_site(config, &url, estimate_savings).await? {
                Some(summary) => summary,
                None => return Ok(()),
            }
        }
    };

    emit_summary(&summary, format, cli.output.as_deref()).context("Failed to write report")?;
    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("cdn_audit=info,warn"),
            1 => EnvFilter::new("cdn_audit=debug,info"),
            2 => EnvFilter::new("cdn_audit=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Reports go to stdout; logs stay on stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file if given, otherwise the defaults
fn load_configuration(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok(config)
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            Ok(Config::default())
        }
    }
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Runs a site audit; returns `None` when the crawl was cancelled
async fn handle_site(
    config: Config,
    site_url: &str,
    estimate_savings: bool,
) -> anyhow::Result<Option<AuditSummary>> {
    let savings_policy = config.savings;
    let orchestrator = Orchestrator::new(config).context("Site mode needs a relay endpoint")?;

    let token = CancellationToken::new();
    let signal_token = token.clone();
    tokio::spawn(async move {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            return;
        }
        tracing::info!("Received Ctrl+C, finishing the current page before stopping");
        signal_token.cancel();
    });

    let outcome = orchestrator
        .run_with_progress(site_url, &token, |state| {
            tracing::debug!(
                "Progress: {}/{} pages attempted ({} failed)",
                state.pages_attempted(),
                state.pages_planned.len(),
                state.failed.len()
            );
        })
        .await?;

    let report = match outcome {
        CrawlOutcome::Done(report) => report,
        CrawlOutcome::Cancelled(state) => {
            eprintln!(
                "Audit cancelled after {} of {} pages; no report produced.",
                state.pages_attempted(),
                state.pages_planned.len()
            );
            return Ok(None);
        }
    };

    if report.state.completed.is_empty() {
        tracing::warn!("No page could be fetched; the score reflects an empty sample");
    }

    let estimates = if estimate_savings {
        tracing::info!(
            "Probing {} asset sizes for savings estimates",
            report.analysis.per_asset.len()
        );
        Some(
            estimate_analysis_savings(
                orchestrator.relay().http(),
                &report.analysis,
                &savings_policy,
                Duration::from_millis(250),
                orchestrator.relay().timeout(),
                &token,
            )
            .await,
        )
    } else {
        None
    };

    if token.is_cancelled() {
        bail!("Cancelled while estimating savings");
    }

    let summary = AuditSummary::from_report(site_url, report);
    Ok(Some(match estimates {
        Some(estimates) => summary.with_savings(estimates),
        None => summary,
    }))
}
