//! Site crawling through a fetch relay
//!
//! This module contains the site-mode logic, including:
//! - Relay fetching with per-page timeouts
//! - Random page sampling
//! - Crawl orchestration with cooperative cancellation
//! - Asset size probing for savings estimates

mod coordinator;
mod fetcher;
mod probe;
mod sampler;

pub use coordinator::{merge_extractions, CrawlOutcome, CrawlReport, Orchestrator};
pub use fetcher::{build_http_client, explain_status, FetchFailure, RelayClient};
pub use probe::{estimate_analysis_savings, parse_content_range_total, probe_asset, AssetSize};
pub use sampler::{select_pages, MAX_SAMPLE_SIZE};
