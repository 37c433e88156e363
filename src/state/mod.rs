//! State module for tracking crawl progress
//!
//! This module provides the state machine one crawl invocation moves through.
//!
//! # Components
//!
//! - `CrawlPhase`: The phase of a crawl (discovering, sampling, fetching, compiling, terminal)
//! - `CrawlState`: Per-invocation progress: planned, completed and failed pages, cancellation

mod crawl_phase;
mod crawl_state;

// Re-export main types
pub use crawl_phase::CrawlPhase;
pub use crawl_state::{CrawlState, FailedPage};
