//! Configuration module for cdn-audit
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section has defaults, so running without a file is valid; only site
//! mode additionally requires a relay endpoint.
//!
//! # Example
//!
//! ```no_run
//! use cdn_audit::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("cdn-audit.toml")).unwrap();
//! println!("Inter-page delay: {}ms", config.crawl.inter_page_delay_ms);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CdnConfig, Config, CrawlConfig, RelayConfig, SavingsPolicy, ScoringConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::{require_relay_endpoint, validate};
