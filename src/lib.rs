//! cdn-audit: media CDN optimization coverage auditor
//!
//! This crate inspects how a website uses a media-delivery CDN's optimization
//! features. It classifies delivery URLs, derives per-asset issues, computes a
//! reproducible coverage score and suggests fixes. Inputs can be a network
//! capture (HAR), raw markup, a single delivery URL, or a live site sampled
//! through its sitemap via a fetch relay.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod score;
pub mod sitemap;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for cdn-audit operations
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid site URL '{url}': {reason}")]
    InvalidSiteUrl { url: String, reason: String },

    #[error("Failed to fetch {url}: {message}")]
    PageFetch {
        url: String,
        status: Option<u16>,
        message: String,
    },

    #[error("Invalid crawl transition: {from} -> {to}")]
    InvalidTransition {
        from: state::CrawlPhase,
        to: state::CrawlPhase,
    },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Malformed primary input for a single-shot analysis
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Malformed capture document: {0}")]
    Capture(String),

    #[error("Not a recognizable CDN delivery URL: {0}")]
    UnrecognizedUrl(String),

    #[error("Empty input")]
    Empty,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for cdn-audit operations
pub type Result<T> = std::result::Result<T, AuditError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlOutcome, CrawlReport, Orchestrator};
pub use extract::{AssetReference, AssetSource, Extraction};
pub use score::{finalize, AnalysisResult, AnalyzedAsset, IssueCode};
pub use state::{CrawlPhase, CrawlState};
pub use url::{classify, CdnDescriptor, DeliveryType, ResourceType};
