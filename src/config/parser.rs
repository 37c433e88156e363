//! TOML loading for the audit policy
//!
//! The file is read once; the same bytes are parsed, validated and hashed so
//! the hash logged at startup always describes the policy that actually ran.

use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Reads, parses and validates a policy file
///
/// ```no_run
/// use std::path::Path;
/// use cdn_audit::config::load_config;
///
/// let config = load_config(Path::new("cdn-audit.toml")).unwrap();
/// println!("Sampling up to {} pages", config.crawl.max_pages);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    load_config_with_hash(path).map(|(config, _)| config)
}

/// Parses and validates a policy from TOML text
///
/// Missing sections and keys fall back to their defaults, so an empty
/// document is a valid policy.
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Hex-encoded SHA-256 of a policy file's raw bytes
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read(path)?;
    Ok(digest_hex(&content))
}

/// Loads a policy together with the hash of the exact bytes it came from
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, digest_hex(content.as_bytes())))
}

fn digest_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
