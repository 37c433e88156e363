//! Relay fetcher implementation
//!
//! Every page, robots.txt and sitemap request goes through a fetch relay:
//! a GET to `{endpoint}?url=<target>`. The relay answers with the upstream
//! body on success and with a JSON `{"error": ...}` body otherwise.
//!
//! This module handles:
//! - Building the HTTP client with the crawler's user agent
//! - Relay URL construction
//! - Per-request timeouts
//! - Turning relay failures into readable, status-specific messages

use crate::config::{require_relay_endpoint, Config, UserAgentConfig};
use crate::AuditError;
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Why a relay fetch did not produce a body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    /// HTTP status reported by the relay, if a response arrived
    pub status: Option<u16>,

    /// Human-readable reason
    pub message: String,
}

impl FetchFailure {
    /// Builds a failure for a non-2xx relay response
    ///
    /// The relay's own error text, when present, is appended to a
    /// status-specific explanation.
    pub fn from_status(status: u16, relay_error: Option<String>) -> Self {
        let explanation = explain_status(status);
        let message = match relay_error {
            Some(detail) if !detail.trim().is_empty() => {
                format!("{} (relay: {})", explanation, detail.trim())
            }
            _ => explanation,
        };
        Self {
            status: Some(status),
            message,
        }
    }

    pub fn timeout(after: Duration) -> Self {
        Self {
            status: None,
            message: format!(
                "Request timed out after {}ms; the page may be too slow or blocking automated requests",
                after.as_millis()
            ),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Explains an upstream status in terms a site owner can act on
///
/// | Status | Meaning |
/// |--------|---------|
/// | 403 | Bot protection or access control |
/// | 404 | Page does not exist |
/// | 429 | Rate limited |
/// | 5xx | Site or relay outage |
pub fn explain_status(status: u16) -> String {
    match status {
        401 | 403 => format!(
            "Access denied (HTTP {}); the site likely blocks automated requests",
            status
        ),
        404 => "Page not found (HTTP 404)".to_string(),
        408 => "Upstream timed out (HTTP 408)".to_string(),
        429 => "Rate limited (HTTP 429); the site is throttling requests, try again later"
            .to_string(),
        500..=599 => format!(
            "Server error (HTTP {}); the site or relay is temporarily unavailable",
            status
        ),
        _ => format!("Unexpected response (HTTP {})", status),
    }
}

/// Error body returned by the relay for non-2xx responses
#[derive(Debug, Deserialize)]
struct RelayErrorBody {
    error: String,
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use cdn_audit::config::UserAgentConfig;
/// use cdn_audit::crawler::build_http_client;
///
/// let config = UserAgentConfig::default();
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL)
    Client::builder()
        .user_agent(config.header_value())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Client for the fetch relay
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: Client,
    endpoint: Url,
    query_param: String,
    timeout: Duration,
}

impl RelayClient {
    pub fn new(client: Client, endpoint: Url, query_param: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            endpoint,
            query_param: query_param.into(),
            timeout,
        }
    }

    /// Builds a relay client from configuration
    ///
    /// # Errors
    ///
    /// Fails when no relay endpoint is configured or the HTTP client cannot
    /// be built.
    pub fn from_config(config: &Config) -> Result<Self, AuditError> {
        let endpoint = require_relay_endpoint(&config.relay)?;
        let client = build_http_client(&config.user_agent)?;
        Ok(Self::new(
            client,
            endpoint,
            config.relay.query_param.clone(),
            Duration::from_millis(config.crawl.page_timeout_ms),
        ))
    }

    /// The underlying HTTP client
    pub fn http(&self) -> &Client {
        &self.client
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Builds the relay request URL for a target
    pub fn relay_url(&self, target: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair(&self.query_param, target);
        url
    }

    /// Fetches a target through the relay, bounded by the configured timeout
    ///
    /// On timeout the in-flight request is dropped, which aborts it.
    pub async fn fetch(&self, target: &str) -> Result<String, FetchFailure> {
        match Url::parse(target) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => {
                return Err(FetchFailure::network(format!(
                    "Not an http(s) URL: {}",
                    target
                )))
            }
        }

        match tokio::time::timeout(self.timeout, self.fetch_inner(target)).await {
            Ok(result) => result,
            Err(_) => Err(FetchFailure::timeout(self.timeout)),
        }
    }

    async fn fetch_inner(&self, target: &str) -> Result<String, FetchFailure> {
        let response = self
            .client
            .get(self.relay_url(target))
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    FetchFailure::network(format!("Relay unreachable: {}", e))
                } else {
                    FetchFailure::network(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return response
                .text()
                .await
                .map_err(|e| FetchFailure::network(format!("Failed to read body: {}", e)));
        }

        // Error bodies are best-effort; a malformed one still yields a status message
        let relay_error = match response.text().await {
            Ok(body) => serde_json::from_str::<RelayErrorBody>(&body)
                .ok()
                .map(|b| b.error),
            Err(_) => None,
        };

        Err(FetchFailure::from_status(status.as_u16(), relay_error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_client(endpoint: &str) -> RelayClient {
        RelayClient::new(
            build_http_client(&UserAgentConfig::default()).unwrap(),
            Url::parse(endpoint).unwrap(),
            "url",
            Duration::from_secs(1),
        )
    }

    #[test]
    fn test_build_http_client() {
        let config = UserAgentConfig::default();
        assert!(build_http_client(&config).is_ok());
    }

    #[test]
    fn test_relay_url_encodes_target() {
        let relay = create_test_client("https://relay.test/fetch");
        let url = relay.relay_url("https://shop.test/a?b=1&c=2");
        assert_eq!(url.path(), "/fetch");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![("url".to_string(), "https://shop.test/a?b=1&c=2".to_string())]
        );
    }

    #[test]
    fn test_relay_url_keeps_existing_query() {
        let relay = create_test_client("https://relay.test/fetch?key=abc");
        let url = relay.relay_url("https://shop.test/");
        assert_eq!(url.query(), Some("key=abc&url=https%3A%2F%2Fshop.test%2F"));
    }

    #[test]
    fn test_explain_status() {
        assert!(explain_status(403).contains("automated requests"));
        assert!(explain_status(404).contains("not found"));
        assert!(explain_status(429).contains("Rate limited"));
        assert!(explain_status(503).contains("temporarily unavailable"));
        assert!(explain_status(418).contains("418"));
    }

    #[test]
    fn test_failure_includes_relay_detail() {
        let failure = FetchFailure::from_status(403, Some("Upstream responded with 403".into()));
        assert_eq!(failure.status, Some(403));
        assert!(failure.message.contains("Access denied"));
        assert!(failure.message.contains("Upstream responded with 403"));

        let bare = FetchFailure::from_status(500, Some("  ".into()));
        assert!(!bare.message.contains("relay:"));
    }

    #[tokio::test]
    async fn test_rejects_non_http_target() {
        let relay = create_test_client("https://relay.test/fetch");
        let err = relay.fetch("ftp://shop.test/file").await.unwrap_err();
        assert_eq!(err.status, None);
        assert!(err.message.contains("http(s)"));
    }
}
