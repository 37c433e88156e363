use serde::Deserialize;

/// Main configuration structure for cdn-audit
///
/// Every section is optional in the TOML file; missing sections fall back to
/// their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub cdn: CdnConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub savings: SavingsPolicy,
}

/// Fetch relay configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Relay endpoint; site mode refuses to run without one
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Name of the query parameter carrying the target URL
    #[serde(rename = "query-param", default = "default_query_param")]
    pub query_param: String,
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Maximum number of sitemap pages sampled per run
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: usize,

    /// Per-fetch timeout (milliseconds); the in-flight request is aborted when it fires
    #[serde(rename = "page-timeout-ms", default = "default_page_timeout_ms")]
    pub page_timeout_ms: u64,

    /// Fixed delay between page fetches (milliseconds)
    #[serde(rename = "inter-page-delay-ms", default = "default_inter_page_delay_ms")]
    pub inter_page_delay_ms: u64,

    /// Whether to discover pages through the sitemap at all
    #[serde(rename = "use-sitemap", default = "default_true")]
    pub use_sitemap: bool,

    /// Drop sitemap pages disallowed by robots.txt before sampling
    #[serde(rename = "respect-robots", default = "default_true")]
    pub respect_robots: bool,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,
}

impl UserAgentConfig {
    /// Formats the user agent header value: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

/// Evidence that a captured response was served by the CDN
#[derive(Debug, Clone, Deserialize)]
pub struct CdnConfig {
    /// Hostnames that only serve CDN deliveries
    #[serde(rename = "delivery-hosts", default = "default_delivery_hosts")]
    pub delivery_hosts: Vec<String>,

    /// Tokens looked for in the `Server` response header
    #[serde(rename = "server-tokens", default = "default_server_tokens")]
    pub server_tokens: Vec<String>,

    /// Response header name prefixes set by the CDN
    #[serde(rename = "header-prefixes", default = "default_header_prefixes")]
    pub header_prefixes: Vec<String>,
}

/// Site-level suggestion thresholds
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    /// Auto-format ratio below which adoption is suggested
    #[serde(rename = "auto-format-threshold", default = "default_threshold")]
    pub auto_format_threshold: f64,

    /// Auto-quality ratio below which adoption is suggested
    #[serde(rename = "auto-quality-threshold", default = "default_threshold")]
    pub auto_quality_threshold: f64,
}

/// Advisory bandwidth savings per optimization, in percent
///
/// These are policy estimates, not measurements.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SavingsPolicy {
    #[serde(rename = "auto-format", default = "default_format_savings")]
    pub auto_format: u8,

    #[serde(rename = "auto-quality", default = "default_quality_savings")]
    pub auto_quality: u8,

    #[serde(rename = "responsive-sizing", default = "default_sizing_savings")]
    pub responsive_sizing: u8,
}

fn default_query_param() -> String {
    "url".to_string()
}

fn default_max_pages() -> usize {
    10
}

fn default_page_timeout_ms() -> u64 {
    15_000
}

fn default_inter_page_delay_ms() -> u64 {
    1_000
}

fn default_true() -> bool {
    true
}

fn default_crawler_name() -> String {
    "cdn-audit".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_delivery_hosts() -> Vec<String> {
    vec!["res.cloudinary.com".to_string()]
}

fn default_server_tokens() -> Vec<String> {
    vec!["cloudinary".to_string()]
}

fn default_header_prefixes() -> Vec<String> {
    vec!["x-cld-".to_string()]
}

fn default_threshold() -> f64 {
    0.8
}

fn default_format_savings() -> u8 {
    25
}

fn default_quality_savings() -> u8 {
    15
}

fn default_sizing_savings() -> u8 {
    10
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            query_param: default_query_param(),
        }
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            page_timeout_ms: default_page_timeout_ms(),
            inter_page_delay_ms: default_inter_page_delay_ms(),
            use_sitemap: true,
            respect_robots: true,
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: None,
        }
    }
}

impl Default for CdnConfig {
    fn default() -> Self {
        Self {
            delivery_hosts: default_delivery_hosts(),
            server_tokens: default_server_tokens(),
            header_prefixes: default_header_prefixes(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            auto_format_threshold: default_threshold(),
            auto_quality_threshold: default_threshold(),
        }
    }
}

impl Default for SavingsPolicy {
    fn default() -> Self {
        Self {
            auto_format: default_format_savings(),
            auto_quality: default_quality_savings(),
            responsive_sizing: default_sizing_savings(),
        }
    }
}
