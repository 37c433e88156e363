//! Sitemap discovery
//!
//! Locates a site's sitemap through the relay:
//! 1. The first `Sitemap:` directive in robots.txt
//! 2. The default `/sitemap.xml`
//!
//! An index is resolved by following its first child only. Every failure
//! along the way is swallowed: a site without a usable sitemap is audited as
//! a single page instead. Cancellation is checked before each fetch and ends
//! discovery with no sitemap.

mod parser;
mod robots;

pub use parser::{parse_sitemap, SitemapDocument};
pub use robots::{find_sitemap_directive, RobotsPolicy};

use crate::crawler::RelayClient;
use tokio_util::sync::CancellationToken;
use url::Url;

/// A sitemap that yielded at least one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredSitemap {
    /// The sitemap the pages came from (the child, for an index)
    pub sitemap_url: String,

    pub pages: Vec<String>,
}

/// Everything learned about a site before sampling
#[derive(Debug, Clone)]
pub struct SiteDiscovery {
    pub robots: RobotsPolicy,
    pub sitemap: Option<DiscoveredSitemap>,
}

/// Fetches robots.txt and locates a sitemap with at least one page
pub async fn discover(relay: &RelayClient, origin: &Url, cancel: &CancellationToken) -> SiteDiscovery {
    let robots = if cancel.is_cancelled() {
        RobotsPolicy::allow_all()
    } else {
        fetch_robots(relay, origin).await
    };

    if let Some(declared) = robots.sitemap() {
        match origin.join(&declared) {
            Ok(sitemap_url) => {
                if let Some(found) = resolve_sitemap(relay, sitemap_url.as_str(), cancel).await {
                    return SiteDiscovery {
                        robots,
                        sitemap: Some(found),
                    };
                }
                tracing::debug!(
                    "Declared sitemap {} yielded no pages, trying default",
                    sitemap_url
                );
            }
            Err(e) => tracing::debug!("Ignoring unusable sitemap directive '{}': {}", declared, e),
        }
    }

    let sitemap = match origin.join("/sitemap.xml") {
        Ok(default_url) => resolve_sitemap(relay, default_url.as_str(), cancel).await,
        Err(_) => None,
    };

    SiteDiscovery { robots, sitemap }
}

/// Fetches robots.txt, falling back to a permissive policy
pub async fn fetch_robots(relay: &RelayClient, origin: &Url) -> RobotsPolicy {
    let robots_url = match origin.join("/robots.txt") {
        Ok(url) => url,
        Err(_) => return RobotsPolicy::allow_all(),
    };

    match relay.fetch(robots_url.as_str()).await {
        Ok(content) => RobotsPolicy::from_content(&content),
        Err(failure) => {
            tracing::debug!("No robots.txt for {}: {}", origin, failure);
            RobotsPolicy::allow_all()
        }
    }
}

/// Fetches and parses a sitemap, following the first child of an index
///
/// Returns `None` when nothing along the way produced a page.
pub async fn resolve_sitemap(
    relay: &RelayClient,
    sitemap_url: &str,
    cancel: &CancellationToken,
) -> Option<DiscoveredSitemap> {
    match fetch_sitemap(relay, sitemap_url, cancel).await? {
        SitemapDocument::UrlSet(pages) => non_empty(sitemap_url, pages),
        SitemapDocument::Index(children) => {
            let first = children.into_iter().next()?;
            tracing::debug!("Sitemap index {} -> following {}", sitemap_url, first);

            // Only one level of nesting is followed
            match fetch_sitemap(relay, &first, cancel).await? {
                SitemapDocument::UrlSet(pages) => non_empty(&first, pages),
                SitemapDocument::Index(_) => {
                    tracing::debug!("Nested sitemap index at {} not followed", first);
                    None
                }
            }
        }
    }
}

async fn fetch_sitemap(
    relay: &RelayClient,
    sitemap_url: &str,
    cancel: &CancellationToken,
) -> Option<SitemapDocument> {
    if cancel.is_cancelled() {
        return None;
    }

    let body = match relay.fetch(sitemap_url).await {
        Ok(body) => body,
        Err(failure) => {
            tracing::debug!("Sitemap {} unavailable: {}", sitemap_url, failure);
            return None;
        }
    };

    match parse_sitemap(&body) {
        Ok(doc) => Some(doc),
        Err(e) => {
            tracing::debug!("Sitemap {} unparseable: {}", sitemap_url, e);
            None
        }
    }
}

fn non_empty(sitemap_url: &str, pages: Vec<String>) -> Option<DiscoveredSitemap> {
    if pages.is_empty() {
        return None;
    }
    tracing::info!("Found {} pages in sitemap {}", pages.len(), sitemap_url);
    Some(DiscoveredSitemap {
        sitemap_url: sitemap_url.to_string(),
        pages,
    })
}
