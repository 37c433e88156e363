use crate::AuditError;
use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use cdn_audit::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Parses and validates the site URL a crawl starts from
///
/// A bare host such as `example.com` is accepted and treated as `https://`.
/// Anything that is empty, not http(s), or has no host is rejected before any
/// network activity starts.
pub fn parse_site_url(input: &str) -> Result<Url, AuditError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AuditError::Validation("site URL is empty".to_string()));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        // `host:port` is a bare host; any other `x:` prefix is a foreign scheme
        if let Some((scheme, rest)) = trimmed.split_once(':') {
            let port = rest.split('/').next().unwrap_or_default();
            if port.is_empty() || !port.chars().all(|c| c.is_ascii_digit()) {
                return Err(AuditError::InvalidSiteUrl {
                    url: trimmed.to_string(),
                    reason: format!("unsupported scheme '{}'", scheme),
                });
            }
        }
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&candidate).map_err(|e| AuditError::InvalidSiteUrl {
        url: trimmed.to_string(),
        reason: e.to_string(),
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(AuditError::InvalidSiteUrl {
            url: trimmed.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }

    if extract_domain(&url).is_none() {
        return Err(AuditError::InvalidSiteUrl {
            url: trimmed.to_string(),
            reason: "missing host".to_string(),
        });
    }

    Ok(url)
}

/// Returns the origin (scheme, host and port) of a URL as a base for joins
pub fn site_origin(url: &Url) -> Url {
    let mut origin = url.clone();
    origin.set_path("/");
    origin.set_query(None);
    origin.set_fragment(None);
    origin
}
