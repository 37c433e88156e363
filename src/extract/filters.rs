//! Media detection, exclusion list and CDN response evidence

use crate::config::CdnConfig;
use crate::url::file_extension;
use url::Url;

/// URL fragments of tracking, analytics and ad endpoints
const EXCLUDED_PATTERNS: &[&str] = &[
    "google-analytics.com",
    "googletagmanager.com",
    "doubleclick.net",
    "googlesyndication.com",
    "adservice.google",
    "facebook.com/tr",
    "connect.facebook.net",
    "bat.bing.com",
    "clarity.ms",
    "hotjar.com",
    "segment.io",
    "/analytics/",
    "/pixel?",
    "/pixel.gif",
    "/beacon",
    "/collect?",
    "/tracking",
    "favicon",
];

/// Static files that are never media even if served next to images
const NON_MEDIA_EXTENSIONS: &[&str] = &[
    "js", "mjs", "css", "json", "map", "woff", "woff2", "ttf", "otf", "eot", "html", "htm",
    "xml", "txt", "pdf",
];

const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "avif", "svg", "bmp", "tif", "tiff", "heic", "heif",
    "jxl", "ico",
];

/// Returns the lowercase extension of the last path segment, ignoring query and fragment
pub fn url_extension(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let last = path.rsplit('/').next().unwrap_or_default();
    file_extension(last)
}

/// Returns true if the URL must never be reported as a media asset
pub fn is_excluded(url: &str) -> bool {
    let trimmed = url.trim();
    if trimmed.is_empty() || trimmed.starts_with("data:") || trimmed.starts_with("blob:") {
        return true;
    }

    let lower = trimmed.to_ascii_lowercase();
    if EXCLUDED_PATTERNS.iter().any(|p| lower.contains(p)) {
        return true;
    }

    url_extension(&lower).is_some_and(|ext| NON_MEDIA_EXTENSIONS.contains(&ext.as_str()))
}

/// Returns true if the URL or MIME type says image or video
pub fn is_media(url: &str, mime_type: Option<&str>) -> bool {
    if let Some(mime) = mime_type {
        let mime = mime.trim().to_ascii_lowercase();
        if mime.starts_with("image/") || mime.starts_with("video/") {
            return true;
        }
    }

    url_extension(url).is_some_and(|ext| {
        IMAGE_EXTENSIONS.contains(&ext.as_str()) || crate::url::is_video_extension(&ext)
    })
}

/// Returns true if a captured response carries CDN evidence
///
/// Evidence is any of: a delivery host, a CDN-specific header name, or a CDN
/// token in the `Server` header.
pub fn has_cdn_signature(url: &str, headers: &[(String, String)], cdn: &CdnConfig) -> bool {
    let host_match = Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
        .is_some_and(|host| cdn.delivery_hosts.iter().any(|h| h.eq_ignore_ascii_case(&host)));
    if host_match {
        return true;
    }

    headers.iter().any(|(name, value)| {
        let name = name.to_ascii_lowercase();
        if cdn
            .header_prefixes
            .iter()
            .any(|prefix| name.starts_with(&prefix.to_ascii_lowercase()))
        {
            return true;
        }
        if name == "server" {
            let value = value.to_ascii_lowercase();
            return cdn
                .server_tokens
                .iter()
                .any(|token| value.contains(&token.to_ascii_lowercase()));
        }
        false
    })
}
