//! HTML markup extraction
//!
//! This module pulls media URLs out of page markup:
//! - `<img>` `src`, `data-src`, `srcset`, `data-srcset`
//! - `<source>` inside `<picture>`/`<video>`, same attributes
//! - `<video>` `src` and `poster`
//!
//! Only the first whitespace-delimited candidate of each attribute is used.
//! Markup has no response headers, so classification relies on the URL alone.

use crate::config::CdnConfig;
use crate::extract::{classify_source, AssetSource, Extraction, MarkupCandidate, MediaTag};
use crate::ParseError;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Source-bearing attributes, in the order they are read
const SOURCE_ATTRIBUTES: &[&str] = &["src", "data-src", "srcset", "data-srcset", "poster"];

/// Collects candidate URLs from media elements
///
/// Relative candidates are resolved against `base_url` when one is given.
/// `data:` URIs, fragments and unresolvable values are skipped, and each URL
/// appears at most once.
pub fn markup_sources(html: &str, base_url: Option<&Url>) -> Vec<MarkupCandidate> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    let Ok(selector) = Selector::parse("img, source, video") else {
        return candidates;
    };

    for element in document.select(&selector) {
        let tag = match element.value().name() {
            "img" => MediaTag::Img,
            "video" => MediaTag::Video,
            _ => MediaTag::Source,
        };

        for attribute in SOURCE_ATTRIBUTES {
            let Some(value) = element.value().attr(attribute) else {
                continue;
            };
            let Some(url) = first_candidate(value).and_then(|c| resolve_candidate(c, base_url))
            else {
                continue;
            };
            if seen.insert(url.clone()) {
                candidates.push(MarkupCandidate { url, tag });
            }
        }
    }

    candidates
}

/// Extracts assets from markup
///
/// Blank markup is a [`ParseError::Empty`]; anything else parses, since HTML
/// parsing is error-tolerant.
pub fn extract_from_markup(
    html: &str,
    base_url: Option<&Url>,
    cdn: &CdnConfig,
) -> Result<Extraction, ParseError> {
    if html.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let candidates = markup_sources(html, base_url);
    let total_requests = candidates.len();

    let assets = candidates
        .into_iter()
        .filter_map(|c| classify_source(&AssetSource::MarkupElement(c), cdn))
        .collect();

    Ok(Extraction {
        total_requests,
        assets,
    })
}

/// First whitespace-delimited token, without a trailing srcset comma
fn first_candidate(value: &str) -> Option<&str> {
    value
        .split_whitespace()
        .next()
        .map(|c| c.trim_end_matches(','))
        .filter(|c| !c.is_empty())
}

/// Resolves a candidate against the page URL
fn resolve_candidate(candidate: &str, base_url: Option<&Url>) -> Option<String> {
    if candidate.starts_with("data:") || candidate.starts_with('#') {
        return None;
    }

    match base_url {
        Some(base) => {
            let absolute = base.join(candidate).ok()?;
            if absolute.scheme() == "http" || absolute.scheme() == "https" {
                Some(absolute.to_string())
            } else {
                None
            }
        }
        None => Some(candidate.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/blog/post").unwrap()
    }

    fn urls(candidates: &[MarkupCandidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.url.as_str()).collect()
    }

    #[test]
    fn test_img_src_and_srcset() {
        let html = r#"<img src="/a.jpg" srcset="/a-400.jpg 400w, /a-800.jpg 800w">"#;
        let found = markup_sources(html, Some(&base_url()));
        assert_eq!(
            urls(&found),
            vec!["https://example.com/a.jpg", "https://example.com/a-400.jpg"]
        );
    }

    #[test]
    fn test_picture_and_video() {
        let html = r#"
            <picture><source srcset="https://res.cloudinary.com/demo/image/upload/f_auto/a.webp 1x"></picture>
            <video poster="poster.jpg"><source src="clip.mp4"></video>
        "#;
        let found = markup_sources(html, Some(&base_url()));
        assert_eq!(
            urls(&found),
            vec![
                "https://res.cloudinary.com/demo/image/upload/f_auto/a.webp",
                "https://example.com/blog/poster.jpg",
                "https://example.com/blog/clip.mp4",
            ]
        );
        assert_eq!(found[1].tag, MediaTag::Video);
        assert_eq!(found[2].tag, MediaTag::Source);
    }

    #[test]
    fn test_lazy_loading_attribute() {
        let html = r#"<img data-src="https://cdn.example.com/lazy.png">"#;
        let found = markup_sources(html, None);
        assert_eq!(urls(&found), vec!["https://cdn.example.com/lazy.png"]);
    }

    #[test]
    fn test_skips_data_uri_and_duplicates() {
        let html = r#"
            <img src="data:image/gif;base64,R0lGOD">
            <img src="/same.jpg"><img src="/same.jpg">
        "#;
        let found = markup_sources(html, Some(&base_url()));
        assert_eq!(urls(&found), vec!["https://example.com/same.jpg"]);
    }

    #[test]
    fn test_without_base_keeps_relative() {
        let found = markup_sources(r#"<img src="/demo/image/upload/a.jpg">"#, None);
        assert_eq!(urls(&found), vec!["/demo/image/upload/a.jpg"]);
    }

    #[test]
    fn test_extract_from_markup() {
        let html = r#"
            <img src="https://res.cloudinary.com/demo/image/upload/f_auto,q_auto/a.jpg">
            <img src="/uploads/b.jpg">
            <img src="https://www.facebook.com/tr?id=1&ev=PageView">
        "#;
        let extraction = extract_from_markup(html, Some(&base_url()), &CdnConfig::default()).unwrap();
        assert_eq!(extraction.total_requests, 3);
        assert_eq!(extraction.assets.len(), 2);
        assert!(extraction.assets[0].is_cdn());
        assert!(!extraction.assets[1].is_cdn());
    }

    #[test]
    fn test_blank_markup() {
        assert!(matches!(
            extract_from_markup("  \n", None, &CdnConfig::default()),
            Err(ParseError::Empty)
        ));
    }
}
