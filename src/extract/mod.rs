//! Asset extraction
//!
//! Turns a capture document, a markup string, or a literal URL into a list of
//! [`AssetReference`]s. Every input shape is first converted into an
//! [`AssetSource`] variant, and one function, [`classify_source`], decides
//! whether the source is a CDN asset, a non-CDN media asset, or noise.

mod capture;
mod filters;
mod markup;

pub use capture::{extract_from_capture, parse_capture};
pub use filters::{has_cdn_signature, is_excluded, is_media, url_extension};
pub use markup::{extract_from_markup, markup_sources};

use crate::config::CdnConfig;
use crate::url::{classify, CdnDescriptor};
use crate::ParseError;
use serde::Serialize;

/// A media reference found in some input
///
/// Immutable once produced; crawl mode records the page it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetReference {
    pub url: String,
    pub descriptor: Option<CdnDescriptor>,
    pub source_page: Option<String>,
}

impl AssetReference {
    /// Returns true if the asset is served through the CDN
    pub fn is_cdn(&self) -> bool {
        self.descriptor.is_some()
    }

    /// Raw and SVG CDN assets get no optimization advice
    pub fn is_exempt(&self) -> bool {
        self.descriptor.as_ref().is_some_and(CdnDescriptor::is_exempt)
    }

    /// Returns a copy attributed to the page it was found on
    pub fn with_source_page(mut self, page: &str) -> Self {
        self.source_page = Some(page.to_string());
        self
    }
}

/// One network request from a capture document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureEntry {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub mime_type: Option<String>,
}

/// Media element kinds taken from markup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaTag {
    Img,
    Source,
    Video,
}

/// One candidate URL taken from a markup element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupCandidate {
    pub url: String,
    pub tag: MediaTag,
}

/// The input shapes that can yield an asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSource {
    CaptureEntry(CaptureEntry),
    MarkupElement(MarkupCandidate),
    LiteralUrl(String),
}

impl AssetSource {
    pub fn url(&self) -> &str {
        match self {
            Self::CaptureEntry(entry) => &entry.url,
            Self::MarkupElement(candidate) => &candidate.url,
            Self::LiteralUrl(url) => url,
        }
    }
}

/// Result of running one extraction mode over one input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Number of requests (capture) or candidate URLs (markup) inspected
    pub total_requests: usize,
    pub assets: Vec<AssetReference>,
}

impl Extraction {
    /// Tags every asset with the page it was found on
    pub fn with_source_page(self, page: &str) -> Self {
        Self {
            total_requests: self.total_requests,
            assets: self
                .assets
                .into_iter()
                .map(|a| a.with_source_page(page))
                .collect(),
        }
    }
}

/// Decides what a source is
///
/// * Capture entries count as CDN assets only when the URL classifies **and**
///   the response carries CDN evidence or the URL has transformations.
/// * Markup candidates count as CDN assets whenever the URL classifies.
/// * Anything else is non-CDN media when it looks like media and is not on
///   the exclusion list; otherwise it is dropped.
/// * Literal URLs yield an asset only when they classify.
pub fn classify_source(source: &AssetSource, cdn: &CdnConfig) -> Option<AssetReference> {
    let url = source.url().trim();
    let descriptor = classify(url);

    let cdn_served = match (source, &descriptor) {
        (_, None) => false,
        (AssetSource::CaptureEntry(entry), Some(d)) => {
            has_cdn_signature(url, &entry.headers, cdn) || !d.transformations.is_empty()
        }
        (AssetSource::MarkupElement(_), Some(_)) | (AssetSource::LiteralUrl(_), Some(_)) => true,
    };

    if cdn_served {
        return Some(AssetReference {
            url: url.to_string(),
            descriptor,
            source_page: None,
        });
    }

    let media = match source {
        AssetSource::CaptureEntry(entry) => is_media(url, entry.mime_type.as_deref()),
        AssetSource::MarkupElement(_) => true,
        AssetSource::LiteralUrl(_) => false,
    };

    (media && !is_excluded(url)).then(|| AssetReference {
        url: url.to_string(),
        descriptor: None,
        source_page: None,
    })
}

/// Classifies exactly one delivery URL
///
/// This is the only mode where a classification miss is an error.
pub fn extract_literal(url: &str, cdn: &CdnConfig) -> Result<Extraction, ParseError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    let asset = classify_source(&AssetSource::LiteralUrl(trimmed.to_string()), cdn)
        .ok_or_else(|| ParseError::UnrecognizedUrl(trimmed.to_string()))?;

    Ok(Extraction {
        total_requests: 1,
        assets: vec![asset],
    })
}
