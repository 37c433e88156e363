//! Capture (HAR) documents

use crate::config::CdnConfig;
use crate::extract::{classify_source, AssetSource, CaptureEntry, Extraction};
use crate::ParseError;
use serde::Deserialize;
use std::collections::HashSet;

#[derive(Debug, Deserialize)]
struct HarDocument {
    log: HarLog,
}

#[derive(Debug, Deserialize)]
struct HarLog {
    #[serde(default)]
    entries: Vec<HarEntry>,
}

#[derive(Debug, Deserialize)]
struct HarEntry {
    request: Option<HarRequest>,
    response: Option<HarResponse>,
}

#[derive(Debug, Deserialize)]
struct HarRequest {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HarResponse {
    #[serde(default)]
    headers: Vec<HarHeader>,
    content: Option<HarContent>,
}

#[derive(Debug, Deserialize)]
struct HarHeader {
    name: String,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct HarContent {
    #[serde(rename = "mimeType")]
    mime_type: Option<String>,
}

/// Parses a HAR document into capture entries
///
/// Entries without a request URL are skipped; a document that is not JSON or
/// lacks `log` is a [`ParseError::Capture`].
pub fn parse_capture(document: &str) -> Result<Vec<CaptureEntry>, ParseError> {
    if document.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let har: HarDocument =
        serde_json::from_str(document).map_err(|e| ParseError::Capture(e.to_string()))?;

    let entries = har
        .log
        .entries
        .into_iter()
        .filter_map(|entry| {
            let url = entry.request.and_then(|r| r.url)?;
            let (headers, mime_type) = match entry.response {
                Some(response) => (
                    response
                        .headers
                        .into_iter()
                        .map(|h| (h.name, h.value))
                        .collect(),
                    response.content.and_then(|c| c.mime_type),
                ),
                None => (Vec::new(), None),
            };
            Some(CaptureEntry {
                url,
                headers,
                mime_type,
            })
        })
        .collect();

    Ok(entries)
}

/// Extracts assets from a HAR document
///
/// `total_requests` counts every entry with a URL; a URL requested more than
/// once yields a single asset.
pub fn extract_from_capture(document: &str, cdn: &CdnConfig) -> Result<Extraction, ParseError> {
    let entries = parse_capture(document)?;
    let total_requests = entries.len();

    let mut seen = HashSet::new();
    let assets = entries
        .into_iter()
        .filter(|entry| seen.insert(entry.url.clone()))
        .filter_map(|entry| classify_source(&AssetSource::CaptureEntry(entry), cdn))
        .collect::<Vec<_>>();

    tracing::debug!(
        "Capture document: {} requests, {} media assets",
        total_requests,
        assets.len()
    );

    Ok(Extraction {
        total_requests,
        assets,
    })
}
