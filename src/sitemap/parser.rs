//! Sitemap XML parsing
//!
//! Handles both `<urlset>` documents (page lists) and `<sitemapindex>`
//! documents (lists of child sitemaps). Element names are matched on their
//! local part so namespaced documents parse the same way.

use quick_xml::events::Event;
use std::collections::HashSet;

/// A parsed sitemap document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapDocument {
    /// `<sitemapindex>`: locations of child sitemaps
    Index(Vec<String>),

    /// `<urlset>`: page locations
    UrlSet(Vec<String>),
}

impl SitemapDocument {
    pub fn locations(&self) -> &[String] {
        match self {
            Self::Index(locs) | Self::UrlSet(locs) => locs,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum RootKind {
    Index,
    UrlSet,
}

/// Parses a sitemap document
///
/// Locations are trimmed, restricted to http(s) and deduplicated with first
/// occurrence order kept.
///
/// # Errors
///
/// Returns a description when the XML is malformed or the root element is
/// neither `urlset` nor `sitemapindex`.
pub fn parse_sitemap(xml: &str) -> Result<SitemapDocument, String> {
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut root: Option<RootKind> = None;
    let mut in_entry = false;
    let mut in_loc = false;
    let mut current_loc = String::new();
    let mut locations: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                match (root, name.as_str()) {
                    (None, "urlset") => root = Some(RootKind::UrlSet),
                    (None, "sitemapindex") => root = Some(RootKind::Index),
                    (None, other) => return Err(format!("unexpected root element <{}>", other)),
                    (Some(RootKind::UrlSet), "url") | (Some(RootKind::Index), "sitemap") => {
                        in_entry = true;
                        current_loc.clear();
                    }
                    (Some(_), "loc") if in_entry => in_loc = true,
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) => {
                // A self-closing root is a valid, empty document
                if root.is_none() {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                    match name.as_str() {
                        "urlset" => return Ok(SitemapDocument::UrlSet(Vec::new())),
                        "sitemapindex" => return Ok(SitemapDocument::Index(Vec::new())),
                        other => return Err(format!("unexpected root element <{}>", other)),
                    }
                }
            }
            Ok(Event::Text(ref e)) => {
                if in_loc {
                    let text = e.unescape().map_err(|err| err.to_string())?;
                    current_loc.push_str(text.trim());
                }
            }
            Ok(Event::CData(ref e)) => {
                if in_loc {
                    current_loc.push_str(String::from_utf8_lossy(e).trim());
                }
            }
            Ok(Event::End(ref e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                match name.as_str() {
                    "loc" => in_loc = false,
                    "url" | "sitemap" if in_entry => {
                        let loc = current_loc.trim();
                        if is_http_location(loc) && seen.insert(loc.to_string()) {
                            locations.push(loc.to_string());
                        }
                        in_entry = false;
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "malformed XML at position {}: {}",
                    reader.error_position(),
                    e
                ))
            }
            _ => {}
        }
        buf.clear();
    }

    match root {
        Some(RootKind::UrlSet) => Ok(SitemapDocument::UrlSet(locations)),
        Some(RootKind::Index) => Ok(SitemapDocument::Index(locations)),
        None => Err("document has no root element".to_string()),
    }
}

fn is_http_location(loc: &str) -> bool {
    let lower = loc.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
