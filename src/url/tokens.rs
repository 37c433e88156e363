//! Transformation grammar matcher
//!
//! Delivery URLs carry optimization directives as path segments such as
//! `f_auto,q_auto,w_500`. A single directive is a *token*: a known parameter
//! key, an underscore, and either a keyword (`auto`, `fill`, `auto:good`) or a
//! number (`500`, `2.0`, `16:9`). This module classifies individual path
//! segments so the classifier can walk a path without ad hoc string scans.

use regex::Regex;
use std::sync::OnceLock;

/// Parameter keys the CDN accepts in a transformation token
///
/// Restricting the key keeps ordinary folder names like `my_photos` from
/// being read as directives.
const KNOWN_PARAMS: &[&str] = &[
    "a", "ac", "af", "ar", "b", "bo", "c", "co", "cs", "d", "dl", "dn", "dpr", "du", "e", "eo",
    "f", "fl", "fn", "fps", "g", "h", "ki", "l", "o", "p", "pg", "q", "r", "so", "sp", "t",
    "u", "vc", "vs", "w", "x", "y", "z",
];

/// Video container extensions; anything else with an extension is an image
const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "webm", "mov", "m4v", "ogv", "avi", "mkv", "m3u8", "mpd", "flv", "wmv", "3gp",
];

/// What a single path segment looks like to the classifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    /// A comma-joined list of transformation tokens
    Transformation(Vec<String>),
    /// A version marker (`v1712345678`)
    Version,
    /// A segment ending in a file extension
    File,
    /// Anything else (folder names, cloud names)
    Plain,
}

fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([a-z]+)_(?:[A-Za-z][A-Za-z0-9_:\-]*|\d+(?:[.:]\d+)?)$")
            .expect("token regex is valid")
    })
}

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^v\d+$").expect("version regex is valid"))
}

fn extension_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\.([A-Za-z0-9]{2,5})$").expect("extension regex is valid"))
}

/// Returns true if `token` is a single transformation directive
///
/// # Examples
///
/// ```
/// use cdn_audit::url::is_transformation_token;
///
/// assert!(is_transformation_token("f_auto"));
/// assert!(is_transformation_token("q_auto:good"));
/// assert!(is_transformation_token("w_500"));
/// assert!(!is_transformation_token("my_photos"));
/// assert!(!is_transformation_token("sample.jpg"));
/// ```
pub fn is_transformation_token(token: &str) -> bool {
    token_regex()
        .captures(token)
        .and_then(|caps| caps.get(1))
        .is_some_and(|key| KNOWN_PARAMS.contains(&key.as_str()))
}

/// Splits a segment into tokens if every comma-separated part is a directive
///
/// Empty parts (from `f_auto,,q_auto` or a trailing comma) are dropped. Returns
/// `None` when the segment holds no tokens or any part is not a directive.
pub fn parse_transformation_segment(segment: &str) -> Option<Vec<String>> {
    let tokens: Vec<String> = segment
        .split(',')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    if tokens.is_empty() || !tokens.iter().all(|t| is_transformation_token(t)) {
        return None;
    }

    Some(tokens)
}

/// Returns true for a version marker segment (`v` followed by digits)
pub fn is_version_marker(segment: &str) -> bool {
    version_regex().is_match(segment)
}

/// Returns the lowercase file extension of a segment, if it has one
pub fn file_extension(segment: &str) -> Option<String> {
    extension_regex()
        .captures(segment)
        .and_then(|caps| caps.get(1))
        .map(|ext| ext.as_str().to_ascii_lowercase())
}

/// Returns true if the extension names a video container
pub fn is_video_extension(ext: &str) -> bool {
    VIDEO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
}

/// Classifies one path segment
///
/// Version markers win over everything, then transformation lists, then
/// file-bearing segments.
pub fn classify_segment(segment: &str) -> SegmentKind {
    if is_version_marker(segment) {
        SegmentKind::Version
    } else if let Some(tokens) = parse_transformation_segment(segment) {
        SegmentKind::Transformation(tokens)
    } else if file_extension(segment).is_some() {
        SegmentKind::File
    } else {
        SegmentKind::Plain
    }
}
