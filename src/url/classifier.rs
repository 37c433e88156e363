//! Delivery URL classification
//!
//! Two recognizers run in order. The canonical one looks for the
//! `[cloudName/]{resourceType}/{deliveryType}/[transformations/][vN/]publicId`
//! layout anywhere in the path. The fallback handles custom domains (CNAMEs)
//! that drop the resource/delivery segments but still carry transformation
//! directives ahead of a file name.

use crate::url::descriptor::{CdnDescriptor, DeliveryType, ResourceType};
use crate::url::tokens::{
    classify_segment, file_extension, is_version_marker, is_video_extension,
    parse_transformation_segment, SegmentKind,
};
use std::collections::BTreeSet;
use url::Url;

/// The parts of an input string the recognizers work on
struct PathView {
    host: Option<String>,
    segments: Vec<String>,
}

impl PathView {
    /// Accepts absolute http(s) URLs, protocol-relative URLs and bare paths
    fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        let absolute = if input.starts_with("//") {
            Url::parse(&format!("https:{}", input)).ok()
        } else {
            Url::parse(input).ok()
        };

        match absolute {
            Some(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    return None;
                }
                let segments = url
                    .path_segments()
                    .map(|segs| segs.filter(|s| !s.is_empty()).map(str::to_string).collect())
                    .unwrap_or_default();
                Some(Self {
                    host: url.host_str().map(|h| h.to_lowercase()),
                    segments,
                })
            }
            None => {
                // Only a relative reference gets here; anything with a scheme
                // the url crate rejected is not a path.
                if input.contains(':') && !input.starts_with('/') {
                    let before_colon = input.split(':').next().unwrap_or_default();
                    if !before_colon.contains('/') {
                        return None;
                    }
                }
                let path = input.split(['?', '#']).next().unwrap_or_default();
                let segments = path
                    .split('/')
                    .filter(|s| !s.is_empty() && *s != "." && *s != "..")
                    .map(str::to_string)
                    .collect();
                Some(Self {
                    host: None,
                    segments,
                })
            }
        }
    }
}

/// Classifies a URL string into a CDN descriptor
///
/// Never fails loudly: anything unparsable or unrecognized yields `None`.
///
/// # Examples
///
/// ```
/// use cdn_audit::url::{classify, DeliveryType, ResourceType};
///
/// let d = classify("/cloud/image/upload/f_auto,q_auto,w_500/sample.jpg").unwrap();
/// assert_eq!(d.resource_type, ResourceType::Image);
/// assert_eq!(d.delivery_type, DeliveryType::Upload);
/// assert_eq!(d.public_id, "sample.jpg");
/// assert!(d.has_token("w_500"));
///
/// assert!(classify("https://example.com/about/team.html").is_none());
/// ```
pub fn classify(input: &str) -> Option<CdnDescriptor> {
    let view = PathView::parse(input)?;
    classify_canonical(&view).or_else(|| classify_fallback(&view))
}

/// Canonical layout recognition
fn classify_canonical(view: &PathView) -> Option<CdnDescriptor> {
    let segs = &view.segments;

    for (i, segment) in segs.iter().enumerate() {
        let Some(resource_type) = ResourceType::from_segment(segment) else {
            continue;
        };
        let Some(next) = segs.get(i + 1) else {
            continue;
        };

        // An unknown delivery segment that reads as a transformation implies
        // the default delivery type.
        let (delivery_type, scan_start) = if let Some(dt) = DeliveryType::from_segment(next) {
            (dt, i + 2)
        } else if parse_transformation_segment(next).is_some() {
            (DeliveryType::Upload, i + 1)
        } else {
            continue;
        };

        let (transformations, raw_parts, public_start) =
            scan_transformations(segs, scan_start, resource_type);

        let public_id = segs[public_start..].join("/");
        if public_id.is_empty() {
            continue;
        }

        let cloud_name = if i > 0 {
            segs[i - 1].clone()
        } else {
            view.host.clone().unwrap_or_default()
        };

        return Some(CdnDescriptor {
            cloud_name,
            resource_type,
            delivery_type,
            public_id,
            transformations,
            raw_transformations: raw_parts.join("/"),
        });
    }

    None
}

/// Walks transformation segments from `start`
///
/// Stops at the first version marker (consumed), file-bearing or plain
/// segment. Raw resources stop right after their first transformation
/// segment. Returns the token set, the raw segments and where the public id
/// begins.
fn scan_transformations(
    segs: &[String],
    start: usize,
    resource_type: ResourceType,
) -> (BTreeSet<String>, Vec<String>, usize) {
    let mut tokens = BTreeSet::new();
    let mut raw_parts = Vec::new();
    let mut j = start;

    while let Some(segment) = segs.get(j) {
        match classify_segment(segment) {
            SegmentKind::Transformation(found) => {
                tokens.extend(found);
                raw_parts.push(segment.clone());
                j += 1;
                if resource_type == ResourceType::Raw {
                    break;
                }
            }
            _ => break,
        }
    }

    if segs.get(j).is_some_and(|s| is_version_marker(s)) {
        j += 1;
    }

    (tokens, raw_parts, j)
}

/// Custom-domain recognition
///
/// Needs a host (it becomes the cloud name), a transformation segment, and a
/// remainder after it that ends in a file extension.
fn classify_fallback(view: &PathView) -> Option<CdnDescriptor> {
    let host = view.host.clone()?;
    let segs = &view.segments;

    let first = segs
        .iter()
        .position(|s| parse_transformation_segment(s).is_some())?;

    let (transformations, raw_parts, public_start) =
        scan_transformations(segs, first, ResourceType::Image);

    let remainder = segs.get(public_start..)?;
    let last = remainder.last()?;
    let ext = file_extension(last)?;

    let resource_type = if is_video_extension(&ext) {
        ResourceType::Video
    } else {
        ResourceType::Image
    };

    Some(CdnDescriptor {
        cloud_name: host,
        resource_type,
        delivery_type: DeliveryType::Upload,
        public_id: remainder.join("/"),
        transformations,
        raw_transformations: raw_parts.join("/"),
    })
}
