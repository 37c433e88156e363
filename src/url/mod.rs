//! URL handling module for cdn-audit
//!
//! This module turns delivery URLs into structured [`CdnDescriptor`]s and
//! validates the site URLs a crawl starts from. Classification is pure and
//! stateless, so it is safe to call from any number of tasks.

mod classifier;
mod descriptor;
mod domain;
mod tokens;

// Re-export main functions
pub use classifier::classify;
pub use descriptor::{CdnDescriptor, DeliveryType, ResourceType};
pub use domain::{extract_domain, parse_site_url, site_origin};
pub use tokens::{
    classify_segment, file_extension, is_transformation_token, is_version_marker,
    is_video_extension, parse_transformation_segment, SegmentKind,
};
