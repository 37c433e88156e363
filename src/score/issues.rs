use serde::{Serialize, Serializer};
use std::fmt;

/// Per-asset optimization issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueCode {
    /// No `f_auto` token
    EnableAutoFormat,
    /// Neither `q_auto` nor a `q_auto:<level>` token
    EnableAutoQuality,
    /// Neither a `w_*` nor an `h_*` token
    AddResponsiveSizing,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EnableAutoFormat => "enable-auto-format",
            Self::EnableAutoQuality => "enable-auto-quality",
            Self::AddResponsiveSizing => "add-responsive-sizing",
        }
    }

    /// The transformation that fixes the issue
    pub fn fix(&self) -> &'static str {
        match self {
            Self::EnableAutoFormat => "f_auto",
            Self::EnableAutoQuality => "q_auto",
            Self::AddResponsiveSizing => "w_<width> or h_<height>",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Site-level suggestion
///
/// Serialized as its human-readable message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Suggestion {
    /// Too few assets use automatic format selection
    AdoptAutoFormat { missing: usize },
    /// Too few assets use automatic quality
    AdoptAutoQuality { missing: usize },
    /// Media is served outside the CDN
    MigrateNonCdn { count: usize },
    /// Assets are delivered at their original dimensions
    ResizeAssets { count: usize },
}

impl Suggestion {
    pub fn code(&self) -> &'static str {
        match self {
            Self::AdoptAutoFormat { .. } => "adopt-auto-format",
            Self::AdoptAutoQuality { .. } => "adopt-auto-quality",
            Self::MigrateNonCdn { .. } => "migrate-non-cdn",
            Self::ResizeAssets { .. } => "resize-n-assets",
        }
    }
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdoptAutoFormat { missing } => write!(
                f,
                "Add f_auto to {} asset(s) so each browser receives the best format it supports",
                missing
            ),
            Self::AdoptAutoQuality { missing } => write!(
                f,
                "Add q_auto to {} asset(s) to let the CDN pick the smallest visually lossless quality",
                missing
            ),
            Self::MigrateNonCdn { count } => write!(
                f,
                "Serve {} media asset(s) through the CDN to make them optimizable",
                count
            ),
            Self::ResizeAssets { count } => write!(
                f,
                "Resize {} asset(s) with w_ or h_ transformations instead of shipping original dimensions",
                count
            ),
        }
    }
}

impl Serialize for Suggestion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_codes_serialize_kebab_case() {
        let json = serde_json::to_string(&vec![
            IssueCode::EnableAutoFormat,
            IssueCode::EnableAutoQuality,
            IssueCode::AddResponsiveSizing,
        ])
        .unwrap();
        assert_eq!(
            json,
            r#"["enable-auto-format","enable-auto-quality","add-responsive-sizing"]"#
        );
    }

    #[test]
    fn test_issue_display_matches_serde() {
        assert_eq!(IssueCode::AddResponsiveSizing.to_string(), "add-responsive-sizing");
    }

    #[test]
    fn test_suggestion_serializes_as_message() {
        let json = serde_json::to_string(&Suggestion::ResizeAssets { count: 3 }).unwrap();
        assert!(json.starts_with("\"Resize 3 asset(s)"));
        assert_eq!(Suggestion::ResizeAssets { count: 3 }.code(), "resize-n-assets");
    }
}
