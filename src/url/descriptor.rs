use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Kind of resource a delivery URL serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Image,
    Video,
    Raw,
}

impl ResourceType {
    /// Parses a path segment; the plural `images` alias maps to `Image`
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "image" | "images" => Some(Self::Image),
            "video" => Some(Self::Video),
            "raw" => Some(Self::Raw),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Raw => "raw",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the CDN obtained the asset it delivers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryType {
    Upload,
    Fetch,
    Private,
    Authenticated,
}

impl DeliveryType {
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "upload" => Some(Self::Upload),
            "fetch" => Some(Self::Fetch),
            "private" => Some(Self::Private),
            "authenticated" => Some(Self::Authenticated),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Fetch => "fetch",
            Self::Private => "private",
            Self::Authenticated => "authenticated",
        }
    }
}

impl fmt::Display for DeliveryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured view of a CDN delivery URL
///
/// `transformations` holds exactly the non-empty comma-split tokens taken from
/// the path segments that precede the public id; `raw_transformations` keeps
/// those segments joined by `/` as they appeared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CdnDescriptor {
    pub cloud_name: String,
    pub resource_type: ResourceType,
    pub delivery_type: DeliveryType,
    pub public_id: String,
    #[serde(rename = "transformationSet")]
    pub transformations: BTreeSet<String>,
    pub raw_transformations: String,
}

impl CdnDescriptor {
    /// Returns true if the exact token is present
    pub fn has_token(&self, token: &str) -> bool {
        self.transformations.contains(token)
    }

    /// Returns true if any token starts with the given parameter key (`w_`, `h_`)
    pub fn has_param(&self, key: &str) -> bool {
        let prefix = format!("{}_", key);
        self.transformations.iter().any(|t| t.starts_with(&prefix))
    }

    pub fn has_auto_format(&self) -> bool {
        self.has_token("f_auto")
    }

    /// `q_auto` or any `q_auto:<level>` variant
    pub fn has_auto_quality(&self) -> bool {
        self.transformations
            .iter()
            .any(|t| t == "q_auto" || t.starts_with("q_auto:"))
    }

    pub fn has_sizing(&self) -> bool {
        self.has_param("w") || self.has_param("h")
    }

    pub fn is_svg(&self) -> bool {
        self.public_id.to_ascii_lowercase().ends_with(".svg")
    }

    /// Raw files and SVGs get no optimization advice
    pub fn is_exempt(&self) -> bool {
        self.resource_type == ResourceType::Raw || self.is_svg()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(tokens: &[&str], public_id: &str, resource_type: ResourceType) -> CdnDescriptor {
        CdnDescriptor {
            cloud_name: "demo".to_string(),
            resource_type,
            delivery_type: DeliveryType::Upload,
            public_id: public_id.to_string(),
            transformations: tokens.iter().map(|t| t.to_string()).collect(),
            raw_transformations: tokens.join(","),
        }
    }

    #[test]
    fn test_resource_type_alias() {
        assert_eq!(ResourceType::from_segment("images"), Some(ResourceType::Image));
        assert_eq!(ResourceType::from_segment("raw"), Some(ResourceType::Raw));
        assert_eq!(ResourceType::from_segment("audio"), None);
    }

    #[test]
    fn test_auto_quality_variants() {
        assert!(descriptor(&["q_auto"], "a.jpg", ResourceType::Image).has_auto_quality());
        assert!(descriptor(&["q_auto:best"], "a.jpg", ResourceType::Image).has_auto_quality());
        assert!(!descriptor(&["q_80"], "a.jpg", ResourceType::Image).has_auto_quality());
    }

    #[test]
    fn test_sizing() {
        assert!(descriptor(&["h_300"], "a.jpg", ResourceType::Image).has_sizing());
        assert!(!descriptor(&["f_auto"], "a.jpg", ResourceType::Image).has_sizing());
    }

    #[test]
    fn test_exempt() {
        assert!(descriptor(&[], "logo.SVG", ResourceType::Image).is_exempt());
        assert!(descriptor(&[], "report.pdf", ResourceType::Raw).is_exempt());
        assert!(!descriptor(&[], "photo.jpg", ResourceType::Video).is_exempt());
    }
}
