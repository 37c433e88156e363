//! JSON report output

use crate::output::traits::{AuditSummary, OutputHandler, OutputResult};
use std::io::Write;

/// Renders summaries as pretty-printed JSON
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonOutput;

impl OutputHandler for JsonOutput {
    fn write_summary(&self, summary: &AuditSummary, out: &mut dyn Write) -> OutputResult<()> {
        serde_json::to_writer_pretty(&mut *out, summary)?;
        out.write_all(b"\n")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CdnConfig, ScoringConfig};
    use crate::extract::extract_from_markup;
    use crate::score::finalize;

    #[test]
    fn test_json_field_names() {
        let html = r#"<img src="https://res.cloudinary.com/demo/image/upload/q_auto/hero.jpg">
<img src="https://static.shop.test/banner.png">"#;
        let extraction = extract_from_markup(html, None, &CdnConfig::default()).unwrap();
        let summary = AuditSummary::from_analysis("page.html", finalize(&extraction, &ScoringConfig::default()));

        let mut buf = Vec::new();
        JsonOutput.write_summary(&summary, &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value["source"], "page.html");
        assert_eq!(value["analysis"]["totalRequests"], 2);
        assert_eq!(
            value["analysis"]["nonCdnMediaAssets"][0],
            "https://static.shop.test/banner.png"
        );
        assert_eq!(
            value["analysis"]["perAsset"][0]["issues"],
            serde_json::json!(["enable-auto-format", "add-responsive-sizing"])
        );
        assert!(value["analysis"].get("sampling").is_none());
        assert!(value.get("crawl").is_none());
    }
}
