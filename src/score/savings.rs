//! Advisory bandwidth savings
//!
//! Percentages come from the configured [`SavingsPolicy`]; they are estimates,
//! not measurements, and never influence the score.

use crate::config::SavingsPolicy;
use crate::score::engine::AnalyzedAsset;
use crate::score::issues::IssueCode;
use serde::Serialize;

/// Estimated savings for one asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsEstimate {
    pub url: String,
    /// Declared size, if the probe could learn it
    pub bytes: Option<u64>,
    /// Combined estimated reduction, percent
    pub percent: u8,
    pub estimated_savings_bytes: Option<u64>,
}

/// Policy percentage for a single issue
pub fn issue_savings_percent(issue: IssueCode, policy: &SavingsPolicy) -> u8 {
    match issue {
        IssueCode::EnableAutoFormat => policy.auto_format,
        IssueCode::EnableAutoQuality => policy.auto_quality,
        IssueCode::AddResponsiveSizing => policy.responsive_sizing,
    }
}

/// Sum of the policy percentages for a set of issues, capped at 100
pub fn savings_percent(issues: &[IssueCode], policy: &SavingsPolicy) -> u8 {
    let total: u32 = issues
        .iter()
        .map(|issue| u32::from(issue_savings_percent(*issue, policy)))
        .sum();
    total.min(100) as u8
}

/// Applies the policy to one asset with an optionally known size
pub fn estimate_savings(
    asset: &AnalyzedAsset,
    bytes: Option<u64>,
    policy: &SavingsPolicy,
) -> SavingsEstimate {
    let percent = savings_percent(&asset.issues, policy);
    SavingsEstimate {
        url: asset.url.clone(),
        bytes,
        percent,
        estimated_savings_bytes: bytes.map(|b| percent_of(b, percent)),
    }
}

/// `percent` of `bytes`, rounded down; `percent` never exceeds 100
fn percent_of(bytes: u64, percent: u8) -> u64 {
    (u128::from(bytes) * u128::from(percent) / 100) as u64
}

/// Total estimated savings over the assets whose size is known
pub fn total_estimated_savings(estimates: &[SavingsEstimate]) -> u64 {
    estimates
        .iter()
        .filter_map(|e| e.estimated_savings_bytes)
        .fold(0u64, u64::saturating_add)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::asset_issues;
    use crate::url::classify;

    fn analyzed(url: &str) -> AnalyzedAsset {
        let descriptor = classify(url).unwrap();
        AnalyzedAsset {
            url: url.to_string(),
            issues: asset_issues(&descriptor),
            descriptor,
            page_url: None,
        }
    }

    #[test]
    fn test_policy_table_is_replaceable() {
        let policy = SavingsPolicy {
            auto_format: 40,
            auto_quality: 30,
            responsive_sizing: 50,
        };
        let all = [
            IssueCode::EnableAutoFormat,
            IssueCode::EnableAutoQuality,
            IssueCode::AddResponsiveSizing,
        ];
        assert_eq!(savings_percent(&all, &policy), 100);
        assert_eq!(savings_percent(&all, &SavingsPolicy::default()), 50);
    }

    #[test]
    fn test_estimate_with_known_size() {
        let asset = analyzed("https://res.cloudinary.com/demo/image/upload/w_200/a.jpg");
        let estimate = estimate_savings(&asset, Some(200_000), &SavingsPolicy::default());
        assert_eq!(estimate.percent, 40);
        assert_eq!(estimate.estimated_savings_bytes, Some(80_000));
    }

    #[test]
    fn test_estimate_with_unknown_size() {
        let asset = analyzed("https://res.cloudinary.com/demo/image/upload/a.jpg");
        let estimate = estimate_savings(&asset, None, &SavingsPolicy::default());
        assert_eq!(estimate.percent, 50);
        assert_eq!(estimate.estimated_savings_bytes, None);
        assert_eq!(total_estimated_savings(&[estimate]), 0);
    }

    #[test]
    fn test_huge_declared_size_does_not_overflow() {
        assert_eq!(percent_of(u64::MAX, 100), u64::MAX);
        assert_eq!(percent_of(u64::MAX, 50), u64::MAX / 2);
        assert_eq!(percent_of(1_000, 25), 250);

        let estimate = |bytes| SavingsEstimate {
            url: "https://res.cloudinary.com/demo/image/upload/a.jpg".to_string(),
            bytes: Some(bytes),
            percent: 100,
            estimated_savings_bytes: Some(bytes),
        };
        assert_eq!(
            total_estimated_savings(&[estimate(u64::MAX), estimate(10)]),
            u64::MAX
        );
    }
}
