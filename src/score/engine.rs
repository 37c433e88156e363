//! Scoring reducer
//!
//! [`finalize`] folds a collection of asset references into one immutable
//! [`AnalysisResult`]. It is a pure function: the same references in any
//! order produce the same result.

use crate::config::ScoringConfig;
use crate::extract::{AssetReference, Extraction};
use crate::score::issues::{IssueCode, Suggestion};
use crate::url::CdnDescriptor;
use serde::Serialize;

/// One CDN asset with its issues
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedAsset {
    pub url: String,
    pub descriptor: CdnDescriptor,
    pub issues: Vec<IssueCode>,
    pub page_url: Option<String>,
}

impl AnalyzedAsset {
    /// Raw and SVG assets are exempt and always count as optimized
    pub fn is_fully_optimized(&self) -> bool {
        self.descriptor.is_exempt()
            || (self.descriptor.has_auto_format() && self.descriptor.has_auto_quality())
    }
}

/// Asset counts behind the score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageStats {
    pub total: usize,
    pub cdn: usize,
    pub non_cdn: usize,
    pub auto_format: usize,
    pub auto_quality: usize,
    pub fully_optimized: usize,
    pub missing_sizing: usize,
    pub exempt: usize,
}

/// Crawl sampling metadata attached to site analyses
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplingInfo {
    pub pages_sampled: usize,
    pub total_pages_in_sitemap: usize,
    /// `pages_sampled / total_pages_in_sitemap` as a percentage, one decimal
    pub percentage: String,
}

impl SamplingInfo {
    pub fn new(pages_sampled: usize, total_pages_in_sitemap: usize) -> Self {
        let percentage = if total_pages_in_sitemap == 0 {
            0.0
        } else {
            pages_sampled as f64 / total_pages_in_sitemap as f64 * 100.0
        };
        Self {
            pages_sampled,
            total_pages_in_sitemap,
            percentage: format!("{:.1}", percentage),
        }
    }
}

/// The outcome of one analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub total_requests: usize,
    pub per_asset: Vec<AnalyzedAsset>,
    pub non_cdn_media_assets: Vec<String>,
    pub score: u8,
    pub suggestions: Vec<Suggestion>,
    pub coverage: CoverageStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampling: Option<SamplingInfo>,
}

/// Issues for one descriptor, in a fixed order; exempt assets have none
pub fn asset_issues(descriptor: &CdnDescriptor) -> Vec<IssueCode> {
    if descriptor.is_exempt() {
        return Vec::new();
    }

    let mut issues = Vec::new();
    if !descriptor.has_auto_format() {
        issues.push(IssueCode::EnableAutoFormat);
    }
    if !descriptor.has_auto_quality() {
        issues.push(IssueCode::EnableAutoQuality);
    }
    if !descriptor.has_sizing() {
        issues.push(IssueCode::AddResponsiveSizing);
    }
    issues
}

/// Coverage score in [0, 100]
///
/// Half the score is CDN coverage, half is the optimized share of CDN assets.
/// Zero CDN assets or zero assets score 0.
pub fn compute_score(cdn_assets: usize, total_assets: usize, fully_optimized: usize) -> u8 {
    if cdn_assets == 0 || total_assets == 0 {
        return 0;
    }

    let coverage = cdn_assets as f64 / total_assets as f64 * 100.0;
    let optimized = fully_optimized as f64 / cdn_assets as f64 * 100.0;
    let score = (0.5 * coverage + 0.5 * optimized).round();

    score.clamp(0.0, 100.0) as u8
}

/// Reduces an extraction to an analysis
pub fn finalize(extraction: &Extraction, scoring: &ScoringConfig) -> AnalysisResult {
    reduce(extraction.total_requests, &extraction.assets, scoring, None)
}

/// Reduces an aggregated crawl extraction and attaches its sampling metadata
pub fn finalize_with_sampling(
    extraction: &Extraction,
    scoring: &ScoringConfig,
    sampling: SamplingInfo,
) -> AnalysisResult {
    reduce(
        extraction.total_requests,
        &extraction.assets,
        scoring,
        Some(sampling),
    )
}

fn reduce(
    total_requests: usize,
    assets: &[AssetReference],
    scoring: &ScoringConfig,
    sampling: Option<SamplingInfo>,
) -> AnalysisResult {
    let mut per_asset: Vec<AnalyzedAsset> = Vec::new();
    let mut non_cdn_media_assets: Vec<String> = Vec::new();

    for asset in assets {
        match &asset.descriptor {
            Some(descriptor) => per_asset.push(AnalyzedAsset {
                url: asset.url.clone(),
                descriptor: descriptor.clone(),
                issues: asset_issues(descriptor),
                page_url: asset.source_page.clone(),
            }),
            None => non_cdn_media_assets.push(asset.url.clone()),
        }
    }

    // Canonical ordering keeps the result independent of input order.
    per_asset.sort_by(|a, b| {
        (&a.url, &a.page_url, &a.descriptor).cmp(&(&b.url, &b.page_url, &b.descriptor))
    });
    non_cdn_media_assets.sort();

    let mut coverage = CoverageStats {
        cdn: per_asset.len(),
        non_cdn: non_cdn_media_assets.len(),
        total: per_asset.len() + non_cdn_media_assets.len(),
        ..CoverageStats::default()
    };

    let mut non_exempt = 0usize;
    let mut non_exempt_format = 0usize;
    let mut non_exempt_quality = 0usize;

    for asset in &per_asset {
        let d = &asset.descriptor;
        if d.has_auto_format() {
            coverage.auto_format += 1;
        }
        if d.has_auto_quality() {
            coverage.auto_quality += 1;
        }
        if asset.is_fully_optimized() {
            coverage.fully_optimized += 1;
        }
        if asset.issues.contains(&IssueCode::AddResponsiveSizing) {
            coverage.missing_sizing += 1;
        }

        if d.is_exempt() {
            coverage.exempt += 1;
        } else {
            non_exempt += 1;
            if d.has_auto_format() {
                non_exempt_format += 1;
            }
            if d.has_auto_quality() {
                non_exempt_quality += 1;
            }
        }
    }

    let mut suggestions = Vec::new();
    if non_exempt > 0 {
        if ratio(non_exempt_format, non_exempt) < scoring.auto_format_threshold {
            push_once(
                &mut suggestions,
                Suggestion::AdoptAutoFormat {
                    missing: non_exempt - non_exempt_format,
                },
            );
        }
        if ratio(non_exempt_quality, non_exempt) < scoring.auto_quality_threshold {
            push_once(
                &mut suggestions,
                Suggestion::AdoptAutoQuality {
                    missing: non_exempt - non_exempt_quality,
                },
            );
        }
    }
    if coverage.non_cdn > 0 {
        push_once(
            &mut suggestions,
            Suggestion::MigrateNonCdn {
                count: coverage.non_cdn,
            },
        );
    }
    if coverage.missing_sizing > 0 {
        push_once(
            &mut suggestions,
            Suggestion::ResizeAssets {
                count: coverage.missing_sizing,
            },
        );
    }

    let score = compute_score(coverage.cdn, coverage.total, coverage.fully_optimized);

    AnalysisResult {
        total_requests,
        per_asset,
        non_cdn_media_assets,
        score,
        suggestions,
        coverage,
        sampling,
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    part as f64 / whole as f64
}

fn push_once(suggestions: &mut Vec<Suggestion>, suggestion: Suggestion) {
    if !suggestions.iter().any(|s| s.code() == suggestion.code()) {
        suggestions.push(suggestion);
    }
}
