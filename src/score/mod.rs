//! Scoring engine
//!
//! This module derives per-asset issues, site-level suggestions and the
//! 0-100 coverage score from a set of asset references, plus advisory savings
//! estimates that sit outside the score.

mod engine;
mod issues;
pub mod savings;

pub use engine::{
    asset_issues, compute_score, finalize, finalize_with_sampling, AnalysisResult, AnalyzedAsset,
    CoverageStats, SamplingInfo,
};
pub use issues::{IssueCode, Suggestion};
pub use savings::{estimate_savings, SavingsEstimate};
