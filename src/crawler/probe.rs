//! Asset size probing
//!
//! Savings estimates need transfer sizes. A HEAD request is tried first; if
//! it yields no length, a single-byte ranged GET is sent after a short pause
//! and the total is read from `Content-Range`. Any failure leaves the size
//! unknown; probing never fails an audit.

use crate::config::SavingsPolicy;
use crate::score::savings::{estimate_savings, SavingsEstimate};
use crate::score::AnalysisResult;
use reqwest::header::{CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, RANGE};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Transfer size of one asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AssetSize {
    Known {
        bytes: u64,
        content_type: Option<String>,
    },
    Unknown,
}

impl AssetSize {
    fn known(bytes: u64, response: &Response) -> Self {
        Self::Known {
            bytes,
            content_type: response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        }
    }

    pub fn bytes(&self) -> Option<u64> {
        match self {
            Self::Known { bytes, .. } => Some(*bytes),
            Self::Unknown => None,
        }
    }
}

/// Probes the transfer size of an asset
///
/// Each request is bounded by `request_timeout`; a request that does not
/// answer in time counts as a failed step.
pub async fn probe_asset(
    client: &Client,
    url: &str,
    retry_delay: Duration,
    request_timeout: Duration,
) -> AssetSize {
    match send_bounded(client.head(url), request_timeout).await {
        Ok(response) if response.status().is_success() => {
            if let Some(bytes) = header_length(&response) {
                return AssetSize::known(bytes, &response);
            }
        }
        Ok(response) => tracing::debug!("HEAD {} -> {}", url, response.status()),
        Err(e) => tracing::debug!("HEAD {} failed: {}", url, e),
    }

    tokio::time::sleep(retry_delay).await;

    let ranged = client.get(url).header(RANGE, "bytes=0-0");
    match send_bounded(ranged, request_timeout).await {
        Ok(response) if response.status() == StatusCode::PARTIAL_CONTENT => response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total)
            .map_or(AssetSize::Unknown, |bytes| AssetSize::known(bytes, &response)),
        // Server ignored the range and sent the whole asset
        Ok(response) if response.status().is_success() => header_length(&response)
            .map_or(AssetSize::Unknown, |bytes| AssetSize::known(bytes, &response)),
        Ok(response) => {
            tracing::debug!("Ranged GET {} -> {}", url, response.status());
            AssetSize::Unknown
        }
        Err(e) => {
            tracing::debug!("Ranged GET {} failed: {}", url, e);
            AssetSize::Unknown
        }
    }
}

/// Sends a request, dropping it if no response headers arrive in time
async fn send_bounded(request: RequestBuilder, limit: Duration) -> Result<Response, String> {
    match tokio::time::timeout(limit, request.send()).await {
        Ok(result) => result.map_err(|e| e.to_string()),
        Err(_) => Err(format!("timed out after {}ms", limit.as_millis())),
    }
}

/// Reads a non-zero `Content-Length`
fn header_length(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|&bytes| bytes > 0)
}

/// Extracts the complete length from `bytes 0-0/12345`
///
/// Returns `None` for an unknown total (`*`) or malformed values.
pub fn parse_content_range_total(value: &str) -> Option<u64> {
    let (unit, rest) = value.trim().split_once(' ')?;
    if !unit.eq_ignore_ascii_case("bytes") {
        return None;
    }
    let (_, total) = rest.split_once('/')?;
    total.trim().parse::<u64>().ok().filter(|&bytes| bytes > 0)
}

/// Probes every analyzed asset sequentially and applies the savings policy
///
/// Stops probing when cancelled; remaining assets are estimated with an
/// unknown size.
pub async fn estimate_analysis_savings(
    client: &Client,
    analysis: &AnalysisResult,
    policy: &SavingsPolicy,
    retry_delay: Duration,
    request_timeout: Duration,
    cancel: &CancellationToken,
) -> Vec<SavingsEstimate> {
    let mut estimates = Vec::with_capacity(analysis.per_asset.len());
    for asset in &analysis.per_asset {
        let size = if asset.issues.is_empty() || cancel.is_cancelled() {
            AssetSize::Unknown
        } else {
            probe_asset(client, &asset.url, retry_delay, request_timeout).await
        };
        estimates.push(estimate_savings(asset, size.bytes(), policy));
    }
    estimates
}
