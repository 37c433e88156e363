//! Crawl orchestration
//!
//! Drives one site audit end to end:
//! - Validating the site URL before any network activity
//! - Discovering the sitemap and sampling pages from it
//! - Fetching sampled pages sequentially through the relay, with a polite
//!   delay between pages
//! - Honoring cooperative cancellation at loop boundaries
//! - Merging per-page extractions into one scored analysis

use crate::config::Config;
use crate::crawler::fetcher::{FetchFailure, RelayClient};
use crate::crawler::sampler::{select_pages, MAX_SAMPLE_SIZE};
use crate::extract::{extract_from_markup, Extraction};
use crate::score::{finalize, finalize_with_sampling, AnalysisResult, SamplingInfo};
use crate::sitemap::{discover, RobotsPolicy};
use crate::state::{CrawlPhase, CrawlState};
use crate::url::{parse_site_url, site_origin};
use crate::AuditError;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// A finished crawl
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlReport {
    pub analysis: AnalysisResult,
    pub state: CrawlState,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// How a crawl ended
#[derive(Debug, Clone)]
pub enum CrawlOutcome {
    /// Every planned page was attempted and the results compiled
    Done(CrawlReport),

    /// Cancellation was observed; no analysis was compiled
    Cancelled(CrawlState),
}

impl CrawlOutcome {
    pub fn state(&self) -> &CrawlState {
        match self {
            Self::Done(report) => &report.state,
            Self::Cancelled(state) => state,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

/// Runs site audits through a fetch relay
pub struct Orchestrator {
    config: Arc<Config>,
    relay: RelayClient,
    seed: Option<u64>,
}

impl Orchestrator {
    /// Creates a new orchestrator
    ///
    /// # Errors
    ///
    /// Fails when no relay endpoint is configured; site mode cannot run
    /// without one.
    pub fn new(config: Config) -> Result<Self, AuditError> {
        let relay = RelayClient::from_config(&config)?;
        Ok(Self {
            config: Arc::new(config),
            relay,
            seed: None,
        })
    }

    /// Makes page sampling reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn relay(&self) -> &RelayClient {
        &self.relay
    }

    /// Audits a site
    pub async fn run(
        &self,
        site_url: &str,
        cancel: &CancellationToken,
    ) -> Result<CrawlOutcome, AuditError> {
        self.run_with_progress(site_url, cancel, |_| {}).await
    }

    /// Audits a site, reporting state after each page attempt
    ///
    /// # Crawl Flow
    ///
    /// 1. Validate the site URL (failure: nothing is fetched)
    /// 2. Discover a sitemap (skipped when disabled in config)
    /// 3. Without a sitemap, audit the site URL alone; a fetch failure there
    ///    is an error
    /// 4. With one, sample up to 10 allowed pages and fetch them in order;
    ///    per-page failures are recorded and the loop continues
    /// 5. Compile the merged extraction with sampling metadata
    ///
    /// Cancellation is checked before each fetch and before each delay. Once
    /// observed, the crawl returns [`CrawlOutcome::Cancelled`] without
    /// compiling results.
    pub async fn run_with_progress<F>(
        &self,
        site_url: &str,
        cancel: &CancellationToken,
        mut progress: F,
    ) -> Result<CrawlOutcome, AuditError>
    where
        F: FnMut(&CrawlState),
    {
        let mut state = CrawlState::new();

        let site = match parse_site_url(site_url) {
            Ok(url) => url,
            Err(e) => {
                state.transition(CrawlPhase::Failed)?;
                tracing::warn!("Refusing to crawl: {}", e);
                return Err(e);
            }
        };

        let started_at = Utc::now();
        tracing::info!("Starting audit of {}", site);

        if !self.config.crawl.use_sitemap {
            return self
                .audit_single_page(&site, state, started_at, cancel, &mut progress)
                .await;
        }

        state.transition(CrawlPhase::DiscoveringSitemap)?;
        if cancel.is_cancelled() {
            return Ok(cancelled(state));
        }

        let origin = site_origin(&site);
        let discovery = discover(&self.relay, &origin, cancel).await;

        if cancel.is_cancelled() {
            return Ok(cancelled(state));
        }

        let sitemap = match discovery.sitemap {
            Some(sitemap) => sitemap,
            None => {
                tracing::info!("No usable sitemap for {}, auditing single page", origin);
                return self
                    .audit_single_page(&site, state, started_at, cancel, &mut progress)
                    .await;
            }
        };

        state.transition(CrawlPhase::SamplingPages)?;
        state.total_pages_discovered = sitemap.pages.len();
        state.pages_planned = self.sample(&sitemap.pages, &discovery.robots);
        tracing::info!(
            "Sampled {} of {} sitemap pages",
            state.pages_planned.len(),
            state.total_pages_discovered
        );
        progress(&state);

        let planned = state.pages_planned.clone();
        let delay = Duration::from_millis(self.config.crawl.inter_page_delay_ms);
        let mut extractions: Vec<Extraction> = Vec::with_capacity(planned.len());

        for (index, page) in planned.iter().enumerate() {
            if cancel.is_cancelled() {
                return Ok(cancelled(state));
            }
            state.transition(CrawlPhase::FetchingPage(index))?;
            tracing::info!("[{}/{}] Fetching {}", index + 1, planned.len(), page);

            match self.fetch_page(page).await {
                Ok(extraction) => {
                    tracing::debug!("{}: {} assets", page, extraction.assets.len());
                    state.record_success(page);
                    extractions.push(extraction.with_source_page(page));
                }
                Err(failure) => {
                    tracing::warn!("Failed to audit {}: {}", page, failure);
                    state.record_failure(page, failure.message);
                }
            }
            progress(&state);

            if index + 1 < planned.len() {
                if cancel.is_cancelled() {
                    return Ok(cancelled(state));
                }
                tokio::time::sleep(delay).await;
            }
        }

        if cancel.is_cancelled() {
            return Ok(cancelled(state));
        }

        state.transition(CrawlPhase::Compiling)?;
        let merged = merge_extractions(extractions);
        let sampling = SamplingInfo::new(state.pages_planned.len(), state.total_pages_discovered);
        let analysis = finalize_with_sampling(&merged, &self.config.scoring, sampling);
        state.transition(CrawlPhase::Done)?;

        tracing::info!(
            "Audit complete: {} pages ok, {} failed, score {}",
            state.completed.len(),
            state.failed.len(),
            analysis.score
        );

        Ok(CrawlOutcome::Done(CrawlReport {
            analysis,
            state,
            started_at,
            finished_at: Utc::now(),
        }))
    }

    /// Audits only the given page; its fetch failure fails the crawl
    async fn audit_single_page<F>(
        &self,
        site: &Url,
        mut state: CrawlState,
        started_at: DateTime<Utc>,
        cancel: &CancellationToken,
        progress: &mut F,
    ) -> Result<CrawlOutcome, AuditError>
    where
        F: FnMut(&CrawlState),
    {
        state.pages_planned = vec![site.to_string()];
        state.transition(CrawlPhase::FetchingPage(0))?;
        if cancel.is_cancelled() {
            return Ok(cancelled(state));
        }

        let html = self
            .relay
            .fetch(site.as_str())
            .await
            .map_err(|failure| AuditError::PageFetch {
                url: site.to_string(),
                status: failure.status,
                message: failure.message,
            })?;

        let extraction = extract_from_markup(&html, Some(site), &self.config.cdn)?;
        state.record_success(site.as_str());
        progress(&state);

        if cancel.is_cancelled() {
            return Ok(cancelled(state));
        }

        state.transition(CrawlPhase::Compiling)?;
        let analysis = finalize(
            &extraction.with_source_page(site.as_str()),
            &self.config.scoring,
        );
        state.transition(CrawlPhase::Done)?;

        Ok(CrawlOutcome::Done(CrawlReport {
            analysis,
            state,
            started_at,
            finished_at: Utc::now(),
        }))
    }

    /// Fetches one page and extracts its media, using the page as base URL
    async fn fetch_page(&self, page: &str) -> Result<Extraction, FetchFailure> {
        let html = self.relay.fetch(page).await?;
        let base = Url::parse(page).ok();
        extract_from_markup(&html, base.as_ref(), &self.config.cdn)
            .map_err(|e| FetchFailure::network(format!("Unparseable page: {}", e)))
    }

    /// Drops robots-disallowed pages, then samples
    fn sample(&self, pages: &[String], robots: &RobotsPolicy) -> Vec<String> {
        let pool: Vec<String> = if self.config.crawl.respect_robots {
            let agent = &self.config.user_agent.crawler_name;
            pages
                .iter()
                .filter(|page| {
                    let allowed = robots.is_allowed(page, agent);
                    if !allowed {
                        tracing::debug!("Skipping {} (disallowed by robots.txt)", page);
                    }
                    allowed
                })
                .cloned()
                .collect()
        } else {
            pages.to_vec()
        };

        let max = self.config.crawl.max_pages.min(MAX_SAMPLE_SIZE);
        match self.seed {
            Some(seed) => select_pages(&pool, max, &mut StdRng::seed_from_u64(seed)),
            None => select_pages(&pool, max, &mut rand::thread_rng()),
        }
    }
}

fn cancelled(mut state: CrawlState) -> CrawlOutcome {
    tracing::info!(
        "Audit cancelled after {} of {} pages",
        state.pages_attempted(),
        state.pages_planned.len()
    );
    // Cancellation is only observed from cancellable phases
    if state.phase.is_cancellable() {
        state.phase = CrawlPhase::Cancelled;
    }
    state.cancelled = true;
    CrawlOutcome::Cancelled(state)
}

/// Concatenates page extractions; per-page dedup has already happened
pub fn merge_extractions(extractions: Vec<Extraction>) -> Extraction {
    extractions
        .into_iter()
        .fold(Extraction::default(), |mut merged, page| {
            merged.total_requests += page.total_requests;
            merged.assets.extend(page.assets);
            merged
        })
}
