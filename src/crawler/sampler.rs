//! Page sampling
//!
//! Large sitemaps are audited through a uniform random sample of distinct
//! pages rather than in full.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Upper bound on pages fetched in one crawl
pub const MAX_SAMPLE_SIZE: usize = 10;

/// Picks up to `max` distinct pages uniformly at random
///
/// Duplicates in the input are collapsed first. When the distinct pool fits
/// within `max`, every page is kept in its original order.
pub fn select_pages<R: Rng + ?Sized>(pages: &[String], max: usize, rng: &mut R) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(pages.len());
    let pool: Vec<&String> = pages
        .iter()
        .filter(|page| seen.insert(page.as_str()))
        .collect();

    if pool.len() <= max {
        return pool.into_iter().cloned().collect();
    }

    pool.choose_multiple(rng, max)
        .map(|page| (*page).clone())
        .collect()
}
