//! The fan-out/fan-in aggregation client.
//!
//! The primary upstream has no "all matches by date" endpoint, so a date
//! query fans out one fetch unit per (competition, tab) pair, rate-limited
//! against the shared limiter, and merges whatever succeeds. The contract is
//! best-effort union: a failing unit contributes nothing and never aborts its
//! siblings, and an aggregation never returns an error — worst case is an
//! empty list.
//!
//! One `MatchClient` bundles the feed handle, rate limiter, response cache
//! and persistent empty-result cache; it is constructed once and cloned
//! (Arc-backed) into every call site.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use futures_util::future::join_all;
use futures_util::stream::{self, StreamExt};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::cache::empty::EmptyResultsCache;
use crate::cache::{CacheConfig, ResponseCache};
use crate::competitions;
use crate::feed::{FixtureFeed, Tab};
use crate::models::{Match, MatchDetails, MatchStatus};
use crate::ratelimit::RateLimiter;

/// Concurrency ceiling for batched detail fetches.
const BATCH_DETAILS_CONCURRENCY: usize = 4;

/// Construction options for [`MatchClient`].
pub struct ClientOptions {
    /// Active competition ids; empty means the full supported registry.
    pub competitions: Vec<u32>,
    /// Minimum interval between upstream requests.
    pub min_request_interval: Duration,
    pub cache: CacheConfig,
    /// Explicit empty-result cache location; None uses the per-user default.
    pub empty_cache_path: Option<PathBuf>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        ClientOptions {
            competitions: Vec::new(),
            min_request_interval: Duration::from_millis(200),
            cache: CacheConfig::default(),
            empty_cache_path: None,
        }
    }
}

struct ClientInner {
    feed: Arc<dyn FixtureFeed>,
    rate_limiter: RateLimiter,
    cache: ResponseCache,
    empty_cache: Arc<EmptyResultsCache>,
    competitions: Vec<u32>,
}

#[derive(Clone)]
pub struct MatchClient {
    inner: Arc<ClientInner>,
}

impl MatchClient {
    pub fn new(feed: Arc<dyn FixtureFeed>, options: ClientOptions) -> Self {
        let empty_cache = match options.empty_cache_path {
            Some(path) => EmptyResultsCache::load(path),
            None => EmptyResultsCache::load_default(),
        };
        let competitions = competitions::active_ids(&options.competitions);
        debug!(
            "Match client: feed={}, {} competitions, min interval {:?}",
            feed.name(),
            competitions.len(),
            options.min_request_interval
        );
        MatchClient {
            inner: Arc::new(ClientInner {
                feed,
                rate_limiter: RateLimiter::new(options.min_request_interval),
                cache: ResponseCache::new(options.cache),
                empty_cache: Arc::new(empty_cache),
                competitions,
            }),
        }
    }

    /// Active competition ids, in query order.
    pub fn competitions(&self) -> &[u32] {
        &self.inner.competitions
    }

    /// All matches for a date across both tabs.
    pub async fn matches_by_date(&self, date: NaiveDate) -> Vec<Match> {
        self.matches_by_date_with_tabs(date, &Tab::BOTH).await
    }

    /// All matches for a date across the given tabs, one concurrent fetch
    /// unit per (competition, tab) pair.
    ///
    /// Only both-tab queries trust the per-date cache; partial queries
    /// always fetch. Units skipped by the empty-result cache (results tab
    /// only) cost nothing; units that fail are dropped individually.
    pub async fn matches_by_date_with_tabs(&self, date: NaiveDate, tabs: &[Tab]) -> Vec<Match> {
        let date_key = date.format("%Y-%m-%d").to_string();

        if tabs.len() == 2 {
            if let Some(cached) = self.inner.cache.matches(&date_key).await {
                return cached;
            }
        }

        let merged: Arc<Mutex<Vec<Match>>> = Arc::new(Mutex::new(Vec::new()));
        let mut units = Vec::new();
        let mut skipped = 0usize;

        for &tab in tabs {
            for &competition in &self.inner.competitions {
                if tab == Tab::Results && self.inner.empty_cache.is_empty(date, competition) {
                    skipped += 1;
                    continue;
                }

                let inner = Arc::clone(&self.inner);
                let merged = Arc::clone(&merged);
                units.push(tokio::spawn(async move {
                    inner.rate_limiter.wait().await;

                    let all = match inner.feed.league_fixtures(competition, tab).await {
                        Ok(m) => m,
                        Err(e) => {
                            warn!(
                                "Fetch unit ({}, {}) failed: {}",
                                competition,
                                tab.as_str(),
                                e
                            );
                            return;
                        }
                    };

                    // Payloads are whole-season listings; keep only the
                    // requested UTC date.
                    let on_date: Vec<Match> = all
                        .into_iter()
                        .filter(|m| m.match_time.map(|t| t.date_naive()) == Some(date))
                        .collect();

                    if on_date.is_empty() && tab == Tab::Results {
                        inner.empty_cache.mark_empty(date, competition);
                    }

                    merged.lock().await.extend(on_date);
                }));
            }
        }

        let unit_count = units.len();
        join_all(units).await;

        let result = std::mem::take(&mut *merged.lock().await);
        debug!(
            "Aggregated {} matches for {} from {} units ({} skipped via empty cache)",
            result.len(),
            date_key,
            unit_count,
            skipped
        );

        self.inner.cache.set_matches(&date_key, result.clone()).await;
        self.spawn_empty_cache_save();

        result
    }

    /// Single-unit fetch for one competition, used by the progressive
    /// loader. Unlike the full aggregation, errors propagate.
    pub async fn matches_for_competition(
        &self,
        competition: u32,
        date: NaiveDate,
        tab: Tab,
    ) -> Result<Vec<Match>> {
        self.inner.rate_limiter.wait().await;
        let all = self.inner.feed.league_fixtures(competition, tab).await?;
        Ok(all
            .into_iter()
            .filter(|m| m.match_time.map(|t| t.date_naive()) == Some(date))
            .collect())
    }

    /// Details for one match, served from cache when fresh.
    pub async fn match_details(&self, match_id: u64) -> Result<MatchDetails> {
        if let Some(cached) = self.inner.cache.details(match_id).await {
            return Ok(cached);
        }

        self.inner.rate_limiter.wait().await;
        let details = self.inner.feed.match_details(match_id).await?;
        self.inner.cache.set_details(match_id, details.clone()).await;
        Ok(details)
    }

    /// Details for one match, bypassing and invalidating the cache entry.
    ///
    /// The entry is removed before the fetch, so a concurrent plain reader
    /// observes either the old valid entry or a clean miss — never a
    /// half-updated one.
    pub async fn match_details_force_refresh(&self, match_id: u64) -> Result<MatchDetails> {
        self.inner.cache.clear_details(match_id).await;
        self.match_details(match_id).await
    }

    /// Currently live matches for today.
    ///
    /// Only the fixtures tab is queried — live matches never appear under
    /// results, which halves the fan-out.
    pub async fn live_matches(&self) -> Vec<Match> {
        if let Some(cached) = self.inner.cache.live_matches().await {
            return cached;
        }

        let today = Utc::now().date_naive();
        let matches = self
            .matches_by_date_with_tabs(today, &[Tab::Fixtures])
            .await;

        let live: Vec<Match> = matches
            .into_iter()
            .filter(|m| m.status == MatchStatus::Live)
            .collect();

        self.inner.cache.set_live_matches(live.clone()).await;
        live
    }

    /// Live matches with the singleton cache slot invalidated first.
    pub async fn live_matches_force_refresh(&self) -> Vec<Match> {
        self.inner.cache.clear_live().await;
        self.live_matches().await
    }

    /// Live matches for a single competition, for progressive loading.
    pub async fn live_matches_for_competition(&self, competition: u32) -> Result<Vec<Match>> {
        let today = Utc::now().date_naive();
        let matches = self
            .matches_for_competition(competition, today, Tab::Fixtures)
            .await?;
        Ok(matches
            .into_iter()
            .filter(|m| m.status == MatchStatus::Live)
            .collect())
    }

    /// Details for several matches, bounded to a small concurrency ceiling.
    /// Failed fetches map to None.
    pub async fn batch_match_details(
        &self,
        match_ids: &[u64],
    ) -> HashMap<u64, Option<MatchDetails>> {
        stream::iter(match_ids.iter().copied())
            .map(|id| async move { (id, self.match_details(id).await.ok()) })
            .buffer_unordered(BATCH_DETAILS_CONCURRENCY)
            .collect()
            .await
    }

    /// Fire-and-forget warm-up of the details cache for the first `max`
    /// uncached ids.
    pub async fn prefetch_match_details(&self, match_ids: &[u64], max: usize) {
        let mut uncached = Vec::new();
        for &id in match_ids {
            if uncached.len() == max {
                break;
            }
            if self.inner.cache.details(id).await.is_none() {
                uncached.push(id);
            }
        }
        if uncached.is_empty() {
            return;
        }

        let client = self.clone();
        tokio::spawn(async move {
            client.batch_match_details(&uncached).await;
        });
    }

    /// Persist the empty-result cache now (normally done in the background
    /// after each aggregation).
    pub fn save_empty_cache(&self) -> Result<()> {
        self.inner.empty_cache.save()
    }

    /// (total markers, of which expired) in the empty-result cache.
    pub fn empty_cache_stats(&self) -> (usize, usize) {
        self.inner.empty_cache.stats()
    }

    /// Detached best-effort persistence; failure never reaches the caller.
    fn spawn_empty_cache_save(&self) {
        let empty_cache = Arc::clone(&self.inner.empty_cache);
        tokio::task::spawn_blocking(move || {
            if let Err(e) = empty_cache.save() {
                warn!("Background empty-cache save failed: {}", e);
            }
        });
    }
}
