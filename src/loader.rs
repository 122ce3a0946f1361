//! Progressive batch loading.
//!
//! Full-registry queries are slow behind the rate limiter, so the consumer
//! asks for the data in slices: live matches in competition batches, recent
//! statistics one calendar day at a time. Each call here is stateless; the
//! consumer threads results through a [`LoadSequence`] and can abandon a
//! sequence at any point simply by starting a new one.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::future::join_all;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::aggregator::MatchClient;
use crate::feed::Tab;
use crate::models::{Match, MatchStatus};

/// Competitions queried per live batch.
pub const LIVE_BATCH_SIZE: usize = 4;

/// Upper bound on any single fetch unit inside a batch.
const UNIT_TIMEOUT: Duration = Duration::from_secs(10);

/// One slice of a progressive live load.
#[derive(Debug)]
pub struct BatchResult {
    pub batch_index: usize,
    pub is_last: bool,
    pub matches: Vec<Match>,
}

/// One calendar day of a progressive statistics load.
#[derive(Debug)]
pub struct DayResult {
    pub day_index: usize,
    pub is_today: bool,
    pub is_last: bool,
    pub finished: Vec<Match>,
    pub upcoming: Vec<Match>,
}

/// Live matches for the `batch_index`-th slice of the active competitions,
/// fetched concurrently with each unit under its own timeout. A unit that
/// fails or times out contributes nothing.
pub async fn live_batch(client: &MatchClient, batch_index: usize) -> BatchResult {
    let competitions = client.competitions();
    let start = batch_index * LIVE_BATCH_SIZE;
    let end = (start + LIVE_BATCH_SIZE).min(competitions.len());
    let is_last = end >= competitions.len();

    let slice: Vec<u32> = competitions
        .get(start..end)
        .map(|s| s.to_vec())
        .unwrap_or_default();

    let merged: Arc<Mutex<Vec<Match>>> = Arc::new(Mutex::new(Vec::new()));
    let mut units = Vec::new();

    for competition in slice {
        let client = client.clone();
        let merged = Arc::clone(&merged);
        units.push(tokio::spawn(async move {
            match timeout(UNIT_TIMEOUT, client.live_matches_for_competition(competition)).await {
                Ok(Ok(live)) => merged.lock().await.extend(live),
                Ok(Err(e)) => warn!("Live batch unit for {} failed: {}", competition, e),
                Err(_) => warn!("Live batch unit for {} timed out", competition),
            }
        }));
    }
    join_all(units).await;

    let matches = std::mem::take(&mut *merged.lock().await);
    debug!(
        "Live batch {}: {} matches (last={})",
        batch_index,
        matches.len(),
        is_last
    );

    BatchResult {
        batch_index,
        is_last,
        matches,
    }
}

/// Matches for the day `day_index` days ago, split into finished and
/// upcoming. Today queries both tabs; past days only results, since nothing
/// upcoming lives in the past. Failures inside the aggregation surface as
/// empty lists, never as an error.
pub async fn stats_day(client: &MatchClient, day_index: usize, total_days: usize) -> DayResult {
    let is_today = day_index == 0;
    let date = Utc::now().date_naive() - chrono::Duration::days(day_index as i64);

    let tabs: &[Tab] = if is_today { &Tab::BOTH } else { &[Tab::Results] };
    let matches = client.matches_by_date_with_tabs(date, tabs).await;

    let (finished, upcoming): (Vec<Match>, Vec<Match>) = matches
        .into_iter()
        .partition(|m| m.status == MatchStatus::Finished);

    DayResult {
        day_index,
        is_today,
        is_last: day_index + 1 >= total_days,
        finished,
        upcoming,
    }
}

/// Consumer-side sequencing state for a progressive load.
///
/// `begin` fully resets the sequence: a superseding load discards the old
/// buffer instead of merging into it.
#[derive(Debug, Default)]
pub struct LoadSequence {
    loaded: usize,
    total: usize,
    buffer: Vec<Match>,
}

impl LoadSequence {
    pub fn new() -> Self {
        LoadSequence::default()
    }

    /// Start a new sequence of `total` expected slices, discarding any
    /// previous state.
    pub fn begin(&mut self, total: usize) {
        self.loaded = 0;
        self.total = total;
        self.buffer.clear();
    }

    /// Absorb one slice's matches and advance the counter.
    pub fn absorb(&mut self, matches: Vec<Match>) {
        self.buffer.extend(matches);
        self.loaded += 1;
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.loaded >= self.total
    }

    pub fn loaded(&self) -> usize {
        self.loaded
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn matches(&self) -> &[Match] {
        &self.buffer
    }

    /// Number of batches needed to cover `competitions` at the live batch
    /// size.
    pub fn live_batch_count(competitions: usize) -> usize {
        competitions.div_ceil(LIVE_BATCH_SIZE)
    }
}
