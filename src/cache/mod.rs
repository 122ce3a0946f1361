//! In-memory TTL cache for upstream responses.
//!
//! Three independent surfaces, each behind its own lock: per-date match
//! lists, per-match details, and a singleton live-match list. The fan-out
//! aggregator writes here after every run so that quick navigation back to
//! the same date or match costs nothing.
//!
//! Expiry bookkeeping uses `tokio::time::Instant` so TTL behavior can be
//! tested under paused time.

pub mod empty;

use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::models::{Match, MatchDetails, MatchStatus};

/// TTLs and capacity caps for the response cache.
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    pub matches_ttl: Duration,
    pub details_ttl: Duration,
    /// Details of finished matches will not change; cache them longer.
    pub finished_details_ttl: Duration,
    pub live_ttl: Duration,
    pub max_matches_entries: usize,
    pub max_details_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            matches_ttl: Duration::from_secs(15 * 60),
            details_ttl: Duration::from_secs(5 * 60),
            finished_details_ttl: Duration::from_secs(30 * 60),
            live_ttl: Duration::from_secs(2 * 60),
            max_matches_entries: 10,
            max_details_entries: 100,
        }
    }
}

struct Entry<T> {
    payload: T,
    expires_at: Instant,
}

impl<T> Entry<T> {
    fn live(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Thread-safe response cache with bounded, expiry-ordered eviction.
pub struct ResponseCache {
    config: CacheConfig,
    /// key: "YYYY-MM-DD"
    matches: RwLock<HashMap<String, Entry<Vec<Match>>>>,
    details: RwLock<HashMap<u64, Entry<MatchDetails>>>,
    live: RwLock<Option<Entry<Vec<Match>>>>,
}

impl ResponseCache {
    pub fn new(config: CacheConfig) -> Self {
        ResponseCache {
            config,
            matches: RwLock::new(HashMap::new()),
            details: RwLock::new(HashMap::new()),
            live: RwLock::new(None),
        }
    }

    /// Cached match list for a date key, or None if absent/expired.
    pub async fn matches(&self, date_key: &str) -> Option<Vec<Match>> {
        let map = self.matches.read().await;
        map.get(date_key)
            .filter(|e| e.live())
            .map(|e| e.payload.clone())
    }

    pub async fn set_matches(&self, date_key: &str, matches: Vec<Match>) {
        let mut map = self.matches.write().await;
        if map.len() >= self.config.max_matches_entries {
            evict_one(&mut map, self.config.max_matches_entries);
        }
        map.insert(
            date_key.to_string(),
            Entry {
                payload: matches,
                expires_at: Instant::now() + self.config.matches_ttl,
            },
        );
    }

    /// Cached details for a match, or None if absent/expired.
    pub async fn details(&self, match_id: u64) -> Option<MatchDetails> {
        let map = self.details.read().await;
        map.get(&match_id)
            .filter(|e| e.live())
            .map(|e| e.payload.clone())
    }

    pub async fn set_details(&self, match_id: u64, details: MatchDetails) {
        let mut map = self.details.write().await;
        if map.len() >= self.config.max_details_entries {
            evict_one(&mut map, self.config.max_details_entries);
        }
        // Finished matches won't change; keep them around longer.
        let ttl = if details.summary.status == MatchStatus::Finished {
            self.config.finished_details_ttl
        } else {
            self.config.details_ttl
        };
        map.insert(
            match_id,
            Entry {
                payload: details,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// Remove one match from the details cache to force a refresh on the
    /// next fetch.
    pub async fn clear_details(&self, match_id: u64) {
        self.details.write().await.remove(&match_id);
    }

    /// Match ids currently held in the details cache (expired or not).
    pub async fn cached_detail_ids(&self) -> Vec<u64> {
        self.details.read().await.keys().copied().collect()
    }

    pub async fn live_matches(&self) -> Option<Vec<Match>> {
        let slot = self.live.read().await;
        slot.as_ref()
            .filter(|e| e.live())
            .map(|e| e.payload.clone())
    }

    pub async fn set_live_matches(&self, matches: Vec<Match>) {
        let mut slot = self.live.write().await;
        *slot = Some(Entry {
            payload: matches,
            expires_at: Instant::now() + self.config.live_ttl,
        });
    }

    /// Invalidate the live slot so the next fetch goes to the network.
    pub async fn clear_live(&self) {
        *self.live.write().await = None;
    }
}

/// Bring `map` below `cap`: purge expired entries first, and if that was not
/// enough remove the single entry closest to expiry. Caller holds the write
/// lock.
fn evict_one<K: Clone + std::hash::Hash + Eq, T>(map: &mut HashMap<K, Entry<T>>, cap: usize) {
    let now = Instant::now();
    map.retain(|_, e| e.expires_at > now);

    if map.len() >= cap {
        let earliest = map
            .iter()
            .min_by_key(|(_, e)| e.expires_at)
            .map(|(k, _)| k.clone());
        if let Some(key) = earliest {
            map.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{League, Team};

    fn match_fixture(id: u64) -> Match {
        Match {
            id,
            league: League {
                id: 47,
                name: "Premier League".into(),
                country: "England".into(),
                country_code: "ENG".into(),
            },
            home_team: Team {
                id: 1,
                name: "Arsenal".into(),
                short_name: "ARS".into(),
            },
            away_team: Team {
                id: 2,
                name: "Chelsea".into(),
                short_name: "CHE".into(),
            },
            status: MatchStatus::NotStarted,
            home_score: None,
            away_score: None,
            match_time: None,
            live_time: None,
            round: "Round 1".into(),
        }
    }

    fn details_fixture(id: u64, status: MatchStatus) -> MatchDetails {
        let mut m = match_fixture(id);
        m.status = status;
        MatchDetails::from_summary(m)
    }

    #[tokio::test(start_paused = true)]
    async fn test_matches_set_then_get_within_ttl() {
        let cache = ResponseCache::new(CacheConfig::default());
        let payload = vec![match_fixture(1), match_fixture(2)];
        cache.set_matches("2025-03-10", payload.clone()).await;
        assert_eq!(cache.matches("2025-03-10").await, Some(payload));
    }

    #[tokio::test(start_paused = true)]
    async fn test_matches_expire_after_ttl() {
        let cache = ResponseCache::new(CacheConfig::default());
        cache.set_matches("2025-03-10", vec![match_fixture(1)]).await;
        tokio::time::advance(Duration::from_secs(15 * 60 + 1)).await;
        assert!(cache.matches("2025-03-10").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_matches_capacity_bounded() {
        let config = CacheConfig {
            max_matches_entries: 3,
            ..CacheConfig::default()
        };
        let cache = ResponseCache::new(config);
        for day in 1..=8 {
            let key = format!("2025-03-{:02}", day);
            cache.set_matches(&key, vec![match_fixture(day as u64)]).await;
        }
        let live = cache.matches.read().await.len();
        assert!(live <= 3, "cache grew past capacity: {}", live);
    }

    #[tokio::test(start_paused = true)]
    async fn test_eviction_prefers_expired_entries() {
        let config = CacheConfig {
            max_matches_entries: 2,
            ..CacheConfig::default()
        };
        let cache = ResponseCache::new(config);
        cache.set_matches("2025-03-01", vec![match_fixture(1)]).await;
        tokio::time::advance(Duration::from_secs(16 * 60)).await; // first entry now expired
        cache.set_matches("2025-03-02", vec![match_fixture(2)]).await;
        cache.set_matches("2025-03-03", vec![match_fixture(3)]).await;

        // The expired 03-01 entry is gone; both fresh entries survive.
        assert!(cache.matches("2025-03-02").await.is_some());
        assert!(cache.matches("2025-03-03").await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_eviction_removes_earliest_expiry_when_all_live() {
        let config = CacheConfig {
            max_matches_entries: 2,
            ..CacheConfig::default()
        };
        let cache = ResponseCache::new(config);
        cache.set_matches("2025-03-01", vec![match_fixture(1)]).await;
        tokio::time::advance(Duration::from_secs(60)).await;
        cache.set_matches("2025-03-02", vec![match_fixture(2)]).await;
        tokio::time::advance(Duration::from_secs(60)).await;
        cache.set_matches("2025-03-03", vec![match_fixture(3)]).await;

        // 03-01 had the earliest expiry and was still live, so it is the one
        // evicted.
        assert!(cache.matches("2025-03-01").await.is_none());
        assert!(cache.matches("2025-03-02").await.is_some());
        assert!(cache.matches("2025-03-03").await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_details_ttl_escalated_for_finished() {
        let cache = ResponseCache::new(CacheConfig::default());
        cache.set_details(10, details_fixture(10, MatchStatus::Live)).await;
        cache
            .set_details(11, details_fixture(11, MatchStatus::Finished))
            .await;

        // Past the live TTL but inside the finished TTL.
        tokio::time::advance(Duration::from_secs(6 * 60)).await;
        assert!(cache.details(10).await.is_none());
        assert!(cache.details(11).await.is_some());

        // Past the finished TTL too.
        tokio::time::advance(Duration::from_secs(25 * 60)).await;
        assert!(cache.details(11).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_details_forces_miss() {
        let cache = ResponseCache::new(CacheConfig::default());
        cache.set_details(10, details_fixture(10, MatchStatus::Live)).await;
        cache.clear_details(10).await;
        assert!(cache.details(10).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_live_slot_roundtrip_and_clear() {
        let cache = ResponseCache::new(CacheConfig::default());
        assert!(cache.live_matches().await.is_none());

        let payload = vec![match_fixture(1)];
        cache.set_live_matches(payload.clone()).await;
        assert_eq!(cache.live_matches().await, Some(payload));

        cache.clear_live().await;
        assert!(cache.live_matches().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_live_slot_expires() {
        let cache = ResponseCache::new(CacheConfig::default());
        cache.set_live_matches(vec![match_fixture(1)]).await;
        tokio::time::advance(Duration::from_secs(2 * 60 + 1)).await;
        assert!(cache.live_matches().await.is_none());
    }
}
