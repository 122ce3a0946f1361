//! Persistent negative cache for (date, competition) queries known to be
//! empty.
//!
//! Aggregation fans out one request per competition per tab; for past dates
//! most competitions had no matches, and re-asking the upstream every session
//! wastes the rate-limiter budget. A marker here short-circuits the results
//! query for that (date, competition) pair until the marker expires.
//!
//! This is an optimization, never a correctness guarantee: markers carry
//! their own TTL, and any problem loading or saving the file degrades to
//! "cache disabled", not an error.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, warn};

/// How long a "known empty" marker stays valid.
const MARKER_TTL: Duration = Duration::from_secs(24 * 60 * 60);

const CACHE_FILE: &str = "empty_results.json";

/// Persisted map of "YYYY-MM-DD:<competition_id>" to marker expiry.
pub struct EmptyResultsCache {
    markers: Mutex<HashMap<String, DateTime<Utc>>>,
    /// None when no usable config directory exists; the cache then works
    /// in-memory only and `save` is a no-op.
    path: Option<PathBuf>,
}

fn marker_key(date: NaiveDate, competition_id: u32) -> String {
    format!("{}:{}", date.format("%Y-%m-%d"), competition_id)
}

impl EmptyResultsCache {
    /// Load markers from `path`. A missing or corrupt file yields an empty
    /// cache; this constructor never fails.
    pub fn load(path: PathBuf) -> Self {
        let markers = match std::fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<HashMap<String, DateTime<Utc>>>(&bytes) {
                Ok(map) => {
                    debug!("Loaded {} empty-result markers from {:?}", map.len(), path);
                    map
                }
                Err(e) => {
                    warn!("Corrupt empty-result cache {:?}, starting empty: {}", path, e);
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };
        EmptyResultsCache {
            markers: Mutex::new(markers),
            path: Some(path),
        }
    }

    /// Load from the default per-user location, or fall back to an
    /// in-memory-only cache when no home directory is available.
    pub fn load_default() -> Self {
        match Self::default_path() {
            Some(path) => Self::load(path),
            None => {
                warn!("No home directory; empty-result cache will not persist");
                EmptyResultsCache {
                    markers: Mutex::new(HashMap::new()),
                    path: None,
                }
            }
        }
    }

    /// `~/.matchday/empty_results.json`, creating the directory if needed.
    pub fn default_path() -> Option<PathBuf> {
        let dir = dirs::home_dir()?.join(".matchday");
        std::fs::create_dir_all(&dir).ok()?;
        Some(dir.join(CACHE_FILE))
    }

    /// Whether (date, competition) is marked empty and the marker is still
    /// valid.
    pub fn is_empty(&self, date: NaiveDate, competition_id: u32) -> bool {
        let markers = self.markers.lock().unwrap();
        match markers.get(&marker_key(date, competition_id)) {
            Some(expires_at) => *expires_at > Utc::now(),
            None => false,
        }
    }

    /// Record that (date, competition) returned zero results.
    pub fn mark_empty(&self, date: NaiveDate, competition_id: u32) {
        let expires_at = Utc::now() + MARKER_TTL;
        self.markers
            .lock()
            .unwrap()
            .insert(marker_key(date, competition_id), expires_at);
    }

    /// Persist live markers to disk, pruning expired ones on the way out.
    /// No-op for an in-memory-only cache.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let snapshot: HashMap<String, DateTime<Utc>> = {
            let mut markers = self.markers.lock().unwrap();
            let now = Utc::now();
            markers.retain(|_, expires_at| *expires_at > now);
            markers.clone()
        };
        let bytes = serde_json::to_vec(&snapshot).context("serialize empty-result markers")?;
        write_atomic(path, &bytes)
            .with_context(|| format!("write empty-result cache {:?}", path))?;
        debug!("Saved {} empty-result markers", snapshot.len());
        Ok(())
    }

    /// (total markers, of which expired).
    pub fn stats(&self) -> (usize, usize) {
        let markers = self.markers.lock().unwrap();
        let now = Utc::now();
        let total = markers.len();
        let expired = markers.values().filter(|e| **e <= now).count();
        (total, expired)
    }
}

/// Write via a sibling temp file + rename so a crash mid-write cannot leave a
/// truncated cache behind.
fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)
}
