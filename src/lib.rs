//! matchday — football fixture aggregation and live-update engine.
//!
//! The upstream APIs expose per-competition season listings rather than
//! per-date queries, so a date query fans out across the supported
//! competitions, rate-limited and cached, and merges whatever answers.
//! On top of that sit a progressive batch loader for slow full-registry
//! queries and a per-match live poller that pushes score and event updates
//! over a channel. This crate is the data layer; rendering, navigation and
//! notifications belong to the consumer.

pub mod aggregator;
pub mod cache;
pub mod competitions;
pub mod config;
pub mod events;
pub mod feed;
pub mod loader;
pub mod models;
pub mod poll;
pub mod ratelimit;

pub use aggregator::{ClientOptions, MatchClient};
pub use cache::{CacheConfig, ResponseCache};
pub use config::Config;
pub use feed::{ApiSportsFeed, FixtureFeed, FotmobFeed, MockFeed, Tab};
pub use loader::{BatchResult, DayResult, LoadSequence, LIVE_BATCH_SIZE};
pub use models::{Match, MatchDetails, MatchEvent, MatchStatus};
pub use poll::{LivePoller, PollConfig, PollUpdate};

/// Initialise tracing for a consuming binary: `RUST_LOG`-driven filtering
/// with an `info` default.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
