use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use crate::aggregator::{ClientOptions, MatchClient};
use crate::feed::{ApiSportsFeed, FixtureFeed, FotmobFeed, MockFeed};
use crate::poll::PollConfig;

/// Football fixture aggregation and live-update engine
#[derive(Parser, Debug, Clone)]
#[command(name = "matchday", version, about)]
pub struct Config {
    /// Serve canned mock data instead of hitting the network
    #[arg(long, env = "MOCK_DATA", default_value = "false")]
    pub mock_data: bool,

    /// Comma-separated competition ids to query (empty = full supported list)
    #[arg(long, env = "COMPETITIONS", value_delimiter = ',')]
    pub competitions: Vec<u32>,

    /// API-Sports key for the secondary results source (absent = disabled)
    #[arg(long, env = "API_SPORTS_KEY")]
    pub api_sports_key: Option<String>,

    /// Minimum interval between upstream requests, in milliseconds
    #[arg(long, env = "RATE_LIMIT_MS", default_value = "200")]
    pub rate_limit_ms: u64,

    /// Live match polling interval in seconds
    #[arg(long, env = "POLL_INTERVAL_SECS", default_value = "90")]
    pub poll_interval_secs: u64,

    /// Directory for persisted caches (default: ~/.matchday)
    #[arg(long, env = "CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.rate_limit_ms > 60_000 {
            anyhow::bail!("rate_limit_ms must be at most 60000 (one minute)");
        }
        if self.poll_interval_secs < 5 {
            anyhow::bail!("poll_interval_secs must be at least 5");
        }
        // Unknown competition ids are accepted; the feed decides what they
        // mean.
        Ok(())
    }

    /// Build the shared client from this configuration, choosing the mock or
    /// network feed.
    pub fn build_client(&self) -> anyhow::Result<MatchClient> {
        let feed: Arc<dyn FixtureFeed> = if self.mock_data {
            Arc::new(MockFeed)
        } else {
            Arc::new(FotmobFeed::new(None)?)
        };
        Ok(MatchClient::new(
            feed,
            ClientOptions {
                competitions: self.competitions.clone(),
                min_request_interval: Duration::from_millis(self.rate_limit_ms),
                empty_cache_path: self
                    .cache_dir
                    .as_ref()
                    .map(|dir| dir.join("empty_results.json")),
                ..ClientOptions::default()
            },
        ))
    }

    /// The secondary results source, disabled when no key is configured.
    pub fn build_api_sports(&self) -> anyhow::Result<ApiSportsFeed> {
        ApiSportsFeed::new(self.api_sports_key.clone(), None)
    }

    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            interval: Duration::from_secs(self.poll_interval_secs),
            ..PollConfig::default()
        }
    }
}
