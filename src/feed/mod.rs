pub mod apisports;
pub mod fotmob;
pub mod mock;

pub use apisports::ApiSportsFeed;
pub use fotmob::FotmobFeed;
pub use mock::MockFeed;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Match, MatchDetails};

/// A feed query mode: upcoming fixtures or completed results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    Fixtures,
    Results,
}

impl Tab {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Fixtures => "fixtures",
            Tab::Results => "results",
        }
    }

    /// Both tabs, the default for a full-date aggregation.
    pub const BOTH: [Tab; 2] = [Tab::Fixtures, Tab::Results];
}

/// Trait every primary fixture feed must implement.
///
/// The aggregator only ever talks to this seam, so the canned mock feed is a
/// drop-in substitute for the network-backed one.
#[async_trait]
pub trait FixtureFeed: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// All matches currently listed on a competition's tab. Payloads are NOT
    /// filtered to any date; the caller filters.
    async fn league_fixtures(&self, competition_id: u32, tab: Tab) -> Result<Vec<Match>>;

    /// Full details for one match.
    async fn match_details(&self, match_id: u64) -> Result<MatchDetails>;
}
