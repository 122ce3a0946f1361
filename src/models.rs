use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    NotStarted,
    Live,
    Finished,
    Postponed,
    Cancelled,
}

/// A competition the engine can aggregate fixtures from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct League {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub country_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: u64,
    pub name: String,
    /// Abbreviated display name; falls back to the full name when the
    /// upstream payload carries none.
    #[serde(default)]
    pub short_name: String,
}

/// A single fixture as fetched from an upstream feed.
///
/// Matches are immutable once fetched: a later fetch for the same id produces
/// a new value that supersedes this one, it never mutates it in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: u64,
    pub league: League,
    pub home_team: Team,
    pub away_team: Team,
    pub status: MatchStatus,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    /// Kickoff time in UTC; absent when the upstream omits it.
    pub match_time: Option<DateTime<Utc>>,
    /// Live-clock label, e.g. "45+2", "HT".
    pub live_time: Option<String>,
    #[serde(default)]
    pub round: String,
}

/// An in-match event (goal, card, substitution, ...).
///
/// `id` is assigned by the upstream and stable across fetches of the same
/// match; it is the deduplication key when diffing successive polls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEvent {
    pub id: u64,
    pub minute: u32,
    /// Lowercased event kind: "goal", "card", "substitution", or a raw
    /// upstream label for anything else.
    pub kind: String,
    pub team: Team,
    pub player: Option<String>,
    /// Assisting player for goals; the incoming player for substitutions.
    pub assist: Option<String>,
    /// Kind-specific detail: card color ("yellow"/"red"), "sub", etc.
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorePair {
    pub home: u32,
    pub away: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Home,
    Away,
}

/// One row of the per-stat comparison table (possession, shots, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatRow {
    pub key: String,
    pub label: String,
    pub home_value: String,
    pub away_value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: u64,
    pub name: String,
    pub shirt_number: u32,
    #[serde(default)]
    pub position: String,
    pub rating: Option<String>,
}

/// Everything a single detail fetch yields for one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDetails {
    pub summary: Match,
    /// Ordered chronologically (ascending minute); event ids are unique
    /// within this collection.
    pub events: Vec<MatchEvent>,
    pub venue: Option<String>,
    pub referee: Option<String>,
    pub attendance: Option<u32>,
    pub half_time_score: Option<ScorePair>,
    pub penalties: Option<ScorePair>,
    pub winner: Option<Side>,
    pub statistics: Vec<StatRow>,
    pub home_formation: Option<String>,
    pub away_formation: Option<String>,
    pub home_starting: Vec<PlayerInfo>,
    pub away_starting: Vec<PlayerInfo>,
    pub home_bench: Vec<PlayerInfo>,
    pub away_bench: Vec<PlayerInfo>,
    /// 90 for regulation, 120 when the match went to extra time.
    pub match_duration: u32,
    pub extra_time: bool,
}

impl MatchDetails {
    pub fn from_summary(summary: Match) -> Self {
        MatchDetails {
            summary,
            events: Vec::new(),
            venue: None,
            referee: None,
            attendance: None,
            half_time_score: None,
            penalties: None,
            winner: None,
            statistics: Vec::new(),
            home_formation: None,
            away_formation: None,
            home_starting: Vec::new(),
            away_starting: Vec::new(),
            home_bench: Vec::new(),
            away_bench: Vec::new(),
            match_duration: 90,
            extra_time: false,
        }
    }
}
