//! Secondary fixture source: the v3.football.api-sports.io REST API.
//!
//! Authenticated with an API-key header. A missing key is not an error: the
//! feed constructs in a disabled state and every fetch returns an empty
//! result, which the presentation layer renders as "unconfigured" rather
//! than failing.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::models::{League, Match, MatchDetails, MatchStatus, ScorePair, Side, Team};

const BASE_URL: &str = "https://v3.football.api-sports.io";

/// The competition ids this source is queried for (API-Sports numbering,
/// unrelated to the primary feed's ids). Kept to the top European leagues to
/// stay inside the free-tier quota.
pub const SUPPORTED_LEAGUES: &[u32] = &[
    39,  // Premier League
    140, // La Liga
    78,  // Bundesliga
    135, // Serie A
    61,  // Ligue 1
];

pub struct ApiSportsFeed {
    http: Client,
    base_url: String,
    /// None means the feed is disabled (no key configured).
    api_key: Option<String>,
}

impl ApiSportsFeed {
    pub fn new(api_key: Option<String>, base_url: Option<&str>) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;
        if api_key.is_none() {
            debug!("No API-Sports key configured; secondary source disabled");
        }
        Ok(ApiSportsFeed {
            http,
            base_url: base_url.unwrap_or(BASE_URL).to_string(),
            api_key,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    /// Finished matches between two dates inclusive, one request per calendar
    /// day. A failing day is skipped; the result is the union of the days
    /// that answered.
    pub async fn finished_matches_by_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Match>> {
        let Some(key) = &self.api_key else {
            return Ok(Vec::new());
        };

        let mut all = Vec::new();
        let mut day = from;
        while day <= to {
            let url = format!("{}/fixtures?date={}&status=FT", self.base_url, day);
            match self.fetch_day(&url, key).await {
                Ok(matches) => {
                    all.extend(
                        matches
                            .into_iter()
                            .filter(|m| SUPPORTED_LEAGUES.contains(&m.league.id))
                            .filter(|m| m.status == MatchStatus::Finished),
                    );
                }
                Err(e) => warn!("API-Sports query for {} failed: {}", day, e),
            }
            day += Duration::days(1);
        }
        Ok(all)
    }

    /// Finished matches from the last `days` days, today inclusive.
    pub async fn recent_finished(&self, days: u32) -> Result<Vec<Match>> {
        let days = days.max(1);
        let today = Utc::now().date_naive();
        let from = today - Duration::days(i64::from(days) - 1);
        self.finished_matches_by_range(from, today).await
    }

    /// Details for one match. Events require a separate endpoint on this
    /// source, so the payload carries scores/venue/penalties only.
    pub async fn match_details(&self, match_id: u64) -> Result<Option<MatchDetails>> {
        let Some(key) = &self.api_key else {
            return Ok(None);
        };

        let url = format!("{}/fixtures?id={}", self.base_url, match_id);
        let raw = self.fetch_raw(&url, key).await?;
        let Some(fixture) = raw.response.into_iter().next() else {
            return Ok(None);
        };
        Ok(Some(fixture.to_details()))
    }

    async fn fetch_day(&self, url: &str, key: &str) -> Result<Vec<Match>> {
        let raw = self.fetch_raw(url, key).await?;
        Ok(raw.response.into_iter().map(|f| f.to_match()).collect())
    }

    async fn fetch_raw(&self, url: &str, key: &str) -> Result<FixturesResponse> {
        debug!("Fetching from API-Sports: {}", url);
        let resp = self
            .http
            .get(url)
            .header("x-apisports-key", key)
            .send()
            .await
            .context("API-Sports request failed")?;

        if !resp.status().is_success() {
            anyhow::bail!("API-Sports error: {}", resp.status());
        }

        resp.json().await.context("decode API-Sports response")
    }
}

// ── Payload ────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct FixturesResponse {
    #[serde(default)]
    response: Vec<RawFixture>,
}

#[derive(Debug, Default, Deserialize)]
struct RawFixture {
    #[serde(default)]
    fixture: FixtureBlock,
    #[serde(default)]
    league: LeagueBlock,
    #[serde(default)]
    teams: TeamsBlock,
    #[serde(default)]
    goals: GoalPair,
    #[serde(default)]
    score: ScoreBlock,
}

#[derive(Debug, Default, Deserialize)]
struct FixtureBlock {
    #[serde(default)]
    id: u64,
    #[serde(default)]
    date: String,
    #[serde(default)]
    status: StatusBlock,
    #[serde(default)]
    venue: VenueBlock,
}

#[derive(Debug, Default, Deserialize)]
struct StatusBlock {
    #[serde(default)]
    short: String,
    #[serde(default)]
    elapsed: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct VenueBlock {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LeagueBlock {
    #[serde(default)]
    id: u32,
    #[serde(default)]
    name: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    round: String,
}

#[derive(Debug, Default, Deserialize)]
struct TeamsBlock {
    #[serde(default)]
    home: TeamBlock,
    #[serde(default)]
    away: TeamBlock,
}

#[derive(Debug, Default, Deserialize)]
struct TeamBlock {
    #[serde(default)]
    id: u64,
    #[serde(default)]
    name: String,
    winner: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct GoalPair {
    home: Option<u32>,
    away: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct ScoreBlock {
    #[serde(default)]
    fulltime: GoalPair,
    #[serde(default)]
    halftime: GoalPair,
    #[serde(default)]
    penalty: GoalPair,
}

fn status_from_code(code: &str) -> MatchStatus {
    match code {
        "FT" | "AET" | "PEN" => MatchStatus::Finished,
        "LIVE" | "HT" | "1H" | "2H" | "ET" | "BT" | "P" | "SUSP" | "INT" => MatchStatus::Live,
        "NS" | "TBD" => MatchStatus::NotStarted,
        "CANC" => MatchStatus::Cancelled,
        "PST" | "POST" => MatchStatus::Postponed,
        _ => MatchStatus::NotStarted,
    }
}

impl RawFixture {
    fn to_match(&self) -> Match {
        let status = status_from_code(&self.fixture.status.short);
        Match {
            id: self.fixture.id,
            league: League {
                id: self.league.id,
                name: self.league.name.clone(),
                country: self.league.country.clone(),
                country_code: String::new(),
            },
            home_team: Team {
                id: self.teams.home.id,
                name: self.teams.home.name.clone(),
                short_name: self.teams.home.name.clone(),
            },
            away_team: Team {
                id: self.teams.away.id,
                name: self.teams.away.name.clone(),
                short_name: self.teams.away.name.clone(),
            },
            status,
            home_score: self.goals.home.or(self.score.fulltime.home),
            away_score: self.goals.away.or(self.score.fulltime.away),
            match_time: DateTime::parse_from_rfc3339(&self.fixture.date)
                .ok()
                .map(|t| t.with_timezone(&Utc)),
            live_time: match status {
                MatchStatus::Live => self.fixture.status.elapsed.map(|m| format!("{}'", m)),
                _ => None,
            },
            round: self.league.round.clone(),
        }
    }

    fn to_details(&self) -> MatchDetails {
        let mut details = MatchDetails::from_summary(self.to_match());

        if let (Some(h), Some(a)) = (self.score.halftime.home, self.score.halftime.away) {
            details.half_time_score = Some(ScorePair { home: h, away: a });
        }
        if let (Some(h), Some(a)) = (self.score.penalty.home, self.score.penalty.away) {
            details.penalties = Some(ScorePair { home: h, away: a });
        }
        details.venue = self.fixture.venue.name.clone().filter(|n| !n.is_empty());

        if self.teams.home.winner == Some(true) {
            details.winner = Some(Side::Home);
        } else if self.teams.away.winner == Some(true) {
            details.winner = Some(Side::Away);
        }

        if matches!(self.fixture.status.short.as_str(), "AET" | "PEN") {
            details.extra_time = true;
            details.match_duration = 120;
        }

        details
    }
}
