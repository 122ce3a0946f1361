//! Primary fixture feed: the unofficial fotmob.com JSON API.
//!
//! The payloads are deeply nested and loosely typed — string-encoded ids,
//! nullable booleans, timestamps with or without fractional seconds,
//! attendance as either a bare number or an object. Everything optional is
//! tolerated; this module's job is translating that shape into the crate's
//! domain types.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Client;
use serde::de::{self, Deserializer};
use serde::Deserialize;
use tracing::debug;

use super::{FixtureFeed, Tab};
use crate::models::{
    League, Match, MatchDetails, MatchEvent, MatchStatus, PlayerInfo, ScorePair, Side, StatRow,
    Team,
};

const BASE_URL: &str = "https://www.fotmob.com/api";
const USER_AGENT: &str = "Mozilla/5.0";

pub struct FotmobFeed {
    http: Client,
    base_url: String,
}

impl FotmobFeed {
    pub fn new(base_url: Option<&str>) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(FotmobFeed {
            http,
            base_url: base_url.unwrap_or(BASE_URL).to_string(),
        })
    }
}

#[async_trait]
impl FixtureFeed for FotmobFeed {
    fn name(&self) -> &str {
        "fotmob"
    }

    async fn league_fixtures(&self, competition_id: u32, tab: Tab) -> Result<Vec<Match>> {
        let url = format!(
            "{}/leagues?id={}&tab={}",
            self.base_url,
            competition_id,
            tab.as_str()
        );
        debug!("Fetching league fixtures: {}", url);

        let resp = self
            .http
            .get(&url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .with_context(|| format!("fetch league {} {}", competition_id, tab.as_str()))?;

        if !resp.status().is_success() {
            anyhow::bail!("league {} feed error: {}", competition_id, resp.status());
        }

        let payload: LeagueResponse = resp
            .json()
            .await
            .with_context(|| format!("decode league {} response", competition_id))?;

        Ok(parse_league_response(payload))
    }

    async fn match_details(&self, match_id: u64) -> Result<MatchDetails> {
        let url = format!("{}/matchDetails?matchId={}", self.base_url, match_id);
        debug!("Fetching match details: {}", url);

        let resp = self
            .http
            .get(&url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .with_context(|| format!("fetch details for match {}", match_id))?;

        if !resp.status().is_success() {
            anyhow::bail!("match {} details error: {}", match_id, resp.status());
        }

        let payload: DetailsResponse = resp
            .json()
            .await
            .with_context(|| format!("decode details for match {}", match_id))?;

        Ok(parse_details_response(payload))
    }
}

/// Accept kickoff timestamps in the formats the upstream actually emits.
pub(crate) fn parse_utc_time(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    // Fractional-seconds variant with a literal Z, seen alongside RFC 3339.
    if let Ok(t) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.3fZ") {
        return Some(t.and_utc());
    }
    if let Ok(t) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(t.and_utc());
    }
    None
}

/// The upstream serializes most ids as strings, some as numbers. Parse
/// failures map to 0 rather than failing the whole payload.
fn lenient_id<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Str(String),
        Other(de::IgnoredAny),
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Num(n) => n,
        Raw::Str(s) => s.parse().unwrap_or(0),
        Raw::Other(_) => 0,
    })
}

// ── League fixtures payload ────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct LeagueResponse {
    #[serde(default)]
    details: LeagueDetails,
    #[serde(default)]
    fixtures: FixturesBlock,
}

#[derive(Debug, Default, Deserialize)]
struct LeagueDetails {
    #[serde(default)]
    id: u32,
    #[serde(default)]
    name: String,
    #[serde(default)]
    country: String,
    #[serde(default, rename = "countryCode")]
    country_code: String,
}

#[derive(Debug, Default, Deserialize)]
struct FixturesBlock {
    #[serde(default, rename = "allMatches")]
    all_matches: Vec<RawMatch>,
}

#[derive(Debug, Deserialize)]
struct RawMatch {
    #[serde(default, deserialize_with = "lenient_id")]
    id: u64,
    #[serde(default)]
    round: String,
    home: RawTeam,
    away: RawTeam,
    #[serde(default)]
    status: RawStatus,
    #[serde(default)]
    league: Option<LeagueDetails>,
}

#[derive(Debug, Deserialize)]
struct RawTeam {
    #[serde(default, deserialize_with = "lenient_id")]
    id: u64,
    #[serde(default)]
    name: String,
    #[serde(default, rename = "shortName")]
    short_name: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawStatus {
    #[serde(default, rename = "utcTime")]
    utc_time: Option<String>,
    started: Option<bool>,
    finished: Option<bool>,
    cancelled: Option<bool>,
    #[serde(rename = "liveTime")]
    live_time: Option<RawLiveTime>,
    score: Option<RawScore>,
}

#[derive(Debug, Deserialize)]
struct RawLiveTime {
    #[serde(default)]
    short: String,
}

#[derive(Debug, Deserialize)]
struct RawScore {
    #[serde(default)]
    home: u32,
    #[serde(default)]
    away: u32,
}

impl RawStatus {
    fn to_status(&self) -> MatchStatus {
        if self.cancelled.unwrap_or(false) {
            MatchStatus::Cancelled
        } else if self.finished.unwrap_or(false) {
            MatchStatus::Finished
        } else if self.started.unwrap_or(false) {
            MatchStatus::Live
        } else {
            MatchStatus::NotStarted
        }
    }

    fn kickoff(&self) -> Option<DateTime<Utc>> {
        self.utc_time.as_deref().and_then(parse_utc_time)
    }
}

impl RawTeam {
    fn to_team(&self) -> Team {
        Team {
            id: self.id,
            name: self.name.clone(),
            short_name: if self.short_name.is_empty() {
                self.name.clone()
            } else {
                self.short_name.clone()
            },
        }
    }
}

impl LeagueDetails {
    fn to_league(&self) -> League {
        League {
            id: self.id,
            name: self.name.clone(),
            country: self.country.clone(),
            country_code: self.country_code.clone(),
        }
    }
}

fn parse_league_response(payload: LeagueResponse) -> Vec<Match> {
    let fallback_league = payload.details.to_league();
    payload
        .fixtures
        .all_matches
        .into_iter()
        .map(|raw| {
            // Per-match league blocks are often absent; fall back to the
            // response-level details.
            let league = match &raw.league {
                Some(l) if l.id != 0 => l.to_league(),
                _ => fallback_league.clone(),
            };
            let status = raw.status.to_status();
            Match {
                id: raw.id,
                league,
                home_team: raw.home.to_team(),
                away_team: raw.away.to_team(),
                status,
                home_score: raw.status.score.as_ref().map(|s| s.home),
                away_score: raw.status.score.as_ref().map(|s| s.away),
                match_time: raw.status.kickoff(),
                live_time: match status {
                    MatchStatus::Live => raw.status.live_time.as_ref().map(|t| t.short.clone()),
                    _ => None,
                },
                round: raw.round,
            }
        })
        .collect()
}

// ── Match details payload ──────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct DetailsResponse {
    #[serde(default)]
    header: Header,
    #[serde(default)]
    general: General,
    #[serde(default)]
    content: ContentBlock,
}

#[derive(Debug, Default, Deserialize)]
struct Header {
    #[serde(default)]
    teams: Vec<HeaderTeam>,
    #[serde(default)]
    status: RawStatus,
}

#[derive(Debug, Deserialize)]
struct HeaderTeam {
    #[serde(default)]
    score: u32,
}

#[derive(Debug, Default, Deserialize)]
struct General {
    #[serde(default, rename = "matchId", deserialize_with = "lenient_id")]
    match_id: u64,
    #[serde(default, rename = "matchRound")]
    round: String,
    #[serde(default, rename = "homeTeam")]
    home_team: NamedTeam,
    #[serde(default, rename = "awayTeam")]
    away_team: NamedTeam,
    #[serde(default, rename = "leagueId")]
    league_id: u32,
    #[serde(default, rename = "leagueName")]
    league_name: String,
}

#[derive(Debug, Default, Deserialize)]
struct NamedTeam {
    #[serde(default, deserialize_with = "lenient_id")]
    id: u64,
    #[serde(default)]
    name: String,
}

impl NamedTeam {
    fn to_team(&self) -> Team {
        Team {
            id: self.id,
            name: self.name.clone(),
            short_name: self.name.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ContentBlock {
    #[serde(default, rename = "matchFacts")]
    match_facts: MatchFacts,
    #[serde(default)]
    stats: StatsBlock,
    #[serde(default)]
    lineup: LineupBlock,
}

#[derive(Debug, Default, Deserialize)]
struct MatchFacts {
    #[serde(default)]
    events: EventsBlock,
    #[serde(default, rename = "infoBox")]
    info_box: InfoBox,
}

#[derive(Debug, Default, Deserialize)]
struct EventsBlock {
    #[serde(default)]
    events: Vec<RawEvent>,
}

#[derive(Debug, Default, Deserialize)]
struct InfoBox {
    #[serde(default, rename = "Stadium")]
    stadium: Option<Stadium>,
    #[serde(default, rename = "Referee")]
    referee: Option<RefereeBox>,
    /// Bare number or `{ "number": N }`, depending on the match.
    #[serde(default, rename = "Attendance")]
    attendance: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Stadium {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct RefereeBox {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawEvent {
    #[serde(default)]
    time: u32,
    #[serde(default, rename = "timeStr")]
    time_str: Option<serde_json::Value>,
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default, rename = "eventId")]
    event_id: u64,
    #[serde(default, rename = "isHome")]
    is_home: bool,
    player: Option<EventPlayer>,
    #[serde(default, rename = "nameStr")]
    name_str: String,
    #[serde(default, rename = "fullName")]
    full_name: String,
    #[serde(default, rename = "homeScore")]
    home_score: u32,
    #[serde(default, rename = "awayScore")]
    away_score: u32,
    #[serde(default)]
    card: String,
    #[serde(default)]
    swap: Vec<SwapEntry>,
    #[serde(default, rename = "assistInput")]
    assist_input: String,
}

#[derive(Debug, Deserialize)]
struct EventPlayer {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct SwapEntry {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct StatsBlock {
    #[serde(default)]
    periods: StatPeriods,
}

#[derive(Debug, Default, Deserialize)]
struct StatPeriods {
    #[serde(default)]
    all: StatPeriod,
}

#[derive(Debug, Default, Deserialize)]
struct StatPeriod {
    #[serde(default)]
    stats: Vec<StatCategory>,
}

#[derive(Debug, Default, Deserialize)]
struct StatCategory {
    #[serde(default)]
    stats: Vec<StatItem>,
}

#[derive(Debug, Default, Deserialize)]
struct StatItem {
    #[serde(default)]
    key: String,
    #[serde(default)]
    title: String,
    /// [home, away]; each value is an int, float or string.
    #[serde(default)]
    stats: Vec<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct LineupBlock {
    #[serde(default)]
    lineup: Vec<TeamLineup>,
}

#[derive(Debug, Default, Deserialize)]
struct TeamLineup {
    #[serde(default, rename = "teamId", deserialize_with = "lenient_id")]
    team_id: u64,
    #[serde(default)]
    formation: String,
    /// Starting players grouped by position row.
    #[serde(default)]
    players: Vec<Vec<RawPlayer>>,
    #[serde(default)]
    bench: Vec<RawPlayer>,
}

#[derive(Debug, Deserialize)]
struct RawPlayer {
    #[serde(default, deserialize_with = "lenient_id")]
    id: u64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    shirt: u32,
    #[serde(default)]
    position: String,
    rating: Option<RawRating>,
}

#[derive(Debug, Deserialize)]
struct RawRating {
    #[serde(default)]
    num: String,
}

impl RawPlayer {
    fn to_player(&self) -> PlayerInfo {
        PlayerInfo {
            id: self.id,
            name: self.name.clone(),
            shirt_number: self.shirt,
            position: self.position.clone(),
            rating: self.rating.as_ref().map(|r| r.num.clone()),
        }
    }
}

fn parse_details_response(payload: DetailsResponse) -> MatchDetails {
    let status = payload.header.status.to_status();
    let home_team = payload.general.home_team.to_team();
    let away_team = payload.general.away_team.to_team();

    let summary = Match {
        id: payload.general.match_id,
        league: League {
            id: payload.general.league_id,
            name: payload.general.league_name.clone(),
            country: String::new(),
            country_code: String::new(),
        },
        home_team: home_team.clone(),
        away_team: away_team.clone(),
        status,
        home_score: None,
        away_score: None,
        match_time: payload.header.status.kickoff(),
        live_time: match status {
            MatchStatus::Live => payload
                .header
                .status
                .live_time
                .as_ref()
                .map(|t| t.short.clone()),
            _ => None,
        },
        round: payload.general.round.clone(),
    };

    let mut details = MatchDetails::from_summary(summary);

    if payload.header.teams.len() >= 2 {
        let home = payload.header.teams[0].score;
        let away = payload.header.teams[1].score;
        details.summary.home_score = Some(home);
        details.summary.away_score = Some(away);
        if status == MatchStatus::Finished {
            details.winner = match home.cmp(&away) {
                std::cmp::Ordering::Greater => Some(Side::Home),
                std::cmp::Ordering::Less => Some(Side::Away),
                std::cmp::Ordering::Equal => None,
            };
        }
    }

    let info = &payload.content.match_facts.info_box;
    details.venue = info
        .stadium
        .as_ref()
        .filter(|s| !s.name.is_empty())
        .map(|s| s.name.clone());
    details.referee = info
        .referee
        .as_ref()
        .filter(|r| !r.text.is_empty())
        .map(|r| r.text.clone());
    details.attendance = info.attendance.as_ref().and_then(parse_attendance);

    // The "Half" separator carries the half-time score; anything past the
    // 90th minute means extra time.
    for raw in &payload.content.match_facts.events.events {
        if raw.kind == "Half" && (raw.home_score > 0 || raw.away_score > 0) {
            details.half_time_score = Some(ScorePair {
                home: raw.home_score,
                away: raw.away_score,
            });
        }
        if raw.time > 90 {
            details.extra_time = true;
            details.match_duration = 120;
        }
    }

    details.statistics = parse_statistics(&payload.content.stats);
    parse_lineups(&payload.content.lineup, home_team.id, &mut details);

    let mut events: Vec<MatchEvent> = payload
        .content
        .match_facts
        .events
        .events
        .iter()
        .filter(|raw| raw.kind != "Half")
        .map(|raw| parse_event(raw, &home_team, &away_team))
        .collect();
    events.sort_by_key(|e| e.minute);
    details.events = events;

    details
}

fn parse_event(raw: &RawEvent, home_team: &Team, away_team: &Team) -> MatchEvent {
    let kind = raw.kind.to_lowercase();

    let mut player = raw
        .player
        .as_ref()
        .map(|p| p.name.clone())
        .filter(|n| !n.is_empty())
        .or_else(|| Some(raw.full_name.clone()).filter(|n| !n.is_empty()))
        .or_else(|| Some(raw.name_str.clone()).filter(|n| !n.is_empty()));
    let mut assist = Some(raw.assist_input.clone()).filter(|a| !a.is_empty());

    let detail = if kind == "card" && !raw.card.is_empty() {
        Some(raw.card.to_lowercase())
    } else if kind == "substitution" && raw.swap.len() >= 2 {
        // swap[0] comes in, swap[1] goes out; the outgoing player lands in
        // `player`, the incoming one in `assist`.
        player = Some(raw.swap[1].name.clone());
        assist = Some(raw.swap[0].name.clone());
        Some("sub".to_string())
    } else if kind == "addedtime" {
        // The added-minutes count hides in whichever field is populated.
        let label = raw
            .time_str
            .as_ref()
            .and_then(|v| match v {
                serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .or_else(|| Some(raw.name_str.clone()).filter(|s| !s.is_empty()))
            .or_else(|| raw.player.as_ref().map(|p| p.name.clone()).filter(|s| !s.is_empty()));
        player = label;
        Some("addedtime".to_string())
    } else {
        None
    };

    MatchEvent {
        id: raw.event_id,
        minute: raw.time,
        kind,
        team: if raw.is_home {
            home_team.clone()
        } else {
            away_team.clone()
        },
        player,
        assist,
        detail,
    }
}

fn parse_attendance(value: &serde_json::Value) -> Option<u32> {
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).ok();
    }
    value.get("number").and_then(|n| n.as_u64()).and_then(|n| u32::try_from(n).ok())
}

fn parse_statistics(block: &StatsBlock) -> Vec<StatRow> {
    let mut rows = Vec::new();
    for category in &block.periods.all.stats {
        for item in &category.stats {
            if item.stats.len() < 2 {
                continue;
            }
            let home_value = format_stat_value(&item.stats[0]);
            let away_value = format_stat_value(&item.stats[1]);
            if home_value.is_empty() && away_value.is_empty() {
                continue;
            }
            rows.push(StatRow {
                key: item.key.clone(),
                label: item.title.clone(),
                home_value,
                away_value,
            });
        }
    }
    rows
}

fn format_stat_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(f) = n.as_f64() {
                format!("{:.1}", f)
            } else {
                String::new()
            }
        }
        _ => String::new(),
    }
}

fn parse_lineups(block: &LineupBlock, home_team_id: u64, details: &mut MatchDetails) {
    for lineup in &block.lineup {
        let is_home = lineup.team_id == home_team_id;

        let starting: Vec<PlayerInfo> = lineup
            .players
            .iter()
            .flatten()
            .map(RawPlayer::to_player)
            .collect();
        let bench: Vec<PlayerInfo> = lineup.bench.iter().map(RawPlayer::to_player).collect();
        let formation = Some(lineup.formation.clone()).filter(|f| !f.is_empty());

        if is_home {
            details.home_formation = formation;
            details.home_starting = starting;
            details.home_bench = bench;
        } else {
            details.away_formation = formation;
            details.away_starting = starting;
            details.away_bench = bench;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_utc_time_formats() {
        assert!(parse_utc_time("2025-03-10T20:00:00Z").is_some());
        assert!(parse_utc_time("2025-03-10T20:00:00.000Z").is_some());
        assert!(parse_utc_time("2025-03-10T20:00:00+01:00").is_some());
        assert!(parse_utc_time("2025-03-10 20:00:00").is_some());
        assert!(parse_utc_time("not a time").is_none());
        assert!(parse_utc_time("").is_none());
    }

    #[test]
    fn test_league_response_string_ids_and_fallback_league() {
        let payload: LeagueResponse = serde_json::from_str(
            r#"{
                "details": {"id": 47, "name": "Premier League", "country": "England", "countryCode": "ENG"},
                "fixtures": {"allMatches": [
                    {
                        "id": "4193490",
                        "round": "28",
                        "home": {"id": "8455", "name": "Chelsea", "shortName": "CHE"},
                        "away": {"id": "9825", "name": "Arsenal"},
                        "status": {
                            "utcTime": "2025-03-10T20:00:00.000Z",
                            "started": true,
                            "finished": false,
                            "liveTime": {"short": "45+2"},
                            "score": {"home": 1, "away": 0}
                        }
                    }
                ]}
            }"#,
        )
        .unwrap();

        let matches = parse_league_response(payload);
        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert_eq!(m.id, 4193490);
        assert_eq!(m.league.id, 47);
        assert_eq!(m.league.name, "Premier League");
        assert_eq!(m.home_team.id, 8455);
        assert_eq!(m.home_team.short_name, "CHE");
        // Missing shortName falls back to the full name.
        assert_eq!(m.away_team.short_name, "Arsenal");
        assert_eq!(m.status, MatchStatus::Live);
        assert_eq!(m.live_time.as_deref(), Some("45+2"));
        assert_eq!(m.home_score, Some(1));
        assert_eq!(m.away_score, Some(0));
        assert!(m.match_time.is_some());
    }

    #[test]
    fn test_status_from_nullable_booleans() {
        let not_started: RawStatus = serde_json::from_str(r#"{"utcTime": null}"#).unwrap();
        assert_eq!(not_started.to_status(), MatchStatus::NotStarted);

        let cancelled: RawStatus =
            serde_json::from_str(r#"{"cancelled": true, "started": true}"#).unwrap();
        assert_eq!(cancelled.to_status(), MatchStatus::Cancelled);

        let finished: RawStatus =
            serde_json::from_str(r#"{"finished": true, "started": true}"#).unwrap();
        assert_eq!(finished.to_status(), MatchStatus::Finished);
    }

    fn details_payload() -> DetailsResponse {
        serde_json::from_str(
            r#"{
                "header": {
                    "teams": [
                        {"id": 8455, "name": "Chelsea", "score": 2},
                        {"id": 9825, "name": "Arsenal", "score": 1}
                    ],
                    "status": {"utcTime": "2025-03-10T20:00:00Z", "finished": true, "started": true}
                },
                "general": {
                    "matchId": "4193490",
                    "matchRound": "28",
                    "homeTeam": {"id": 8455, "name": "Chelsea"},
                    "awayTeam": {"id": 9825, "name": "Arsenal"},
                    "leagueId": 47,
                    "leagueName": "Premier League"
                },
                "content": {
                    "matchFacts": {
                        "events": {"events": [
                            {"time": 23, "type": "Goal", "eventId": 101, "isHome": true,
                             "player": {"name": "Palmer"}, "assistInput": "Jackson",
                             "homeScore": 1, "awayScore": 0},
                            {"time": 45, "type": "Half", "eventId": 0, "isHome": false,
                             "homeScore": 1, "awayScore": 0},
                            {"time": 61, "type": "Card", "eventId": 102, "isHome": false,
                             "player": {"name": "Rice"}, "card": "Yellow",
                             "homeScore": 1, "awayScore": 0},
                            {"time": 70, "type": "Substitution", "eventId": 103, "isHome": true,
                             "swap": [{"name": "Madueke"}, {"name": "Neto"}],
                             "homeScore": 1, "awayScore": 0}
                        ]},
                        "infoBox": {
                            "Stadium": {"name": "Stamford Bridge"},
                            "Referee": {"text": "M. Oliver"},
                            "Attendance": {"number": 40053}
                        }
                    },
                    "stats": {"periods": {"all": {"stats": [
                        {"title": "Top stats", "stats": [
                            {"key": "possession", "title": "Ball possession", "stats": [55, 45]},
                            {"key": "xg", "title": "Expected goals", "stats": [1.4, 0.9]},
                            {"key": "empty", "title": "Empty", "stats": []}
                        ]}
                    ]}}},
                    "lineup": {"lineup": [
                        {"teamId": 8455, "formation": "4-2-3-1",
                         "players": [[{"id": 1, "name": "Sanchez", "shirt": 1, "position": "GK",
                                       "rating": {"num": "7.2"}}]],
                         "bench": [{"id": 2, "name": "Jorgensen", "shirt": 12}]},
                        {"teamId": 9825, "formation": "4-3-3", "players": [], "bench": []}
                    ]}
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_details_header_scores_and_winner() {
        let d = parse_details_response(details_payload());
        assert_eq!(d.summary.id, 4193490);
        assert_eq!(d.summary.status, MatchStatus::Finished);
        assert_eq!(d.summary.home_score, Some(2));
        assert_eq!(d.summary.away_score, Some(1));
        assert_eq!(d.winner, Some(Side::Home));
        assert_eq!(d.venue.as_deref(), Some("Stamford Bridge"));
        assert_eq!(d.referee.as_deref(), Some("M. Oliver"));
        assert_eq!(d.attendance, Some(40053));
        assert_eq!(d.half_time_score, Some(ScorePair { home: 1, away: 0 }));
        assert_eq!(d.match_duration, 90);
        assert!(!d.extra_time);
    }

    #[test]
    fn test_details_events_normalized_and_sorted() {
        let d = parse_details_response(details_payload());
        // The "Half" separator is not an event.
        assert_eq!(d.events.len(), 3);
        assert!(d.events.windows(2).all(|w| w[0].minute <= w[1].minute));

        let goal = &d.events[0];
        assert_eq!(goal.kind, "goal");
        assert_eq!(goal.player.as_deref(), Some("Palmer"));
        assert_eq!(goal.assist.as_deref(), Some("Jackson"));
        assert_eq!(goal.team.id, 8455);

        let card = &d.events[1];
        assert_eq!(card.kind, "card");
        assert_eq!(card.detail.as_deref(), Some("yellow"));
        assert_eq!(card.team.id, 9825);

        let sub = &d.events[2];
        assert_eq!(sub.kind, "substitution");
        assert_eq!(sub.player.as_deref(), Some("Neto"));
        assert_eq!(sub.assist.as_deref(), Some("Madueke"));
        assert_eq!(sub.detail.as_deref(), Some("sub"));
    }

    #[test]
    fn test_details_statistics_and_lineups() {
        let d = parse_details_response(details_payload());
        assert_eq!(d.statistics.len(), 2);
        assert_eq!(d.statistics[0].home_value, "55");
        assert_eq!(d.statistics[1].home_value, "1.4");

        assert_eq!(d.home_formation.as_deref(), Some("4-2-3-1"));
        assert_eq!(d.home_starting.len(), 1);
        assert_eq!(d.home_starting[0].rating.as_deref(), Some("7.2"));
        assert_eq!(d.home_bench.len(), 1);
        assert_eq!(d.away_formation.as_deref(), Some("4-3-3"));
    }

    #[test]
    fn test_attendance_accepts_bare_number() {
        let v = serde_json::json!(31422);
        assert_eq!(parse_attendance(&v), Some(31422));
        let obj = serde_json::json!({"number": 500});
        assert_eq!(parse_attendance(&obj), Some(500));
        let junk = serde_json::json!("n/a");
        assert_eq!(parse_attendance(&junk), None);
    }

    #[test]
    fn test_extra_time_detected_from_late_events() {
        let mut payload = details_payload();
        payload.content.match_facts.events.events.push(RawEvent {
            time: 105,
            kind: "Goal".into(),
            event_id: 200,
            is_home: true,
            ..Default::default()
        });
        let d = parse_details_response(payload);
        assert!(d.extra_time);
        assert_eq!(d.match_duration, 120);
    }
}
