//! Canned fixture feed for offline use.
//!
//! Substituted for the network feed when the mock-data flag is set. It
//! implements the same `FixtureFeed` trait, so the aggregator, caches and
//! pollers exercise their real code paths against deterministic data.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};

use super::{FixtureFeed, Tab};
use crate::models::{
    League, Match, MatchDetails, MatchEvent, MatchStatus, ScorePair, Team,
};

pub struct MockFeed;

fn league(id: u32, name: &str, country: &str, code: &str) -> League {
    League {
        id,
        name: name.into(),
        country: country.into(),
        country_code: code.into(),
    }
}

fn team(id: u64, name: &str, short: &str) -> Team {
    Team {
        id,
        name: name.into(),
        short_name: short.into(),
    }
}

impl MockFeed {
    /// All canned matches, kickoff times anchored to "now" so that date
    /// filtering and live detection behave like the real feed.
    fn all_matches() -> Vec<Match> {
        let now = Utc::now();
        let premier = league(47, "Premier League", "England", "ENG");
        let laliga = league(87, "LaLiga", "Spain", "ESP");

        vec![
            // In progress, second half.
            Match {
                id: 1001,
                league: premier.clone(),
                home_team: team(10, "Manchester United", "MUN"),
                away_team: team(11, "Liverpool", "LIV"),
                status: MatchStatus::Live,
                home_score: Some(1),
                away_score: Some(2),
                match_time: Some(now - Duration::minutes(70)),
                live_time: Some("68'".into()),
                round: "Round 28".into(),
            },
            // In progress, first half.
            Match {
                id: 1002,
                league: laliga.clone(),
                home_team: team(20, "Real Madrid", "RMA"),
                away_team: team(21, "Barcelona", "BAR"),
                status: MatchStatus::Live,
                home_score: Some(0),
                away_score: Some(0),
                match_time: Some(now - Duration::minutes(30)),
                live_time: Some("28'".into()),
                round: "Round 27".into(),
            },
            // Finished earlier today.
            Match {
                id: 1003,
                league: premier.clone(),
                home_team: team(12, "Arsenal", "ARS"),
                away_team: team(13, "Chelsea", "CHE"),
                status: MatchStatus::Finished,
                home_score: Some(3),
                away_score: Some(2),
                match_time: Some(now - Duration::hours(5)),
                live_time: None,
                round: "Round 28".into(),
            },
            // Kickoff later today.
            Match {
                id: 1004,
                league: laliga,
                home_team: team(22, "Atletico Madrid", "ATM"),
                away_team: team(23, "Sevilla", "SEV"),
                status: MatchStatus::NotStarted,
                home_score: None,
                away_score: None,
                match_time: Some(now + Duration::hours(3)),
                live_time: None,
                round: "Round 27".into(),
            },
        ]
    }
}

#[async_trait]
impl FixtureFeed for MockFeed {
    fn name(&self) -> &str {
        "mock"
    }

    async fn league_fixtures(&self, competition_id: u32, tab: Tab) -> Result<Vec<Match>> {
        Ok(Self::all_matches()
            .into_iter()
            .filter(|m| m.league.id == competition_id)
            .filter(|m| match tab {
                // Live and upcoming matches live on the fixtures tab.
                Tab::Fixtures => m.status != MatchStatus::Finished,
                Tab::Results => m.status == MatchStatus::Finished,
            })
            .collect())
    }

    async fn match_details(&self, match_id: u64) -> Result<MatchDetails> {
        let summary = Self::all_matches()
            .into_iter()
            .find(|m| m.id == match_id)
            .unwrap_or_else(|| {
                let mut matches = Self::all_matches();
                let mut m = matches.remove(0);
                m.id = match_id;
                m
            });

        let home = summary.home_team.clone();
        let away = summary.away_team.clone();
        let mut details = MatchDetails::from_summary(summary);

        details.venue = Some("Estadio da Luz".into());
        details.half_time_score = Some(ScorePair { home: 1, away: 1 });
        details.events = vec![
            MatchEvent {
                id: 1,
                minute: 12,
                kind: "goal".into(),
                team: home.clone(),
                player: Some("B. Fernandes".into()),
                assist: Some("A. Garnacho".into()),
                detail: None,
            },
            MatchEvent {
                id: 2,
                minute: 34,
                kind: "goal".into(),
                team: away.clone(),
                player: Some("M. Salah".into()),
                assist: None,
                detail: None,
            },
            MatchEvent {
                id: 3,
                minute: 41,
                kind: "card".into(),
                team: home,
                player: Some("Casemiro".into()),
                assist: None,
                detail: Some("yellow".into()),
            },
            MatchEvent {
                id: 4,
                minute: 57,
                kind: "goal".into(),
                team: away,
                player: Some("D. Nunez".into()),
                assist: Some("M. Salah".into()),
                detail: None,
            },
        ];

        Ok(details)
    }
}
