//! Event diffing and formatting for live updates.
//!
//! Pure functions: the poller feeds successive details payloads through
//! [`new_events`] to find what changed, and the presentation layer renders
//! the output of [`parse_events`]. The symbol prefix on each line is a
//! stable contract the renderer keys its colors on.

use std::collections::HashSet;

use crate::models::{MatchEvent, Team};

/// Goals.
pub const PREFIX_GOAL: &str = "●";
/// Yellow cards.
pub const PREFIX_YELLOW_CARD: &str = "▪";
/// Red cards (including second yellows).
pub const PREFIX_RED_CARD: &str = "■";
/// Substitutions.
pub const PREFIX_SUBSTITUTION: &str = "↔";
/// Anything else.
pub const PREFIX_OTHER: &str = "·";

/// Events present in `new` but not in `old`, keyed by event id.
///
/// Idempotent: diffing a list against itself yields nothing, so a poll that
/// returns unchanged data produces no updates.
pub fn new_events(old: &[MatchEvent], new: &[MatchEvent]) -> Vec<MatchEvent> {
    let seen: HashSet<u64> = old.iter().map(|e| e.id).collect();
    new.iter()
        .filter(|e| !seen.contains(&e.id))
        .cloned()
        .collect()
}

/// Format events as one line each, most recent first.
pub fn parse_events(events: &[MatchEvent], home: &Team, away: &Team) -> Vec<String> {
    let mut sorted = events.to_vec();
    sorted.sort_by(|a, b| b.minute.cmp(&a.minute));
    sorted
        .iter()
        .map(|e| format_event(e, home, away))
        .collect()
}

fn team_label(event: &MatchEvent, home: &Team, away: &Team) -> String {
    if !event.team.short_name.is_empty() {
        return event.team.short_name.clone();
    }
    if event.team.id == home.id {
        home.short_name.clone()
    } else {
        away.short_name.clone()
    }
}

fn format_event(event: &MatchEvent, home: &Team, away: &Team) -> String {
    let team = team_label(event, home, away);
    let player = event.player.as_deref().unwrap_or("Unknown");

    match event.kind.as_str() {
        "goal" => {
            let assist = match event.assist.as_deref() {
                Some(a) if !a.is_empty() => format!(" ({})", a),
                _ => String::new(),
            };
            format!(
                "{} {}' [GOAL] {}{} - {}",
                PREFIX_GOAL, event.minute, player, assist, team
            )
        }
        "card" => {
            let prefix = match event.detail.as_deref() {
                Some("red") | Some("redcard") | Some("secondyellow") => PREFIX_RED_CARD,
                _ => PREFIX_YELLOW_CARD,
            };
            format!("{} {}' [CARD] {} - {}", prefix, event.minute, player, team)
        }
        "substitution" => {
            // Outgoing player in `player`, incoming in `assist`.
            let incoming = event.assist.as_deref().unwrap_or("Unknown");
            format!(
                "{} {}' [SUB] {} → {} - {}",
                PREFIX_SUBSTITUTION, event.minute, player, incoming, team
            )
        }
        _ => {
            let label = match event.player.as_deref() {
                Some(p) if !p.is_empty() => p,
                _ => event.kind.as_str(),
            };
            format!("{} {}' {} - {}", PREFIX_OTHER, event.minute, label, team)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(id: u64, short: &str) -> Team {
        Team {
            id,
            name: short.to_string(),
            short_name: short.to_string(),
        }
    }

    fn event(id: u64, minute: u32, kind: &str, team: Team) -> MatchEvent {
        MatchEvent {
            id,
            minute,
            kind: kind.to_string(),
            team,
            player: None,
            assist: None,
            detail: None,
        }
    }

    #[test]
    fn test_diff_is_idempotent() {
        let home = team(1, "HOM");
        let events = vec![
            event(10, 12, "goal", home.clone()),
            event(11, 34, "card", home),
        ];
        assert!(new_events(&events, &events).is_empty());
    }

    #[test]
    fn test_diff_returns_only_unseen_ids() {
        let home = team(1, "HOM");
        let old = vec![event(10, 12, "goal", home.clone())];
        let new = vec![
            event(10, 12, "goal", home.clone()),
            event(11, 78, "goal", home),
        ];
        let diff = new_events(&old, &new);
        assert_eq!(diff.len(), 1);
        assert_eq!(diff[0].id, 11);
    }

    #[test]
    fn test_diff_of_empty_old_returns_everything() {
        let home = team(1, "HOM");
        let new = vec![event(1, 5, "goal", home.clone()), event(2, 9, "card", home)];
        assert_eq!(new_events(&[], &new).len(), 2);
    }

    #[test]
    fn test_events_sorted_most_recent_first() {
        let home = team(1, "HOM");
        let away = team(2, "AWY");
        let events = vec![
            event(1, 12, "goal", home.clone()),
            event(2, 78, "goal", home.clone()),
            event(3, 45, "card", home.clone()),
        ];
        let lines = parse_events(&events, &home, &away);
        assert!(lines[0].starts_with("● 78'"));
        assert!(lines[1].starts_with("▪ 45'"));
        assert!(lines[2].starts_with("● 12'"));
    }

    #[test]
    fn test_goal_with_and_without_assist() {
        let home = team(1, "HOM");
        let away = team(2, "AWY");

        let mut with_assist = event(1, 23, "goal", home.clone());
        with_assist.player = Some("B. Fernandes".into());
        with_assist.assist = Some("A. Garnacho".into());

        let mut solo = event(2, 40, "goal", home.clone());
        solo.player = Some("Casemiro".into());

        let lines = parse_events(&[with_assist, solo], &home, &away);
        assert_eq!(lines[0], "● 40' [GOAL] Casemiro - HOM");
        assert_eq!(lines[1], "● 23' [GOAL] B. Fernandes (A. Garnacho) - HOM");
    }

    #[test]
    fn test_card_symbol_follows_color() {
        let home = team(1, "HOM");
        let away = team(2, "AWY");

        let mut yellow = event(1, 30, "card", home.clone());
        yellow.player = Some("Rice".into());
        yellow.detail = Some("yellow".into());

        let mut red = event(2, 60, "card", home.clone());
        red.player = Some("Partey".into());
        red.detail = Some("red".into());

        let mut second_yellow = event(3, 75, "card", home.clone());
        second_yellow.player = Some("Saliba".into());
        second_yellow.detail = Some("secondyellow".into());

        let lines = parse_events(&[yellow, red, second_yellow], &home, &away);
        assert_eq!(lines[0], "■ 75' [CARD] Saliba - HOM");
        assert_eq!(lines[1], "■ 60' [CARD] Partey - HOM");
        assert_eq!(lines[2], "▪ 30' [CARD] Rice - HOM");
    }

    #[test]
    fn test_substitution_shows_out_then_in() {
        let home = team(1, "HOM");
        let away = team(2, "AWY");

        let mut sub = event(1, 65, "substitution", away.clone());
        sub.player = Some("Nunez".into());
        sub.assist = Some("Jota".into());
        sub.detail = Some("sub".into());

        let lines = parse_events(&[sub], &home, &away);
        assert_eq!(lines[0], "↔ 65' [SUB] Nunez → Jota - AWY");
    }

    #[test]
    fn test_unknown_kind_falls_back_to_label() {
        let home = team(1, "HOM");
        let away = team(2, "AWY");

        let var_check = event(1, 55, "var", home.clone());
        let lines = parse_events(&[var_check], &home, &away);
        assert_eq!(lines[0], "· 55' var - HOM");
    }

    #[test]
    fn test_team_resolved_by_id_when_label_missing() {
        let home = team(1, "HOM");
        let away = team(2, "AWY");

        let mut e = event(1, 10, "goal", team(2, ""));
        e.player = Some("Salah".into());
        let lines = parse_events(&[e], &home, &away);
        assert_eq!(lines[0], "● 10' [GOAL] Salah - AWY");

        let mut unknown_team = event(2, 20, "goal", team(99, ""));
        unknown_team.player = Some("Ghost".into());
        let lines = parse_events(&[unknown_team], &home, &away);
        // Unmatched ids resolve to the away side, same as the upstream
        // parser's two-way fallback.
        assert_eq!(lines[0], "● 20' [GOAL] Ghost - AWY");
    }
}
