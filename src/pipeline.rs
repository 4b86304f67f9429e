//! Assembles the match board: manual and feed matches, predicted and ordered.

use crate::config::OddsConfig;
use crate::engine::matcher::{self, LiveEvent};
use crate::engine::types::{Match, MatchStatus};
use crate::engine::Predictor;
use crate::store::ManualMatch;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::HashSet;

/// Where the board's matches came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardSource {
    Manual,
    Feed,
    Mixed,
    Empty,
}

impl BoardSource {
    fn from_counts(manual: usize, fed: usize) -> Self {
        match (manual > 0, fed > 0) {
            (true, true) => BoardSource::Mixed,
            (true, false) => BoardSource::Manual,
            (false, true) => BoardSource::Feed,
            (false, false) => BoardSource::Empty,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BoardSource::Manual => "manual",
            BoardSource::Feed => "feed",
            BoardSource::Mixed => "mixed",
            BoardSource::Empty => "empty",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchBoard {
    pub matches: Vec<Match>,
    pub updated_at: DateTime<Utc>,
    pub source: BoardSource,
    pub count: usize,
    pub live_count: usize,
    pub upcoming_count: usize,
    pub high_conf_count: usize,
    pub leagues: Vec<String>,
}

impl MatchBoard {
    /// Patch live scores in place, re-predicting and re-ordering when any changed.
    pub fn apply_live_scores(
        &mut self,
        events: &[LiveEvent],
        predictor: &Predictor,
        high_confidence: u8,
    ) -> usize {
        let changed = matcher::apply_live_scores(&mut self.matches, events, predictor);
        if changed > 0 {
            sort_board(&mut self.matches);
            self.high_conf_count = count_high_conf(&self.matches, high_confidence);
        }
        changed
    }
}

fn sort_board(matches: &mut [Match]) {
    matches.sort_by_key(|m| (m.status.sort_rank(), Reverse(m.confidence())));
}

fn count_high_conf(matches: &[Match], high_confidence: u8) -> usize {
    matches
        .iter()
        .filter(|m| m.confidence() >= high_confidence)
        .count()
}

/// Merge manual entries with fed matches, predict every match, then order
/// live before upcoming before finished and by confidence within a status.
///
/// A fed match whose id collides with a manual entry is dropped.
pub fn build_board(
    manual: &[ManualMatch],
    fed: Vec<Match>,
    predictor: &Predictor,
    odds: &OddsConfig,
    high_confidence: u8,
    now: DateTime<Utc>,
) -> MatchBoard {
    let mut matches: Vec<Match> = manual.iter().map(|m| m.to_match(now, odds)).collect();
    let manual_count = matches.len();

    let mut seen: HashSet<String> = matches.iter().map(|m| m.id.clone()).collect();
    let mut fed_count = 0;
    for m in fed {
        if seen.insert(m.id.clone()) {
            matches.push(m);
            fed_count += 1;
        } else {
            tracing::debug!(id = %m.id, "dropping fed match that shadows a manual entry");
        }
    }

    predictor.attach(&mut matches);
    sort_board(&mut matches);

    let mut leagues: Vec<String> = Vec::new();
    for m in &matches {
        if !leagues.contains(&m.league) {
            leagues.push(m.league.clone());
        }
    }

    let count_status = |s: MatchStatus| matches.iter().filter(|m| m.status == s).count();
    let live_count = count_status(MatchStatus::Live);
    let upcoming_count = count_status(MatchStatus::Upcoming);
    let high_conf_count = count_high_conf(&matches, high_confidence);

    MatchBoard {
        count: matches.len(),
        live_count,
        upcoming_count,
        high_conf_count,
        leagues,
        source: BoardSource::from_counts(manual_count, fed_count),
        updated_at: now,
        matches,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::Score;
    use crate::store::ManualStatus;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn manual(id: &str, p1: &str, p2: &str, league: &str, status: ManualStatus) -> ManualMatch {
        ManualMatch {
            id: id.to_string(),
            player1: p1.to_string(),
            player2: p2.to_string(),
            league: league.to_string(),
            status,
            score: match status {
                ManualStatus::Live => Some(Score::new(1, 0)),
                ManualStatus::Upcoming => None,
            },
        }
    }

    fn finished(id: &str, league: &str) -> Match {
        let mut m = manual(id, "Finn A.", "Finn B.", league, ManualStatus::Upcoming)
            .to_match(now(), &OddsConfig::default());
        m.status = MatchStatus::Finished;
        m.score = Some(Score::new(3, 1));
        m
    }

    #[test]
    fn test_empty_board() {
        let board = build_board(&[], Vec::new(), &Predictor::default(), &OddsConfig::default(), 75, now());
        assert_eq!(board.source, BoardSource::Empty);
        assert_eq!(board.count, 0);
        assert!(board.leagues.is_empty());
        assert_eq!(board.updated_at, now());
    }

    #[test]
    fn test_board_orders_by_status_then_confidence() {
        let entries = vec![
            manual("1", "Ivanov A.", "Petrov D.", "Liga Pro Russia", ManualStatus::Upcoming),
            manual("2", "Sidorov K.", "Orlov M.", "Setka Cup", ManualStatus::Live),
            manual("3", "Kuznetsov V.", "Popov N.", "Liga Pro Russia", ManualStatus::Upcoming),
        ];
        let fed = vec![finished("f1", "TT Cup")];
        let board = build_board(&entries, fed, &Predictor::default(), &OddsConfig::default(), 75, now());

        assert_eq!(board.source, BoardSource::Mixed);
        assert_eq!(board.count, 4);
        assert_eq!(board.live_count, 1);
        assert_eq!(board.upcoming_count, 2);
        assert!(board.matches.iter().all(|m| m.prediction.is_some()));

        let statuses: Vec<MatchStatus> = board.matches.iter().map(|m| m.status).collect();
        assert_eq!(
            statuses,
            vec![
                MatchStatus::Live,
                MatchStatus::Upcoming,
                MatchStatus::Upcoming,
                MatchStatus::Finished
            ]
        );
        assert!(board.matches[1].confidence() >= board.matches[2].confidence());

        // First-seen order after sorting.
        assert_eq!(board.leagues[0], "Setka Cup");
        assert_eq!(board.leagues.len(), 3);
        assert_eq!(board.leagues.last().map(String::as_str), Some("TT Cup"));
    }

    #[test]
    fn test_high_conf_count_uses_threshold() {
        let entries = vec![
            manual("1", "Ivanov A.", "Petrov D.", "Liga Pro Russia", ManualStatus::Live),
            manual("2", "Sidorov K.", "Orlov M.", "Setka Cup", ManualStatus::Upcoming),
        ];
        let all = build_board(&entries, Vec::new(), &Predictor::default(), &OddsConfig::default(), 0, now());
        assert_eq!(all.high_conf_count, 2);
        let none = build_board(&entries, Vec::new(), &Predictor::default(), &OddsConfig::default(), 97, now());
        assert_eq!(none.high_conf_count, 0);
        assert_eq!(all.source, BoardSource::Manual);
    }

    #[test]
    fn test_fed_duplicate_of_manual_is_dropped() {
        let entries = vec![manual("dup", "Ivanov A.", "Petrov D.", "Liga Pro Russia", ManualStatus::Upcoming)];
        let fed = vec![finished("dup", "TT Cup"), finished("other", "TT Cup")];
        let board = build_board(&entries, fed, &Predictor::default(), &OddsConfig::default(), 75, now());
        assert_eq!(board.count, 2);
        let dup = board.matches.iter().find(|m| m.id == "dup").unwrap();
        assert_eq!(dup.league, "Liga Pro Russia");
    }

    #[test]
    fn test_apply_live_scores_updates_board() {
        let entries = vec![manual("1", "Ivanov Alexey", "Petrov Dmitry", "Liga Pro Russia", ManualStatus::Live)];
        let predictor = Predictor::default();
        let mut board = build_board(&entries, Vec::new(), &predictor, &OddsConfig::default(), 75, now());
        let events = vec![LiveEvent {
            id: "ev".to_string(),
            home: "Petrov Dmitry".to_string(),
            away: "Ivanov Alexey".to_string(),
            score: Score::new(2, 0),
            league: "Liga Pro".to_string(),
        }];
        assert_eq!(board.apply_live_scores(&events, &predictor, 75), 1);
        assert_eq!(board.matches[0].score, Some(Score::new(0, 2)));
        assert_eq!(
            board.matches[0].prediction.as_ref(),
            Some(&predictor.predict(&board.matches[0]))
        );
        // Same score again is not a change.
        assert_eq!(board.apply_live_scores(&events, &predictor, 75), 0);
    }

    #[test]
    fn test_feed_only_source() {
        let board = build_board(&[], vec![finished("f1", "TT Cup")], &Predictor::default(), &OddsConfig::default(), 75, now());
        assert_eq!(board.source, BoardSource::Feed);
        assert_eq!(board.source.as_str(), "feed");
    }
}
