//! Prediction accuracy, streak and ROI over match history.

use super::types::{BetTier, Match};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashMap;

const MAX_DAILY_ROWS: usize = 30;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierCounts {
    pub strong: u32,
    pub medium: u32,
    pub risky: u32,
    pub skip: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueStats {
    pub league: String,
    pub total: u32,
    pub correct: u32,
    pub win_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    pub date: NaiveDate,
    pub total: u32,
    pub correct: u32,
    pub win_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    /// Finished matches with a prediction and a decisive final score.
    pub total: u32,
    pub correct: u32,
    pub incorrect: u32,
    /// Predicted matches that have not produced a result yet. A finished
    /// match with a tied or missing score also counts here.
    pub pending: u32,
    pub win_rate: f64,
    pub streak: u32,
    pub avg_odds: f64,
    /// Display ROI, floored at zero.
    pub roi: f64,
    pub roi_signed: f64,
    pub tier_counts: TierCounts,
    pub by_league: Vec<LeagueStats>,
    pub daily: Vec<DailyStats>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    All,
    Today,
    Week,
    Month,
}

impl Period {
    pub fn parse(s: &str) -> Option<Period> {
        match s.trim().to_lowercase().as_str() {
            "all" => Some(Period::All),
            "today" => Some(Period::Today),
            "week" => Some(Period::Week),
            "month" => Some(Period::Month),
            _ => None,
        }
    }

    fn lookback(self) -> Option<Duration> {
        match self {
            Period::All => None,
            Period::Today => Some(Duration::days(1)),
            Period::Week => Some(Duration::days(7)),
            Period::Month => Some(Duration::days(30)),
        }
    }

    pub fn contains(self, start_time: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self.lookback() {
            None => true,
            Some(window) => start_time >= now - window,
        }
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn rate(correct: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round1(correct as f64 / total as f64 * 100.0)
}

/// A match that counts towards accuracy: predicted winner and actual winner.
struct Graded<'a> {
    m: &'a Match,
    correct: bool,
}

pub fn aggregate(matches: &[Match]) -> Statistics {
    let mut tier_counts = TierCounts::default();
    let mut pending = 0u32;
    let mut graded: Vec<Graded> = Vec::new();

    for m in matches {
        let Some(prediction) = &m.prediction else { continue };
        match prediction.bet_tier {
            BetTier::Strong => tier_counts.strong += 1,
            BetTier::Medium => tier_counts.medium += 1,
            BetTier::Risky => tier_counts.risky += 1,
            BetTier::Skip => tier_counts.skip += 1,
        }
        match m.actual_winner() {
            Some(actual) => graded.push(Graded {
                m,
                correct: actual == prediction.winner,
            }),
            None => pending += 1,
        }
    }

    // Most recent first; stable so equal start times keep input order.
    graded.sort_by(|a, b| b.m.start_time.cmp(&a.m.start_time));

    let total = graded.len() as u32;
    let correct = graded.iter().filter(|g| g.correct).count() as u32;
    let streak = graded.iter().take_while(|g| g.correct).count() as u32;

    let (avg_odds, win_rate, roi_signed) = if total == 0 {
        (0.0, 0.0, 0.0)
    } else {
        let odds_sum: f64 = graded
            .iter()
            .filter_map(|g| {
                g.m.prediction
                    .as_ref()
                    .map(|p| g.m.odds.for_side(p.winner))
            })
            .sum();
        let avg_odds = round2(odds_sum / total as f64);
        let win_rate = rate(correct, total);
        let roi = round1((avg_odds * win_rate / 100.0 - 1.0) * 100.0);
        (avg_odds, win_rate, roi)
    };

    Statistics {
        total,
        correct,
        incorrect: total - correct,
        pending,
        win_rate,
        streak,
        avg_odds,
        roi: roi_signed.max(0.0),
        roi_signed,
        tier_counts,
        by_league: by_league(&graded),
        daily: daily(&graded),
    }
}

/// Aggregate only matches whose start time falls inside `period`.
pub fn aggregate_period(matches: &[Match], period: Period, now: DateTime<Utc>) -> Statistics {
    let scoped: Vec<Match> = matches
        .iter()
        .filter(|m| period.contains(m.start_time, now))
        .cloned()
        .collect();
    aggregate(&scoped)
}

fn by_league(graded: &[Graded]) -> Vec<LeagueStats> {
    let mut order: Vec<&str> = Vec::new();
    let mut tally: HashMap<&str, (u32, u32)> = HashMap::new();
    for g in graded {
        let league = g.m.league.as_str();
        let entry = tally.entry(league).or_insert_with(|| {
            order.push(league);
            (0, 0)
        });
        entry.0 += 1;
        if g.correct {
            entry.1 += 1;
        }
    }

    let mut rows: Vec<LeagueStats> = order
        .into_iter()
        .map(|league| {
            let (total, correct) = tally[league];
            LeagueStats {
                league: league.to_string(),
                total,
                correct,
                win_rate: rate(correct, total),
            }
        })
        .collect();
    rows.sort_by(|a, b| b.correct.cmp(&a.correct).then_with(|| a.league.cmp(&b.league)));
    rows
}

fn daily(graded: &[Graded]) -> Vec<DailyStats> {
    let mut tally: HashMap<NaiveDate, (u32, u32)> = HashMap::new();
    for g in graded {
        let entry = tally.entry(g.m.start_time.date_naive()).or_insert((0, 0));
        entry.0 += 1;
        if g.correct {
            entry.1 += 1;
        }
    }

    let mut rows: Vec<DailyStats> = tally
        .into_iter()
        .map(|(date, (total, correct))| DailyStats {
            date,
            total,
            correct,
            win_rate: rate(correct, total),
        })
        .collect();
    rows.sort_by(|a, b| b.date.cmp(&a.date));
    rows.truncate(MAX_DAILY_ROWS);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::synthetic::synthetic_player;
    use crate::engine::types::{MatchStatus, Odds, Prediction, Score, Side};
    use chrono::TimeZone;

    fn finished(id: &str, hour: u32, predicted: Side, score: (u32, u32), odds: (f64, f64)) -> Match {
        Match {
            id: id.to_string(),
            player1: synthetic_player("", "Ivanov A.", "RU"),
            player2: synthetic_player("", "Petrov D.", "RU"),
            start_time: Utc.with_ymd_and_hms(2026, 3, 1, hour, 0, 0).unwrap(),
            status: MatchStatus::Finished,
            score: Some(Score::new(score.0, score.1)),
            sets: Vec::new(),
            odds: Odds {
                p1_win: odds.0,
                p2_win: odds.1,
            },
            league: "Liga Pro Russia".to_string(),
            prediction: Some(Prediction {
                winner: predicted,
                confidence: 70,
                factors: vec!["x".to_string()],
                bet_tier: BetTier::Medium,
            }),
        }
    }

    #[test]
    fn test_empty_is_all_zero() {
        let s = aggregate(&[]);
        assert_eq!(s.total, 0);
        assert_eq!(s.win_rate, 0.0);
        assert_eq!(s.roi, 0.0);
        assert_eq!(s.roi_signed, 0.0);
        assert_eq!(s.avg_odds, 0.0);
        assert_eq!(s.streak, 0);
        assert!(s.by_league.is_empty());
        assert!(s.daily.is_empty());
    }

    #[test]
    fn test_correct_uses_predicted_side_odds() {
        let m = finished("m1", 10, Side::P2, (1, 3), (1.40, 2.90));
        let s = aggregate(&[m]);
        assert_eq!(s.correct, 1);
        assert_eq!(s.avg_odds, 2.90);
        assert_eq!(s.win_rate, 100.0);
        // 2.90 * 100 / 100 - 1 = 1.9 -> 190%
        assert_eq!(s.roi, 190.0);
    }

    #[test]
    fn test_streak_stops_at_first_miss() {
        let matches = vec![
            finished("old-ok", 8, Side::P1, (3, 0), (1.5, 2.5)),
            finished("old-ok2", 9, Side::P1, (3, 1), (1.5, 2.5)),
            finished("miss", 10, Side::P1, (0, 3), (1.5, 2.5)),
            finished("ok1", 11, Side::P1, (3, 2), (1.5, 2.5)),
            finished("ok2", 12, Side::P2, (1, 3), (1.5, 2.5)),
            finished("ok3", 13, Side::P1, (3, 0), (1.5, 2.5)),
        ];
        let s = aggregate(&matches);
        assert_eq!(s.streak, 3);
        assert_eq!(s.correct, 5);
        assert_eq!(s.incorrect, 1);
    }

    #[test]
    fn test_streak_ordered_by_start_time_not_input() {
        let matches = vec![
            finished("newest-miss", 20, Side::P1, (0, 3), (1.5, 2.5)),
            finished("older-ok", 9, Side::P1, (3, 0), (1.5, 2.5)),
        ];
        assert_eq!(aggregate(&matches).streak, 0);
    }

    #[test]
    fn test_negative_roi_floored_for_display() {
        let matches = vec![
            finished("a", 10, Side::P1, (3, 0), (1.5, 2.5)),
            finished("b", 11, Side::P1, (0, 3), (1.5, 2.5)),
        ];
        let s = aggregate(&matches);
        assert_eq!(s.win_rate, 50.0);
        assert_eq!(s.avg_odds, 1.5);
        // 1.5 * 0.5 - 1 = -0.25
        assert_eq!(s.roi_signed, -25.0);
        assert_eq!(s.roi, 0.0);
    }

    #[test]
    fn test_unfinished_and_tied_are_pending() {
        let mut live = finished("live", 10, Side::P1, (2, 1), (1.5, 2.5));
        live.status = MatchStatus::Live;
        let tied = finished("tied", 11, Side::P1, (2, 2), (1.5, 2.5));
        let mut no_pred = finished("np", 12, Side::P1, (3, 0), (1.5, 2.5));
        no_pred.prediction = None;
        let s = aggregate(&[live, tied, no_pred]);
        assert_eq!(s.total, 0);
        assert_eq!(s.pending, 2);
        assert_eq!(s.tier_counts.medium, 2);
    }

    #[test]
    fn test_win_rate_rounding() {
        let matches = vec![
            finished("a", 10, Side::P1, (3, 0), (1.8, 2.0)),
            finished("b", 11, Side::P1, (3, 0), (1.8, 2.0)),
            finished("c", 12, Side::P1, (0, 3), (1.8, 2.0)),
        ];
        let s = aggregate(&matches);
        assert_eq!(s.win_rate, 66.7);
        // 1.8 * 0.667 - 1 = 0.2006 -> 20.1
        assert_eq!(s.roi, 20.1);
    }

    #[test]
    fn test_by_league_and_daily() {
        let mut a = finished("a", 10, Side::P1, (3, 0), (1.8, 2.0));
        a.league = "TT Cup".to_string();
        let b = finished("b", 11, Side::P1, (3, 0), (1.8, 2.0));
        let mut c = finished("c", 12, Side::P1, (0, 3), (1.8, 2.0));
        c.start_time = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let d = finished("d", 13, Side::P1, (3, 1), (1.8, 2.0));

        let s = aggregate(&[a, b, c, d]);
        assert_eq!(s.by_league.len(), 2);
        assert_eq!(s.by_league[0].league, "Liga Pro Russia");
        assert_eq!(s.by_league[0].total, 3);
        assert_eq!(s.by_league[0].correct, 2);
        assert_eq!(s.by_league[0].win_rate, 66.7);
        assert_eq!(s.by_league[1].league, "TT Cup");

        assert_eq!(s.daily.len(), 2);
        assert_eq!(s.daily[0].date, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
        assert_eq!(s.daily[0].correct, 0);
        assert_eq!(s.daily[1].total, 3);
    }

    #[test]
    fn test_period_filter() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        let mut recent = finished("recent", 10, Side::P1, (3, 0), (1.8, 2.0));
        recent.start_time = now - Duration::hours(3);
        let old = finished("old", 10, Side::P1, (0, 3), (1.8, 2.0));

        let today = aggregate_period(&[recent.clone(), old.clone()], Period::Today, now);
        assert_eq!(today.total, 1);
        assert_eq!(today.win_rate, 100.0);

        let all = aggregate_period(&[recent, old], Period::All, now);
        assert_eq!(all.total, 2);
        assert_eq!(Period::parse("Week"), Some(Period::Week));
        assert_eq!(Period::parse("year"), None);
    }
}
