// Flattened board rows for terminal display

use crate::engine::odds::{implied_probability, overround};
use crate::engine::types::{Match, MatchStatus, Odds, Side};

/// One printable board line.
#[derive(Debug, Clone)]
pub struct BoardRow {
    pub league: String,
    pub matchup: String,
    pub start_time: String,
    pub status: String,
    pub pick: String,
    pub confidence: String,
    pub tier: String,
    /// Decimal odds, the favorite marked with `*`.
    pub odds: String,
    /// Book-implied chance of the picked side.
    pub implied: String,
    pub margin: String,
    pub factors: String,
}

fn status_label(m: &Match) -> String {
    match (m.status, m.score) {
        (MatchStatus::Live, Some(s)) => format!("Live ({}:{})", s.p1, s.p2),
        (MatchStatus::Live, None) => "Live".to_string(),
        (MatchStatus::Finished, Some(s)) => format!("Final {}:{}", s.p1, s.p2),
        (MatchStatus::Finished, None) => "Final".to_string(),
        (MatchStatus::Upcoming, _) => "Upcoming".to_string(),
    }
}

fn odds_label(odds: &Odds) -> String {
    let mark = |side| if odds.favorite() == Some(side) { "*" } else { "" };
    format!(
        "{:.2}{} / {:.2}{}",
        odds.p1_win,
        mark(Side::P1),
        odds.p2_win,
        mark(Side::P2)
    )
}

pub fn build_board_rows(matches: &[Match]) -> Vec<BoardRow> {
    matches
        .iter()
        .map(|m| {
            let (pick, confidence, tier, implied, factors) = match &m.prediction {
                Some(p) => (
                    m.player(p.winner).name.clone(),
                    format!("{}%", p.confidence),
                    p.bet_tier.as_str().to_string(),
                    format!("{:.0}%", implied_probability(m.odds.for_side(p.winner)) * 100.0),
                    p.factors.join("; "),
                ),
                None => (
                    "-".to_string(),
                    "-".to_string(),
                    "-".to_string(),
                    "-".to_string(),
                    String::new(),
                ),
            };
            BoardRow {
                league: m.league.clone(),
                matchup: format!("{} vs {}", m.player1.name, m.player2.name),
                start_time: m.start_time.format("%b %d %H:%M").to_string(),
                status: status_label(m),
                pick,
                confidence,
                tier,
                odds: odds_label(&m.odds),
                implied,
                margin: format!("{:.1}%", overround(&m.odds) * 100.0),
                factors,
            }
        })
        .collect()
}
