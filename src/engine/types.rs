use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which slot of a match a player occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    P1,
    P2,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::P1 => Side::P2,
            Side::P2 => Side::P1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormResult {
    #[serde(rename = "W")]
    Win,
    #[serde(rename = "L")]
    Loss,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub name: String,
    pub rating: f64,
    /// Percentage, 0-100.
    pub win_rate: f64,
    /// Most recent result first.
    pub recent_form: Vec<FormResult>,
    pub country: String,
}

impl Player {
    /// First token of the display name ("Ivanov A." -> "Ivanov").
    pub fn short_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }

    pub fn form_wins(&self) -> u32 {
        self.recent_form
            .iter()
            .filter(|r| **r == FormResult::Win)
            .count() as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Upcoming,
    Live,
    Finished,
}

impl MatchStatus {
    /// Board ordering: live first, then upcoming, then finished.
    pub fn sort_rank(self) -> u8 {
        match self {
            MatchStatus::Live => 0,
            MatchStatus::Upcoming => 1,
            MatchStatus::Finished => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Score {
    pub p1: u32,
    pub p2: u32,
}

impl Score {
    pub fn new(p1: u32, p2: u32) -> Self {
        Self { p1, p2 }
    }

    pub fn diff(&self) -> i64 {
        self.p1 as i64 - self.p2 as i64
    }

    pub fn leader(&self) -> Option<Side> {
        match self.p1.cmp(&self.p2) {
            std::cmp::Ordering::Greater => Some(Side::P1),
            std::cmp::Ordering::Less => Some(Side::P2),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn swapped(&self) -> Score {
        Score {
            p1: self.p2,
            p2: self.p1,
        }
    }
}

/// Decimal odds, one per player slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Odds {
    pub p1_win: f64,
    pub p2_win: f64,
}

impl Odds {
    pub fn for_side(&self, side: Side) -> f64 {
        match side {
            Side::P1 => self.p1_win,
            Side::P2 => self.p2_win,
        }
    }

    /// Side with the lower price, or None when both are equal.
    pub fn favorite(&self) -> Option<Side> {
        if self.p1_win < self.p2_win {
            Some(Side::P1)
        } else if self.p2_win < self.p1_win {
            Some(Side::P2)
        } else {
            None
        }
    }

    pub fn lower(&self) -> f64 {
        self.p1_win.min(self.p2_win)
    }

    pub fn higher(&self) -> f64 {
        self.p1_win.max(self.p2_win)
    }

    pub fn swapped(&self) -> Odds {
        Odds {
            p1_win: self.p2_win,
            p2_win: self.p1_win,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetTier {
    Strong,
    Medium,
    Risky,
    Skip,
}

impl BetTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            BetTier::Strong => "strong",
            BetTier::Medium => "medium",
            BetTier::Risky => "risky",
            BetTier::Skip => "skip",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub winner: Side,
    pub confidence: u8,
    pub factors: Vec<String>,
    pub bet_tier: BetTier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: String,
    pub player1: Player,
    pub player2: Player,
    pub start_time: DateTime<Utc>,
    pub status: MatchStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<Score>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sets: Vec<Score>,
    pub odds: Odds,
    pub league: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<Prediction>,
}

impl Match {
    pub fn player(&self, side: Side) -> &Player {
        match side {
            Side::P1 => &self.player1,
            Side::P2 => &self.player2,
        }
    }

    /// Winner by final score. None unless the match is finished with a decisive score.
    pub fn actual_winner(&self) -> Option<Side> {
        if self.status != MatchStatus::Finished {
            return None;
        }
        self.score.as_ref().and_then(Score::leader)
    }

    pub fn confidence(&self) -> u8 {
        self.prediction.as_ref().map_or(0, |p| p.confidence)
    }

    /// Same match seen from the other slot: players, odds, score and sets swapped.
    pub fn mirrored(&self) -> Match {
        Match {
            id: self.id.clone(),
            player1: self.player2.clone(),
            player2: self.player1.clone(),
            start_time: self.start_time,
            status: self.status,
            score: self.score.map(|s| s.swapped()),
            sets: self.sets.iter().map(Score::swapped).collect(),
            odds: self.odds.swapped(),
            league: self.league.clone(),
            prediction: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(name: &str, form: &[FormResult]) -> Player {
        Player {
            id: name.to_string(),
            name: name.to_string(),
            rating: 1800.0,
            win_rate: 60.0,
            recent_form: form.to_vec(),
            country: "RU".to_string(),
        }
    }

    #[test]
    fn test_short_name_takes_first_token() {
        let p = player("Ivanov A.", &[]);
        assert_eq!(p.short_name(), "Ivanov");
        let p = player("Petrov", &[]);
        assert_eq!(p.short_name(), "Petrov");
    }

    #[test]
    fn test_form_wins() {
        use FormResult::*;
        let p = player("A", &[Win, Loss, Win, Win, Loss]);
        assert_eq!(p.form_wins(), 3);
    }

    #[test]
    fn test_score_leader() {
        assert_eq!(Score::new(3, 1).leader(), Some(Side::P1));
        assert_eq!(Score::new(0, 3).leader(), Some(Side::P2));
        assert_eq!(Score::new(2, 2).leader(), None);
        assert_eq!(Score::new(1, 3).diff(), -2);
    }

    #[test]
    fn test_odds_favorite() {
        let odds = Odds { p1_win: 1.4, p2_win: 2.8 };
        assert_eq!(odds.favorite(), Some(Side::P1));
        assert_eq!(odds.for_side(Side::P2), 2.8);
        assert_eq!(odds.swapped().favorite(), Some(Side::P2));
        let even = Odds { p1_win: 1.9, p2_win: 1.9 };
        assert_eq!(even.favorite(), None);
    }

    #[test]
    fn test_match_serde_shape() {
        let json = r#"{
            "id": "m1",
            "player1": {"id": "a", "name": "Ivanov A.", "rating": 1850, "winRate": 65.0,
                        "recentForm": ["W","W","L","W","L"], "country": "RU"},
            "player2": {"id": "b", "name": "Petrov D.", "rating": 1760, "winRate": 56.0,
                        "recentForm": ["L","L","W","L","W"], "country": "RU"},
            "startTime": "2026-03-01T12:00:00Z",
            "status": "finished",
            "score": {"p1": 3, "p2": 1},
            "odds": {"p1Win": 1.45, "p2Win": 2.6},
            "league": "Liga Pro Russia"
        }"#;
        let m: Match = serde_json::from_str(json).unwrap();
        assert_eq!(m.status, MatchStatus::Finished);
        assert_eq!(m.player1.recent_form[2], FormResult::Loss);
        assert!(m.sets.is_empty());
        assert!(m.prediction.is_none());
        assert_eq!(m.actual_winner(), Some(Side::P1));
    }

    #[test]
    fn test_actual_winner_requires_finished() {
        let mut m: Match = serde_json::from_str(
            r#"{"id":"x","player1":{"id":"a","name":"A","rating":1800,"winRate":60,"recentForm":[],"country":"RU"},
                "player2":{"id":"b","name":"B","rating":1800,"winRate":60,"recentForm":[],"country":"RU"},
                "startTime":"2026-03-01T12:00:00Z","status":"live","score":{"p1":2,"p2":0},
                "odds":{"p1Win":1.9,"p2Win":1.9},"league":"TT Cup"}"#,
        )
        .unwrap();
        assert_eq!(m.actual_winner(), None);
        m.status = MatchStatus::Finished;
        assert_eq!(m.actual_winner(), Some(Side::P1));
        m.score = Some(Score::new(2, 2));
        assert_eq!(m.actual_winner(), None);
    }
}
