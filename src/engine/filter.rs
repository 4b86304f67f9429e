use super::types::{BetTier, Match, MatchStatus};

/// Board filters. `None` leaves that dimension unfiltered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchFilters {
    /// Rejects matches whose favorite is priced below this.
    pub min_odds: Option<f64>,
    /// Rejects matches whose underdog is priced above this.
    pub max_odds: Option<f64>,
    pub min_confidence: Option<u8>,
    pub status: Option<MatchStatus>,
    pub league: Option<String>,
    pub bet_tier: Option<BetTier>,
}

impl MatchFilters {
    pub fn accepts(&self, m: &Match) -> bool {
        if self.status.is_some_and(|s| s != m.status) {
            return false;
        }
        if self.league.as_deref().is_some_and(|l| l != m.league) {
            return false;
        }
        if self.min_odds.is_some_and(|min| m.odds.lower() < min) {
            return false;
        }
        if self.max_odds.is_some_and(|max| m.odds.higher() > max) {
            return false;
        }
        // Prediction-based filters pass matches that have no prediction yet.
        if let Some(p) = &m.prediction {
            if self.min_confidence.is_some_and(|min| p.confidence < min) {
                return false;
            }
            if self.bet_tier.is_some_and(|t| t != p.bet_tier) {
                return false;
            }
        }
        true
    }
}

pub fn filter_matches<'a>(matches: &'a [Match], filters: &MatchFilters) -> Vec<&'a Match> {
    matches.iter().filter(|m| filters.accepts(m)).collect()
}
