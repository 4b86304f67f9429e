//! Decimal odds synthesized from ratings when no market price is available.
//!
//! Model: Elo expected score `P(p1) = 1 / (1 + 10^(-diff / scale))`, with the
//! bookmaker margin split evenly across both outcomes before inverting.

use super::types::Odds;
use crate::config::OddsConfig;

/// Probability that the higher-by-`rating_diff` player wins.
pub fn expected_score(rating_diff: f64, scale: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf(-rating_diff / scale))
}

fn to_decimal(probability: f64, config: &OddsConfig) -> f64 {
    let price = 1.0 / (probability + config.margin / 2.0);
    let clamped = price.clamp(config.min_odds, config.max_odds);
    (clamped * 100.0).round() / 100.0
}

pub fn synthetic_odds(rating1: f64, rating2: f64, config: &OddsConfig) -> Odds {
    let p1 = expected_score(rating1 - rating2, config.rating_scale);
    Odds {
        p1_win: to_decimal(p1, config),
        p2_win: to_decimal(1.0 - p1, config),
    }
}

/// Raw implied probability of a decimal price (includes the margin).
pub fn implied_probability(decimal_odds: f64) -> f64 {
    if decimal_odds <= 0.0 {
        return 0.0;
    }
    1.0 / decimal_odds
}

/// Sum of implied probabilities minus one; the book's margin.
pub fn overround(odds: &Odds) -> f64 {
    implied_probability(odds.p1_win) + implied_probability(odds.p2_win) - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_score_even() {
        assert!((expected_score(0.0, 400.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_expected_score_400_gap() {
        // 400 points -> 10:1
        let p = expected_score(400.0, 400.0);
        assert!((p - 10.0 / 11.0).abs() < 1e-12);
        assert!((expected_score(-400.0, 400.0) - 1.0 / 11.0).abs() < 1e-12);
    }

    #[test]
    fn test_even_ratings_give_equal_odds() {
        let odds = synthetic_odds(1800.0, 1800.0, &OddsConfig::default());
        // 1 / (0.5 + 0.03) = 1.8868 -> 1.89
        assert_eq!(odds.p1_win, 1.89);
        assert_eq!(odds.p2_win, 1.89);
    }

    #[test]
    fn test_stronger_player_is_favorite() {
        let odds = synthetic_odds(1950.0, 1720.0, &OddsConfig::default());
        assert!(odds.p1_win < odds.p2_win, "{odds:?}");
        let flipped = synthetic_odds(1720.0, 1950.0, &OddsConfig::default());
        assert_eq!(flipped.p1_win, odds.p2_win);
        assert_eq!(flipped.p2_win, odds.p1_win);
    }

    #[test]
    fn test_odds_are_clamped() {
        let config = OddsConfig::default();
        let odds = synthetic_odds(3000.0, 1000.0, &config);
        assert_eq!(odds.p1_win, config.min_odds);
        assert_eq!(odds.p2_win, config.max_odds);
    }

    #[test]
    fn test_margin_produces_positive_overround() {
        let odds = synthetic_odds(1800.0, 1750.0, &OddsConfig::default());
        let margin = overround(&odds);
        assert!(margin > 0.04 && margin < 0.08, "got {margin}");
    }

    #[test]
    fn test_implied_probability_guards_zero() {
        assert_eq!(implied_probability(0.0), 0.0);
        assert!((implied_probability(2.0) - 0.5).abs() < 1e-12);
    }
}
