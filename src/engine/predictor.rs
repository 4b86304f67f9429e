//! Heuristic match predictor.
//!
//! Sums weighted rating, win-rate, form, odds and live-score deltas into a
//! signed preference score (positive favours player 1), then maps `|score|`
//! onto a bounded confidence and a bet tier.

use super::types::{BetTier, Match, MatchStatus, Prediction, Side};
use crate::config::{EngineConfig, TierThresholds};

pub const CONFIDENCE_MIN: u8 = 45;
pub const CONFIDENCE_MAX: u8 = 96;
pub const MAX_FACTORS: usize = 4;

const EVENLY_MATCHED: &str = "Players are evenly matched";

impl TierThresholds {
    /// Map a confidence onto its tier. Bands are half-open and ascending, so
    /// every confidence lands in exactly one tier.
    pub fn classify(&self, confidence: u8) -> BetTier {
        if confidence >= self.strong {
            BetTier::Strong
        } else if confidence >= self.medium {
            BetTier::Medium
        } else if confidence >= self.risky {
            BetTier::Risky
        } else {
            BetTier::Skip
        }
    }
}

/// Signed preference score plus the factors emitted while computing it.
#[derive(Debug, Clone, Default)]
pub struct ScoreBreakdown {
    pub score: f64,
    pub factors: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Predictor {
    config: EngineConfig,
    tiers: TierThresholds,
}

impl Predictor {
    pub fn new(config: EngineConfig, tiers: TierThresholds) -> Self {
        Self { config, tiers }
    }

    pub fn tiers(&self) -> &TierThresholds {
        &self.tiers
    }

    pub fn predict(&self, m: &Match) -> Prediction {
        let ScoreBreakdown { score, mut factors } = self.score(m);

        let confidence = self.confidence(score);
        if factors.is_empty() {
            factors.push(EVENLY_MATCHED.to_string());
        }
        factors.truncate(MAX_FACTORS);

        Prediction {
            winner: if score >= 0.0 { Side::P1 } else { Side::P2 },
            confidence,
            factors,
            bet_tier: self.tiers.classify(confidence),
        }
    }

    /// Recompute every prediction from scratch.
    pub fn attach(&self, matches: &mut [Match]) {
        for m in matches.iter_mut() {
            m.prediction = Some(self.predict(m));
        }
    }

    pub fn confidence(&self, score: f64) -> u8 {
        let raw = self.config.confidence_base + score.abs() * self.config.confidence_scale;
        raw.round()
            .clamp(CONFIDENCE_MIN as f64, CONFIDENCE_MAX as f64) as u8
    }

    /// Run every scoring term in fixed order. Factor order follows term order,
    /// which decides which factors survive truncation.
    pub fn score(&self, m: &Match) -> ScoreBreakdown {
        let mut out = ScoreBreakdown::default();
        self.rating_term(m, &mut out);
        self.win_rate_term(m, &mut out);
        self.form_term(m, &mut out);
        self.odds_term(m, &mut out);
        self.live_term(m, &mut out);
        out
    }

    fn rating_term(&self, m: &Match, out: &mut ScoreBreakdown) {
        let c = &self.config;
        let rd = m.player1.rating - m.player2.rating;
        if rd.abs() <= c.rating_min_gap {
            return;
        }
        out.score += rd / c.rating_divisor * c.rating_weight;
        if rd.abs() > c.rating_large_gap {
            out.factors
                .push(format!("Large rating advantage ({:.0} pts)", rd.abs()));
        } else if rd.abs() > c.rating_factor_gap {
            out.factors
                .push(format!("Rating advantage ({:.0} pts)", rd.abs()));
        }
    }

    fn win_rate_term(&self, m: &Match, out: &mut ScoreBreakdown) {
        let c = &self.config;
        let wd = m.player1.win_rate - m.player2.win_rate;
        if wd.abs() <= c.win_rate_min_gap {
            return;
        }
        out.score += wd / c.win_rate_divisor * c.win_rate_weight;
        if wd.abs() > c.win_rate_factor_gap {
            let leader = if wd > 0.0 { &m.player1 } else { &m.player2 };
            out.factors.push(format!(
                "High win rate: {} ({:.1}%)",
                leader.short_name(),
                leader.win_rate
            ));
        }
    }

    fn form_term(&self, m: &Match, out: &mut ScoreBreakdown) {
        let c = &self.config;
        let (p1, p2) = (&m.player1, &m.player2);
        let f1 = p1.form_wins();
        let f2 = p2.form_wins();
        if f1 == f2 {
            return;
        }
        out.score += (f1 as f64 - f2 as f64) * c.form_scale * c.form_weight;

        let strong = |wins: u32| wins >= c.form_strong_wins;
        let weak = |wins: u32| wins <= c.form_weak_wins;
        let factor = if strong(f1) {
            Some((p1, f1, "in great form"))
        } else if strong(f2) {
            Some((p2, f2, "in great form"))
        } else if weak(f1) {
            Some((p1, f1, "in poor form"))
        } else if weak(f2) {
            Some((p2, f2, "in poor form"))
        } else {
            None
        };
        if let Some((player, wins, label)) = factor {
            out.factors.push(format!(
                "{} {} ({}/{} wins)",
                player.short_name(),
                label,
                wins,
                player.recent_form.len()
            ));
        }
    }

    fn odds_term(&self, m: &Match, out: &mut ScoreBreakdown) {
        let c = &self.config;
        let gap = m.odds.p1_win - m.odds.p2_win;
        if gap.abs() <= c.odds_min_gap {
            return;
        }
        let favorite = if gap < 0.0 { Side::P1 } else { Side::P2 };
        out.score += match favorite {
            Side::P1 => c.odds_weight,
            Side::P2 => -c.odds_weight,
        };
        let favorite_odds = m.odds.lower();
        if favorite_odds < c.clear_favorite_odds {
            out.factors.push(format!(
                "{} is a clear favorite (odds {:.2})",
                m.player(favorite).short_name(),
                favorite_odds
            ));
        }
    }

    fn live_term(&self, m: &Match, out: &mut ScoreBreakdown) {
        let c = &self.config;
        if m.status != MatchStatus::Live {
            return;
        }
        let Some(score) = m.score else { return };
        let Some(leader) = score.leader() else { return };

        let d = score.diff();
        out.score += d as f64 * c.live_scale * c.live_weight;
        let verb = if d.unsigned_abs() >= c.dominating_lead as u64 {
            "dominating"
        } else {
            "leading"
        };
        out.factors.push(format!(
            "{} {} ({}:{})",
            m.player(leader).short_name(),
            verb,
            score.p1,
            score.p2
        ));
    }
}
