// Property sweeps over the prediction engine

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use tt_predict::config::TierThresholds;
    use tt_predict::engine::predictor::{CONFIDENCE_MAX, CONFIDENCE_MIN, MAX_FACTORS};
    use tt_predict::engine::types::{
        BetTier, FormResult, Match, MatchStatus, Odds, Player, Score, Side,
    };
    use tt_predict::engine::Predictor;

    const CASES: usize = 2_000;

    fn random_player(rng: &mut StdRng, name: &str) -> Player {
        Player {
            id: name.to_string(),
            name: name.to_string(),
            rating: rng.gen_range(1500.0..2100.0),
            win_rate: (rng.gen_range(35.0..85.0_f64) * 10.0).round() / 10.0,
            recent_form: (0..5)
                .map(|_| {
                    if rng.gen_bool(0.5) {
                        FormResult::Win
                    } else {
                        FormResult::Loss
                    }
                })
                .collect(),
            country: "RU".to_string(),
        }
    }

    fn random_match(rng: &mut StdRng) -> Match {
        let live = rng.gen_bool(0.4);
        Match {
            id: "m".to_string(),
            player1: random_player(rng, "Alpha One"),
            player2: random_player(rng, "Beta Two"),
            start_time: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
            status: if live {
                MatchStatus::Live
            } else {
                MatchStatus::Upcoming
            },
            score: live.then(|| Score::new(rng.gen_range(0..4), rng.gen_range(0..4))),
            sets: Vec::new(),
            odds: Odds {
                p1_win: rng.gen_range(1.05..5.0),
                p2_win: rng.gen_range(1.05..5.0),
            },
            league: "Liga Pro Russia".to_string(),
            prediction: None,
        }
    }

    #[test]
    fn test_confidence_bounds_factor_cap_and_tier() {
        let predictor = Predictor::default();
        let tiers = TierThresholds::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..CASES {
            let m = random_match(&mut rng);
            let p = predictor.predict(&m);
            assert!((CONFIDENCE_MIN..=CONFIDENCE_MAX).contains(&p.confidence));
            assert!(!p.factors.is_empty());
            assert!(p.factors.len() <= MAX_FACTORS);
            assert_eq!(p.bet_tier, tiers.classify(p.confidence));
        }
    }

    #[test]
    fn test_rating_increase_never_hurts_player1() {
        let predictor = Predictor::default();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..CASES {
            let base = random_match(&mut rng);
            let mut boosted = base.clone();
            boosted.player1.rating += rng.gen_range(0.0..400.0);

            let before = predictor.score(&base).score;
            let after = predictor.score(&boosted).score;
            assert!(after >= before, "score dropped: {before} -> {after}");

            let p_before = predictor.predict(&base);
            let p_after = predictor.predict(&boosted);
            if p_before.winner == Side::P1 {
                assert_eq!(p_after.winner, Side::P1);
                assert!(p_after.confidence >= p_before.confidence);
            }
        }
    }

    #[test]
    fn test_other_gaps_are_monotone() {
        let predictor = Predictor::default();
        let mut rng = StdRng::seed_from_u64(13);
        for _ in 0..CASES {
            let base = random_match(&mut rng);
            let before = predictor.score(&base).score;

            let mut wr = base.clone();
            wr.player1.win_rate += rng.gen_range(0.0..20.0);
            assert!(predictor.score(&wr).score >= before);

            let mut form = base.clone();
            if let Some(slot) = form
                .player1
                .recent_form
                .iter_mut()
                .find(|r| **r == FormResult::Loss)
            {
                *slot = FormResult::Win;
            }
            assert!(predictor.score(&form).score >= before);

            let mut odds = base.clone();
            odds.odds.p1_win = (odds.odds.p1_win - rng.gen_range(0.0..1.0)).max(1.01);
            assert!(predictor.score(&odds).score >= before);

            if let Some(score) = base.score {
                let mut lead = base.clone();
                lead.score = Some(Score::new(score.p1 + 1, score.p2));
                assert!(predictor.score(&lead).score >= before);
            }
        }
    }

    #[test]
    fn test_swapping_players_swaps_winner_keeps_confidence() {
        let predictor = Predictor::default();
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..CASES {
            let m = random_match(&mut rng);
            let mirror = m.mirrored();
            let s = predictor.score(&m).score;
            assert_eq!(predictor.score(&mirror).score, -s);

            let a = predictor.predict(&m);
            let b = predictor.predict(&mirror);
            assert_eq!(a.confidence, b.confidence);
            assert_eq!(a.bet_tier, b.bet_tier);
            if s != 0.0 {
                assert_eq!(a.winner, b.winner.other());
                assert_eq!(m.player(a.winner).name, mirror.player(b.winner).name);
            }
        }
    }

    #[test]
    fn test_rating_gap_example_picks_player1() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut m = random_match(&mut rng);
        m.status = MatchStatus::Upcoming;
        m.score = None;
        m.player1.rating = 1900.0;
        m.player2.rating = 1700.0;
        m.player2.win_rate = m.player1.win_rate;
        m.player2.recent_form = m.player1.recent_form.clone();
        m.odds = Odds {
            p1_win: 1.50,
            p2_win: 2.60,
        };

        let p = Predictor::default().predict(&m);
        assert_eq!(p.winner, Side::P1);
        assert!(p.confidence > 50);
        assert!(p.factors.iter().any(|f| f.contains("rating") && f.contains("200")));
        assert_ne!(p.bet_tier, BetTier::Skip);
    }
}
