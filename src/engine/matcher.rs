use super::predictor::Predictor;
use super::types::{Match, MatchStatus, Score};

/// A live event as reported by a score feed, home/away oriented.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveEvent {
    pub id: String,
    pub home: String,
    pub away: String,
    pub score: Score,
    pub league: String,
}

/// Score update for one of our matches, already oriented to our p1/p2.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveScoreUpdate {
    pub match_id: String,
    pub score: Score,
}

/// Words shorter than this never count as a name match ("A.", "de").
const MIN_WORD_LEN: usize = 3;

/// Lowercase, drop `.` and `,`, collapse whitespace.
/// "Ivanov  A." -> "ivanov a"
pub fn normalize_name(name: &str) -> String {
    let lower = name.to_lowercase().replace(['.', ','], "");
    lower.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// True when any significant word of `ours` appears among the words of `theirs`.
fn name_matches(ours: &str, theirs: &str) -> bool {
    let ours = normalize_name(ours);
    let theirs = normalize_name(theirs);
    let their_words: Vec<&str> = theirs.split(' ').collect();
    ours.split(' ')
        .filter(|w| w.chars().count() >= MIN_WORD_LEN)
        .any(|w| their_words.contains(&w))
}

/// Find the live score for our `p1` vs `p2`, oriented to our slots.
/// Direct orientation (p1 = home) is tried before the reversed one.
pub fn find_live_score(events: &[LiveEvent], p1: &str, p2: &str) -> Option<Score> {
    for ev in events {
        if name_matches(p1, &ev.home) && name_matches(p2, &ev.away) {
            return Some(ev.score);
        }
        if name_matches(p2, &ev.home) && name_matches(p1, &ev.away) {
            return Some(ev.score.swapped());
        }
    }
    None
}

/// Updates for every live match that has a counterpart in `events`.
pub fn live_score_updates(matches: &[Match], events: &[LiveEvent]) -> Vec<LiveScoreUpdate> {
    matches
        .iter()
        .filter(|m| m.status == MatchStatus::Live)
        .filter_map(|m| {
            find_live_score(events, &m.player1.name, &m.player2.name).map(|score| LiveScoreUpdate {
                match_id: m.id.clone(),
                score,
            })
        })
        .collect()
}

/// Apply live scores and re-predict the touched matches. Returns how many changed.
pub fn apply_live_scores(matches: &mut [Match], events: &[LiveEvent], predictor: &Predictor) -> usize {
    let updates = live_score_updates(matches, events);
    let mut changed = 0;
    for update in updates {
        let Some(m) = matches.iter_mut().find(|m| m.id == update.match_id) else {
            continue;
        };
        if m.score == Some(update.score) {
            continue;
        }
        tracing::debug!(
            match_id = %m.id,
            p1 = update.score.p1,
            p2 = update.score.p2,
            "live score changed"
        );
        m.score = Some(update.score);
        m.prediction = Some(predictor.predict(m));
        changed += 1;
    }
    changed
}
