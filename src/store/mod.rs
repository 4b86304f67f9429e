//! Manually entered matches, prediction history and the repositories they
//! persist through.

pub mod history;
pub mod json_file;

use crate::config::OddsConfig;
use crate::engine::odds::synthetic_odds;
use crate::engine::synthetic::synthetic_player;
use crate::engine::types::{Match, MatchStatus, Score};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

pub use history::{
    HistoryRepository, JsonHistoryRepository, MemoryHistoryRepository, PredictionHistory,
    RecordOutcome,
};
pub use json_file::JsonFileRepository;

const DEFAULT_COUNTRY: &str = "RU";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManualStatus {
    Live,
    Upcoming,
}

/// One admin-entered match, stored by player names only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualMatch {
    pub id: String,
    pub player1: String,
    pub player2: String,
    pub league: String,
    pub status: ManualStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<Score>,
}

impl ManualMatch {
    /// Expand into a full match with synthetic player attributes and odds.
    /// `now` becomes the start time. Scores survive only on live matches.
    pub fn to_match(&self, now: DateTime<Utc>, odds: &OddsConfig) -> Match {
        let player1 = synthetic_player(&self.player1, &self.player1, DEFAULT_COUNTRY);
        let player2 = synthetic_player(&self.player2, &self.player2, DEFAULT_COUNTRY);
        let odds = synthetic_odds(player1.rating, player2.rating, odds);
        let (status, score) = match self.status {
            ManualStatus::Live => (MatchStatus::Live, self.score),
            ManualStatus::Upcoming => (MatchStatus::Upcoming, None),
        };
        Match {
            id: self.id.clone(),
            player1,
            player2,
            start_time: now,
            status,
            score,
            sets: Vec::new(),
            odds,
            league: self.league.clone(),
            prediction: None,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum StoreError {
    #[error("player {slot} name is empty")]
    EmptyPlayerName { slot: u8 },
    #[error("a player cannot face themselves ({name})")]
    SamePlayer { name: String },
}

/// Persistence seam for manual matches. The engine never touches it.
pub trait MatchRepository: Send + Sync {
    fn load(&self) -> Result<Vec<ManualMatch>>;
    fn save(&self, matches: &[ManualMatch]) -> Result<()>;
}

/// In-process repository, used by tests and the offline demo.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    matches: Mutex<Vec<ManualMatch>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MatchRepository for MemoryRepository {
    fn load(&self) -> Result<Vec<ManualMatch>> {
        let guard = self
            .matches
            .lock()
            .map_err(|_| anyhow::anyhow!("memory repository lock poisoned"))?;
        Ok(guard.clone())
    }

    fn save(&self, matches: &[ManualMatch]) -> Result<()> {
        let mut guard = self
            .matches
            .lock()
            .map_err(|_| anyhow::anyhow!("memory repository lock poisoned"))?;
        *guard = matches.to_vec();
        Ok(())
    }
}

/// Admin input for a new manual match.
#[derive(Debug, Clone)]
pub struct NewManualMatch {
    pub player1: String,
    pub player2: String,
    pub league: String,
    pub status: ManualStatus,
    pub score: Option<Score>,
}

/// Admin operations over a repository: add, delete, clear, list.
pub struct ManualBook<R: MatchRepository> {
    repo: R,
}

impl<R: MatchRepository> ManualBook<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list(&self) -> Result<Vec<ManualMatch>> {
        self.repo.load()
    }

    /// Validate and append. The id is the millisecond timestamp of `now`,
    /// bumped until unique.
    pub fn add(&self, new: NewManualMatch, now: DateTime<Utc>) -> Result<ManualMatch> {
        let player1 = new.player1.trim().to_string();
        let player2 = new.player2.trim().to_string();
        if player1.is_empty() {
            return Err(StoreError::EmptyPlayerName { slot: 1 }.into());
        }
        if player2.is_empty() {
            return Err(StoreError::EmptyPlayerName { slot: 2 }.into());
        }
        if player1.eq_ignore_ascii_case(&player2) {
            return Err(StoreError::SamePlayer { name: player1 }.into());
        }

        let mut matches = self.repo.load()?;
        let mut id = now.timestamp_millis();
        while matches.iter().any(|m| m.id == id.to_string()) {
            id += 1;
        }

        let entry = ManualMatch {
            id: id.to_string(),
            player1,
            player2,
            league: new.league.trim().to_string(),
            status: new.status,
            score: match new.status {
                ManualStatus::Live => new.score,
                ManualStatus::Upcoming => None,
            },
        };
        matches.push(entry.clone());
        self.repo.save(&matches)?;
        tracing::info!(id = %entry.id, p1 = %entry.player1, p2 = %entry.player2, "manual match added");
        Ok(entry)
    }

    /// Returns whether anything was removed.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let mut matches = self.repo.load()?;
        let before = matches.len();
        matches.retain(|m| m.id != id);
        if matches.len() == before {
            return Ok(false);
        }
        self.repo.save(&matches)?;
        tracing::info!(id, "manual match deleted");
        Ok(true)
    }

    /// Update the score of a live manual match.
    pub fn set_score(&self, id: &str, score: Score) -> Result<bool> {
        let mut matches = self.repo.load()?;
        let Some(m) = matches
            .iter_mut()
            .find(|m| m.id == id && m.status == ManualStatus::Live)
        else {
            return Ok(false);
        };
        m.score = Some(score);
        self.repo.save(&matches)?;
        tracing::info!(id, p1 = score.p1, p2 = score.p2, "manual score updated");
        Ok(true)
    }

    pub fn clear(&self) -> Result<()> {
        self.repo.save(&[])?;
        tracing::info!("manual matches cleared");
        Ok(())
    }
}
