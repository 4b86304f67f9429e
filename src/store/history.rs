//! Every predicted match the board has shown, so statistics outlive a refresh.

use super::json_file::{read_json_array, write_json_array};
use crate::engine::types::{Match, MatchStatus};
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Mutex;

/// Persistence seam for prediction history.
pub trait HistoryRepository: Send + Sync {
    fn load(&self) -> Result<Vec<Match>>;
    fn save(&self, records: &[Match]) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryHistoryRepository {
    records: Mutex<Vec<Match>>,
}

impl MemoryHistoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryRepository for MemoryHistoryRepository {
    fn load(&self) -> Result<Vec<Match>> {
        let guard = self
            .records
            .lock()
            .map_err(|_| anyhow::anyhow!("history lock poisoned"))?;
        Ok(guard.clone())
    }

    fn save(&self, records: &[Match]) -> Result<()> {
        let mut guard = self
            .records
            .lock()
            .map_err(|_| anyhow::anyhow!("history lock poisoned"))?;
        *guard = records.to_vec();
        Ok(())
    }
}

/// History kept as a JSON array of matches on disk.
pub struct JsonHistoryRepository {
    path: PathBuf,
}

impl JsonHistoryRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl HistoryRepository for JsonHistoryRepository {
    fn load(&self) -> Result<Vec<Match>> {
        read_json_array(&self.path, "prediction history")
    }

    fn save(&self, records: &[Match]) -> Result<()> {
        write_json_array(&self.path, records)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordOutcome {
    /// Matches seen for the first time.
    pub saved: usize,
    /// Matches that moved to finished in this call.
    pub settled: usize,
}

/// Upserts board matches by id. The prediction, odds and start time are
/// frozen at first sight; later refreshes only move status and score, and a
/// finished record is never touched again.
pub struct PredictionHistory<R: HistoryRepository> {
    repo: R,
}

impl<R: HistoryRepository> PredictionHistory<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn all(&self) -> Result<Vec<Match>> {
        self.repo.load()
    }

    /// Record every predicted match on `board`. Unpredicted matches are ignored.
    pub fn record(&self, board: &[Match]) -> Result<RecordOutcome> {
        let mut records = self.repo.load()?;
        let mut outcome = RecordOutcome::default();
        let mut dirty = false;

        for m in board.iter().filter(|m| m.prediction.is_some()) {
            let Some(existing) = records.iter_mut().find(|r| r.id == m.id) else {
                if m.status == MatchStatus::Finished {
                    outcome.settled += 1;
                }
                records.push(m.clone());
                outcome.saved += 1;
                dirty = true;
                continue;
            };
            if existing.status == MatchStatus::Finished {
                continue;
            }
            if existing.status != m.status || existing.score != m.score || existing.sets != m.sets {
                if m.status == MatchStatus::Finished {
                    outcome.settled += 1;
                }
                existing.status = m.status;
                existing.score = m.score;
                existing.sets = m.sets.clone();
                dirty = true;
            }
        }

        if dirty {
            self.repo.save(&records)?;
            tracing::debug!(
                saved = outcome.saved,
                settled = outcome.settled,
                total = records.len(),
                "prediction history updated"
            );
        }
        Ok(outcome)
    }
}
