//! Leaderboard operations: submission with ranking, top-N and per-player queries.

use super::store::ScoreStore;
use super::types::{validate_name, validate_score, LeaderboardRow, ScoreEntry, SubmitReceipt};
use crate::error::ScoreError;

pub struct ScoreService {
    store: Box<dyn ScoreStore>,
}

impl ScoreService {
    pub fn new(store: impl ScoreStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// Validate, persist and rank a finished run.
    ///
    /// Rank is 1 + the number of stored entries with a strictly greater score,
    /// so equal scores share a rank.
    pub fn submit_score(&mut self, name: &str, score: i64) -> Result<SubmitReceipt, ScoreError> {
        let name = validate_name(name)?;
        let score = validate_score(score)?;

        let entry = ScoreEntry::new(name, score);
        self.store.insert(entry.clone())?;
        let rank = self.store.count_above(score)? + 1;

        log::info!("Stored score {} for {:?} at rank {}", score, entry.name, rank);
        Ok(SubmitReceipt {
            rank,
            stored: entry,
        })
    }

    /// Best `limit` scores, highest first.
    pub fn fetch_top_scores(&self, limit: usize) -> Result<Vec<LeaderboardRow>, ScoreError> {
        Ok(self
            .store
            .top(limit)?
            .iter()
            .map(LeaderboardRow::from)
            .collect())
    }

    pub fn fetch_player_best(&self, name: &str) -> Result<ScoreEntry, ScoreError> {
        self.store
            .best_for(name)?
            .ok_or_else(|| ScoreError::NotFound("Player not found".to_string()))
    }

    /// Remove every entry. Irreversible.
    pub fn delete_all_scores(&mut self) -> Result<(), ScoreError> {
        let removed = self.store.len()?;
        self.store.clear()?;
        log::warn!("Deleted all {} stored scores", removed);
        Ok(())
    }

    pub fn total_entries(&self) -> Result<usize, ScoreError> {
        self.store.len()
    }
}
