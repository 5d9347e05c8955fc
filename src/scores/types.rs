//! Leaderboard data structures and input validation.

use crate::error::ScoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Longest accepted player name, in characters, after trimming.
pub const MAX_NAME_LEN: usize = 50;

/// Highest accepted score.
pub const MAX_SCORE: i64 = 999_999;

/// Rows returned by a top-scores query when no limit is given.
pub const DEFAULT_TOP_LIMIT: usize = 10;

/// A persisted run. Never modified after insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub id: Uuid,
    pub name: String,
    pub score: u32,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl ScoreEntry {
    pub fn new(name: String, score: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            score,
            created_at: Utc::now(),
        }
    }
}

/// One leaderboard line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardRow {
    pub name: String,
    pub score: u32,
}

impl From<&ScoreEntry> for LeaderboardRow {
    fn from(entry: &ScoreEntry) -> Self {
        Self {
            name: entry.name.clone(),
            score: entry.score,
        }
    }
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitReceipt {
    /// 1-based; 1 is the highest score.
    pub rank: u64,
    pub stored: ScoreEntry,
}

/// Trim and check a player name.
pub fn validate_name(name: &str) -> Result<String, ScoreError> {
    let trimmed = name.trim();
    let len = trimmed.chars().count();
    if len == 0 || len > MAX_NAME_LEN {
        return Err(ScoreError::Validation(format!(
            "Invalid name: must be 1-{} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(trimmed.to_string())
}

/// Check a score is inside `0..=MAX_SCORE`.
pub fn validate_score(score: i64) -> Result<u32, ScoreError> {
    if !(0..=MAX_SCORE).contains(&score) {
        return Err(ScoreError::Validation(format!(
            "Invalid score: must be 0-{}",
            MAX_SCORE
        )));
    }
    Ok(score as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_trimmed() {
        assert_eq!(validate_name("  Ada  ").unwrap(), "Ada");
    }

    #[test]
    fn test_name_bounds() {
        assert!(validate_name("").is_err());
        assert!(validate_name("    ").is_err());
        assert!(validate_name(&"a".repeat(50)).is_ok());
        assert!(validate_name(&"a".repeat(51)).is_err());
    }

    #[test]
    fn test_name_counts_chars_not_bytes() {
        // 50 two-byte characters
        assert!(validate_name(&"é".repeat(50)).is_ok());
    }

    #[test]
    fn test_score_bounds() {
        assert_eq!(validate_score(0).unwrap(), 0);
        assert_eq!(validate_score(999_999).unwrap(), 999_999);
        assert!(validate_score(-1).is_err());
        assert!(validate_score(1_000_000).is_err());
    }

    #[test]
    fn test_entry_serializes_timestamp_field() {
        let entry = ScoreEntry::new("Ada".to_string(), 10);
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("timestamp").is_some());
        assert!(json.get("created_at").is_none());
        assert_eq!(json["name"], "Ada");
    }
}
