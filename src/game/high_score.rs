//! Locally persisted best score, kept as a small JSON file in the platform
//! data directory.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const HIGH_SCORE_FILE: &str = "high_score.json";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
struct HighScoreRecord {
    best: u32,
}

/// The player's best score on this machine.
#[derive(Debug, Clone)]
pub struct HighScore {
    path: Option<PathBuf>,
    best: u32,
}

impl HighScore {
    /// Load from the default location. Falls back to an in-memory record when
    /// no data directory is available.
    pub fn load_default() -> Self {
        match default_path() {
            Some(path) => Self::at(path),
            None => {
                log::warn!("No data directory found; high score will not be saved");
                Self::in_memory()
            }
        }
    }

    /// Load from `path`. A missing or corrupt file starts at zero.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let best = fs::read_to_string(&path)
            .ok()
            .and_then(|json| serde_json::from_str::<HighScoreRecord>(&json).ok())
            .unwrap_or_default()
            .best;
        Self {
            path: Some(path),
            best,
        }
    }

    pub fn in_memory() -> Self {
        Self {
            path: None,
            best: 0,
        }
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Record `score` if it beats the current best. Returns true on a new record.
    ///
    /// The in-memory value is updated even if writing the file fails.
    pub fn record(&mut self, score: u32) -> io::Result<bool> {
        if score <= self.best {
            return Ok(false);
        }
        self.best = score;
        if let Some(path) = &self.path {
            save(path, self.best)?;
        }
        Ok(true)
    }
}

fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "music-runner").map(|dirs| dirs.data_dir().join(HIGH_SCORE_FILE))
}

fn save(path: &Path, best: u32) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(&HighScoreRecord { best })
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(path, json)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("music-runner-hs-{}", uuid::Uuid::new_v4()))
            .join(HIGH_SCORE_FILE)
    }

    #[test]
    fn test_missing_file_starts_at_zero() {
        let hs = HighScore::at(temp_path());
        assert_eq!(hs.best(), 0);
    }

    #[test]
    fn test_record_persists_only_improvements() {
        let path = temp_path();
        let mut hs = HighScore::at(&path);
        assert!(hs.record(50).unwrap());
        assert!(!hs.record(50).unwrap());
        assert!(!hs.record(20).unwrap());

        let reloaded = HighScore::at(&path);
        assert_eq!(reloaded.best(), 50);

        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_corrupt_file_starts_at_zero() {
        let path = temp_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json").unwrap();
        assert_eq!(HighScore::at(&path).best(), 0);
        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_in_memory_record() {
        let mut hs = HighScore::in_memory();
        assert!(hs.record(10).unwrap());
        assert_eq!(hs.best(), 10);
        assert!(hs.path().is_none());
    }
}
