//! Session orchestration: owns the running game, its RNG and everything that
//! happens at the game-over boundary (local record, leaderboard submission).

use super::high_score::HighScore;
use super::logic::{process_input, take_submission, tick_runner, RunnerInput};
use super::types::{GameStatus, PhysicsConfig, RunnerGame};
use crate::client::ScoreClient;
use crate::error::ScoreError;
use crate::scores::{LeaderboardRow, ScoreService, SubmitReceipt, DEFAULT_TOP_LIMIT};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Somewhere finished runs can be sent and the leaderboard read back from.
pub trait ScoreSubmitter {
    fn submit(&mut self, name: &str, score: u32) -> Result<SubmitReceipt, ScoreError>;
    fn top_scores(&mut self, limit: usize) -> Result<Vec<LeaderboardRow>, ScoreError>;
}

impl ScoreSubmitter for ScoreService {
    fn submit(&mut self, name: &str, score: u32) -> Result<SubmitReceipt, ScoreError> {
        self.submit_score(name, i64::from(score))
    }

    fn top_scores(&mut self, limit: usize) -> Result<Vec<LeaderboardRow>, ScoreError> {
        self.fetch_top_scores(limit)
    }
}

impl ScoreSubmitter for ScoreClient {
    fn submit(&mut self, name: &str, score: u32) -> Result<SubmitReceipt, ScoreError> {
        self.submit_score(name, score)
    }

    fn top_scores(&mut self, limit: usize) -> Result<Vec<LeaderboardRow>, ScoreError> {
        self.fetch_top_scores(limit)
    }
}

pub struct GameController {
    game: RunnerGame,
    rng: StdRng,
    player_name: String,
    high_score: HighScore,
    submitter: Option<Box<dyn ScoreSubmitter>>,
    leaderboard: Vec<LeaderboardRow>,
    /// Rank returned by the last successful submission.
    last_rank: Option<u64>,
    new_record: bool,
    /// Final score whose submission failed and can be retried.
    pending_submission: Option<u32>,
    status_message: Option<String>,
}

impl GameController {
    pub fn new(
        player_name: impl Into<String>,
        high_score: HighScore,
        submitter: Option<Box<dyn ScoreSubmitter>>,
    ) -> Self {
        Self::with_config(
            PhysicsConfig::default(),
            StdRng::from_entropy(),
            player_name,
            high_score,
            submitter,
        )
    }

    /// Full constructor; tests pass a seeded RNG for reproducible obstacles.
    pub fn with_config(
        config: PhysicsConfig,
        rng: StdRng,
        player_name: impl Into<String>,
        high_score: HighScore,
        submitter: Option<Box<dyn ScoreSubmitter>>,
    ) -> Self {
        Self {
            game: RunnerGame::new(config),
            rng,
            player_name: player_name.into(),
            high_score,
            submitter,
            leaderboard: Vec::new(),
            last_rank: None,
            new_record: false,
            pending_submission: None,
            status_message: None,
        }
    }

    pub fn game(&self) -> &RunnerGame {
        &self.game
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn high_score(&self) -> u32 {
        self.high_score.best()
    }

    pub fn leaderboard(&self) -> &[LeaderboardRow] {
        &self.leaderboard
    }

    pub fn last_rank(&self) -> Option<u64> {
        self.last_rank
    }

    pub fn is_new_record(&self) -> bool {
        self.new_record
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn is_online(&self) -> bool {
        self.submitter.is_some()
    }

    pub fn can_retry_submission(&self) -> bool {
        self.pending_submission.is_some()
    }

    pub fn handle_input(&mut self, input: RunnerInput) {
        let was_playing = self.game.status == GameStatus::Playing;
        process_input(&mut self.game, input);
        if !was_playing && self.game.status == GameStatus::Playing {
            self.last_rank = None;
            self.new_record = false;
            self.pending_submission = None;
            self.status_message = None;
        }
    }

    /// Advance by `dt_ms` of wall time. Returns true if the game state changed.
    pub fn tick(&mut self, dt_ms: u64) -> bool {
        let changed = tick_runner(&mut self.game, dt_ms, &mut self.rng);
        if self.game.status == GameStatus::GameOver {
            self.finish_run();
        }
        changed
    }

    /// Reload the leaderboard from the submitter, if any.
    pub fn refresh_leaderboard(&mut self) {
        let Some(submitter) = self.submitter.as_mut() else {
            return;
        };
        match submitter.top_scores(DEFAULT_TOP_LIMIT) {
            Ok(rows) => self.leaderboard = rows,
            Err(e) => {
                log::warn!("Failed to load leaderboard: {}", e);
                self.status_message = Some(format!("Leaderboard unavailable: {}", e));
            }
        }
    }

    /// Resubmit a score whose submission failed. Returns true on success.
    pub fn retry_submission(&mut self) -> bool {
        match self.pending_submission.take() {
            Some(score) => self.submit(score),
            None => false,
        }
    }

    /// Runs once per session: the submission latch hands out the score only once.
    fn finish_run(&mut self) {
        let Some(score) = take_submission(&mut self.game) else {
            return;
        };

        match self.high_score.record(score) {
            Ok(is_record) => self.new_record = is_record,
            Err(e) => {
                self.new_record = true;
                log::warn!("Failed to save high score: {}", e);
            }
        }

        self.submit(score);
    }

    fn submit(&mut self, score: u32) -> bool {
        let Some(submitter) = self.submitter.as_mut() else {
            self.status_message = Some("Offline: score not submitted".to_string());
            return false;
        };

        match submitter.submit(&self.player_name, score) {
            Ok(receipt) => {
                self.last_rank = Some(receipt.rank);
                self.status_message = Some(format!("Submitted! Rank #{}", receipt.rank));
                self.refresh_leaderboard();
                true
            }
            Err(e) => {
                log::warn!("Score submission failed: {}", e);
                if !matches!(e, ScoreError::Validation(_)) {
                    self.pending_submission = Some(score);
                }
                self.status_message = Some(format!("Submit failed: {}", e));
                false
            }
        }
    }
}
