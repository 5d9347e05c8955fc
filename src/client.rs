//! Blocking HTTP client for a remote score server.
//!
//! Used by the terminal game to submit finished runs and fetch the leaderboard.

use crate::error::ScoreError;
use crate::scores::{LeaderboardRow, ScoreEntry, SubmitReceipt, DEFAULT_TOP_LIMIT};
use crate::web::http::percent_encode;
use crate::web::HealthReport;
use serde::Deserialize;
use std::time::Duration;

/// Default base URL, matching `music-runner serve` on its default port.
pub const DEFAULT_API_URL: &str = "http://localhost:3001/api";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
const USER_AGENT: &str = concat!("music-runner/", env!("CARGO_PKG_VERSION"));

#[derive(Deserialize)]
struct SubmitResponse {
    rank: u64,
    score: ScoreEntry,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

pub struct ScoreClient {
    agent: ureq::Agent,
    base_url: String,
}

impl ScoreClient {
    /// `base_url` points at the API root, e.g. `http://host:3001/api`.
    pub fn new(base_url: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn submit_score(&self, name: &str, score: u32) -> Result<SubmitReceipt, ScoreError> {
        let url = format!("{}/scores", self.base_url);
        let response = self
            .agent
            .post(&url)
            .send_json(serde_json::json!({ "name": name, "score": score }))
            .map_err(map_ureq_error)?;
        let body: SubmitResponse = response.into_json().map_err(transport)?;
        Ok(SubmitReceipt {
            rank: body.rank,
            stored: body.score,
        })
    }

    pub fn fetch_top_scores(&self, limit: usize) -> Result<Vec<LeaderboardRow>, ScoreError> {
        let url = format!("{}/scores", self.base_url);
        let limit = limit.clamp(1, DEFAULT_TOP_LIMIT).to_string();
        self.agent
            .get(&url)
            .query("limit", &limit)
            .call()
            .map_err(map_ureq_error)?
            .into_json()
            .map_err(transport)
    }

    pub fn fetch_player_best(&self, name: &str) -> Result<ScoreEntry, ScoreError> {
        let url = format!("{}/scores/player/{}", self.base_url, percent_encode(name));
        self.agent
            .get(&url)
            .call()
            .map_err(map_ureq_error)?
            .into_json()
            .map_err(transport)
    }

    /// `GET /api/health`.
    pub fn health(&self) -> Result<HealthReport, ScoreError> {
        let url = format!("{}/health", self.base_url);
        self.agent
            .get(&url)
            .call()
            .map_err(map_ureq_error)?
            .into_json()
            .map_err(transport)
    }
}

fn transport(e: impl std::fmt::Display) -> ScoreError {
    ScoreError::Transport(e.to_string())
}

/// Rebuild the server's error from its status code and `{"error": ...}` body.
fn map_ureq_error(err: ureq::Error) -> ScoreError {
    match err {
        ureq::Error::Status(code, response) => {
            let message = response
                .into_json::<ErrorBody>()
                .map(|b| b.error)
                .unwrap_or_else(|_| format!("HTTP {}", code));
            match code {
                400 => ScoreError::Validation(message),
                404 => ScoreError::NotFound(message),
                _ => ScoreError::Storage(message),
            }
        }
        ureq::Error::Transport(t) => ScoreError::Transport(t.to_string()),
    }
}
