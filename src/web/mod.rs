//! HTTP/JSON front of the score service.
//!
//! Routes:
//! - `GET /health`, `GET /api/health`
//! - `GET /api/scores[?limit=n]`
//! - `POST /api/scores` with `{"name", "score"}`
//! - `DELETE /api/scores`
//! - `GET /api/scores/player/:name`
//!
//! Run with:
//! ```sh
//! ./target/debug/music-runner serve              # Default port 3001
//! ./target/debug/music-runner serve --port 8080
//! ```
//!
//! ctrl-c or SIGTERM stops accepting and lets open requests finish.

pub mod http;
mod server;

pub use server::{
    parse_submission, start_score_server, BoundServer, HealthReport, ScoreServer,
    DEFAULT_READ_TIMEOUT, SHUTDOWN_GRACE,
};
