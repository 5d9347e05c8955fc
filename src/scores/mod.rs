//! Leaderboard: validation, ranking and persistence of finished runs.

pub mod service;
pub mod store;
pub mod types;

pub use service::ScoreService;
pub use store::{FileStore, MemoryStore, ScoreStore};
pub use types::*;
