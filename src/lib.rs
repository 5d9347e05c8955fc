//! Music Runner - a side-scrolling terminal runner with a shared leaderboard.
//!
//! The library exposes the game simulation, the score service and its HTTP
//! server and client so the binary and the integration tests share one API.

pub mod build_info;
pub mod client;
pub mod config;
pub mod error;
pub mod game;
pub mod scores;
pub mod ui;
pub mod web;
