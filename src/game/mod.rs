//! Music Runner game: physics, collision, the fixed-step loop and the session
//! controller that talks to the leaderboard.

pub mod collision;
pub mod controller;
pub mod high_score;
pub mod logic;
pub mod physics;
pub mod types;

pub use collision::{check_collision, Aabb};
pub use controller::{GameController, ScoreSubmitter};
pub use high_score::HighScore;
pub use logic::{
    calculate_score, player_box, process_input, start_game, step_physics, take_submission,
    tick_runner, RunnerInput, StepResult, PHYSICS_TICK_MS,
};
pub use types::*;
