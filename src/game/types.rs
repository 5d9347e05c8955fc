//! Music Runner session data structures.
//!
//! A real-time arcade game where the player keeps a note airborne and threads
//! it through the gaps of scrolling obstacles.

use serde::{Deserialize, Serialize};

/// Playfield dimensions in world units.
pub const PLAYFIELD_WIDTH: f64 = 800.0;
pub const PLAYFIELD_HEIGHT: f64 = 500.0;

/// Player fixed horizontal position (left edge) and square size.
pub const PLAYER_X: f64 = 100.0;
pub const PLAYER_SIZE: f64 = 40.0;

/// Obstacle width and gap defaults.
pub const OBSTACLE_WIDTH: f64 = 30.0;
pub const GAP_SIZE: f64 = 150.0;
pub const GAP_MARGIN: f64 = 50.0;

/// Player starting height (top edge).
pub const PLAYER_START_Y: f64 = 250.0;

/// Points awarded for each obstacle passed.
pub const POINTS_PER_OBSTACLE: u32 = 10;

/// Which positions allow a jump and what the floor means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JumpRule {
    /// Jump at any height below the ceiling. Touching the floor ends the run.
    #[default]
    Flap,
    /// Jump only while standing on the floor. The floor is safe ground.
    Grounded,
}

/// Tunable simulation parameters. Per-tick quantities assume a 16ms step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsConfig {
    pub playfield_width: f64,
    pub playfield_height: f64,
    pub player_x: f64,
    pub player_size: f64,
    pub player_start_y: f64,
    /// Downward acceleration (velocity change per tick).
    pub gravity: f64,
    /// Velocity override on jump, negative = upward.
    pub jump_strength: f64,
    pub obstacle_width: f64,
    pub gap_size: f64,
    /// Minimum distance kept between a gap and the ceiling or floor.
    pub gap_margin: f64,
    /// Scroll speed at session start, units per tick.
    pub initial_speed: f64,
    pub max_speed: f64,
    /// Ticks between speed increases (0 disables ramping).
    pub speed_ramp_interval: u64,
    pub speed_ramp_step: f64,
    /// Spawn a new obstacle once the spawn timer exceeds this many ticks.
    pub spawn_interval: u32,
    pub jump_rule: JumpRule,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            playfield_width: PLAYFIELD_WIDTH,
            playfield_height: PLAYFIELD_HEIGHT,
            player_x: PLAYER_X,
            player_size: PLAYER_SIZE,
            player_start_y: PLAYER_START_Y,
            gravity: 0.6,
            jump_strength: -12.0,
            obstacle_width: OBSTACLE_WIDTH,
            gap_size: GAP_SIZE,
            gap_margin: GAP_MARGIN,
            initial_speed: 5.0,
            max_speed: 12.0,
            speed_ramp_interval: 500,
            speed_ramp_step: 0.5,
            // 2 seconds at ~60 ticks per second
            spawn_interval: 120,
            jump_rule: JumpRule::Flap,
        }
    }
}

impl PhysicsConfig {
    /// Lowest position (top edge) the player can occupy.
    pub fn floor_y(&self) -> f64 {
        (self.playfield_height - self.player_size).max(0.0)
    }
}

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Menu,
    Playing,
    GameOver,
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverCause {
    Collision,
    Floor,
}

/// A single obstacle: a top and bottom column separated by a gap.
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    /// Left edge (float for smooth scrolling).
    pub x: f64,
    pub width: f64,
    /// Top of the gap.
    pub gap_y: f64,
    pub gap_size: f64,
    /// Set once when the player has fully passed this obstacle.
    pub scored: bool,
}

impl Obstacle {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn gap_end(&self) -> f64 {
        self.gap_y + self.gap_size
    }
}

/// Main session state.
#[derive(Debug, Clone)]
pub struct RunnerGame {
    pub config: PhysicsConfig,
    pub status: GameStatus,
    pub game_over_cause: Option<GameOverCause>,

    // Player state
    /// Top edge of the player. 0 = ceiling, `config.floor_y()` = floor.
    pub player_y: f64,
    /// Vertical velocity in units/tick (positive = downward).
    pub velocity: f64,
    /// Jump input waiting to be consumed next physics tick.
    pub jump_queued: bool,

    // Obstacle state
    pub obstacles: Vec<Obstacle>,
    /// Ticks since the last spawn.
    pub spawn_timer: u32,
    /// Current scroll speed in units/tick.
    pub speed: f64,

    // Scoring
    pub score: u32,
    pub obstacles_passed: u32,
    /// Score frozen at the moment the run ended.
    pub final_score: Option<u32>,
    /// True once the final score has been handed off for submission.
    pub submission_taken: bool,

    // Timing
    /// Sub-tick time accumulator (milliseconds).
    pub accumulated_time_ms: u64,
    /// Physics ticks elapsed this session.
    pub tick_count: u64,
}

impl RunnerGame {
    pub fn new(config: PhysicsConfig) -> Self {
        Self {
            config,
            status: GameStatus::Menu,
            game_over_cause: None,
            player_y: config.player_start_y,
            velocity: 0.0,
            jump_queued: false,
            obstacles: Vec::new(),
            spawn_timer: 0,
            speed: config.initial_speed,
            score: 0,
            obstacles_passed: 0,
            final_score: None,
            submission_taken: false,
            accumulated_time_ms: 0,
            tick_count: 0,
        }
    }

    /// Reset every mutable field to its session-start value, keeping the config.
    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }

    pub fn is_on_floor(&self) -> bool {
        self.player_y >= self.config.floor_y()
    }

    /// Elapsed play time derived from the tick counter.
    pub fn time_alive_ms(&self) -> u64 {
        self.tick_count * super::logic::PHYSICS_TICK_MS
    }
}

impl Default for RunnerGame {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_game_defaults() {
        let game = RunnerGame::default();
        assert_eq!(game.status, GameStatus::Menu);
        assert_eq!(game.score, 0);
        assert!(game.obstacles.is_empty());
        assert!((game.player_y - PLAYER_START_Y).abs() < f64::EPSILON);
        assert!((game.speed - 5.0).abs() < f64::EPSILON);
        assert!(game.final_score.is_none());
        assert!(!game.submission_taken);
    }

    #[test]
    fn test_floor_y() {
        let config = PhysicsConfig::default();
        assert!((config.floor_y() - 460.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reset_keeps_config() {
        let config = PhysicsConfig {
            gravity: 1.0,
            ..Default::default()
        };
        let mut game = RunnerGame::new(config);
        game.score = 40;
        game.player_y = 10.0;
        game.reset();
        assert_eq!(game.score, 0);
        assert!((game.config.gravity - 1.0).abs() < f64::EPSILON);
        assert!((game.player_y - PLAYER_START_Y).abs() < f64::EPSILON);
    }

    #[test]
    fn test_obstacle_edges() {
        let o = Obstacle {
            x: 10.0,
            width: 30.0,
            gap_y: 100.0,
            gap_size: 150.0,
            scored: false,
        };
        assert!((o.right() - 40.0).abs() < f64::EPSILON);
        assert!((o.gap_end() - 250.0).abs() < f64::EPSILON);
    }
}
