//! Music Runner game loop: input handling, fixed-step physics, scoring and
//! state transitions.

use super::collision::{check_collision, Aabb};
use super::physics::{
    advance_obstacles, advance_player, apply_jump, can_jump, ramp_speed, spawn_configured,
};
use super::types::*;
use rand::Rng;

/// Physics tick interval in milliseconds (~60 FPS).
pub const PHYSICS_TICK_MS: u64 = 16;

/// Longest wall-clock gap processed in one call, so a stalled frame cannot
/// trigger a burst of catch-up steps.
const MAX_FRAME_MS: u64 = 100;

/// UI-agnostic input actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerInput {
    /// Space / Up: start from the menu, jump while playing, restart after game over.
    Jump,
    /// Enter: start or restart without jumping.
    Start,
    Other,
}

/// What a single physics step produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepResult {
    pub obstacles_passed: u32,
    pub spawned: bool,
    pub game_over: bool,
}

/// Leave the menu (or a finished run) and begin a fresh session.
pub fn start_game(game: &mut RunnerGame) {
    game.reset();
    game.status = GameStatus::Playing;
}

/// Process player input.
pub fn process_input(game: &mut RunnerGame, input: RunnerInput) {
    match (game.status, input) {
        (GameStatus::Menu | GameStatus::GameOver, RunnerInput::Jump | RunnerInput::Start) => {
            start_game(game);
        }
        (GameStatus::Playing, RunnerInput::Jump) => {
            game.jump_queued = true;
        }
        _ => {}
    }
}

/// Advance the simulation. Called from the main loop with the wall-clock time
/// since the previous call.
///
/// Steps physics in fixed 16ms increments and stops stepping as soon as the run
/// ends. Returns true if any step ran.
pub fn tick_runner<R: Rng>(game: &mut RunnerGame, dt_ms: u64, rng: &mut R) -> bool {
    if game.status != GameStatus::Playing {
        return false;
    }

    game.accumulated_time_ms += dt_ms.min(MAX_FRAME_MS);
    let mut changed = false;

    while game.accumulated_time_ms >= PHYSICS_TICK_MS {
        game.accumulated_time_ms -= PHYSICS_TICK_MS;
        step_physics(game, rng);
        changed = true;

        if game.status != GameStatus::Playing {
            game.accumulated_time_ms = 0;
            break;
        }
    }

    changed
}

/// Single physics step (16ms tick). No-op unless the session is playing.
pub fn step_physics<R: Rng>(game: &mut RunnerGame, rng: &mut R) -> StepResult {
    let mut result = StepResult::default();
    if game.status != GameStatus::Playing {
        return result;
    }

    let config = game.config;
    game.tick_count += 1;

    // 1. Consume buffered jump
    if game.jump_queued {
        game.velocity = apply_jump(
            game.velocity,
            can_jump(&config, game.player_y),
            config.jump_strength,
        );
        game.jump_queued = false;
    }

    // 2. Gravity and movement
    let (player_y, velocity) =
        advance_player(game.player_y, game.velocity, config.gravity, config.floor_y());
    game.player_y = player_y;
    game.velocity = velocity;

    if config.jump_rule == JumpRule::Flap && game.is_on_floor() {
        end_run(game, GameOverCause::Floor);
        result.game_over = true;
        return result;
    }

    // 3. Scroll and ramp
    game.obstacles = advance_obstacles(std::mem::take(&mut game.obstacles), game.speed);
    game.speed = ramp_speed(game.speed, game.tick_count, &config);

    // 4. Spawn
    game.spawn_timer += 1;
    if game.spawn_timer > config.spawn_interval {
        game.obstacles.push(spawn_configured(rng, &config));
        game.spawn_timer = 0;
        result.spawned = true;
    }

    // 5. Score obstacles whose right edge is behind the player
    for obstacle in &mut game.obstacles {
        if !obstacle.scored && obstacle.right() < config.player_x {
            obstacle.scored = true;
            game.obstacles_passed += 1;
            game.score += POINTS_PER_OBSTACLE;
            result.obstacles_passed += 1;
        }
    }

    // 6. Collisions
    let player = player_box(game);
    if game.obstacles.iter().any(|o| check_collision(&player, o)) {
        end_run(game, GameOverCause::Collision);
        result.game_over = true;
    }

    result
}

/// The player's current bounding box.
pub fn player_box(game: &RunnerGame) -> Aabb {
    Aabb::new(
        game.config.player_x,
        game.player_y,
        game.config.player_size,
        game.config.player_size,
    )
}

fn end_run(game: &mut RunnerGame, cause: GameOverCause) {
    game.status = GameStatus::GameOver;
    game.game_over_cause = Some(cause);
    game.final_score = Some(game.score);
    game.jump_queued = false;
}

/// Hand out the final score for submission. Returns `Some` at most once per
/// session, and only after the run has ended.
pub fn take_submission(game: &mut RunnerGame) -> Option<u32> {
    if game.status != GameStatus::GameOver || game.submission_taken {
        return None;
    }
    let score = game.final_score?;
    game.submission_taken = true;
    Some(score)
}

/// Alternative score formula from elapsed time and obstacles passed:
/// ten points per obstacle plus one per whole second alive.
pub fn calculate_score(time_alive_ms: u64, obstacles_passed: u32) -> u64 {
    obstacles_passed as u64 * POINTS_PER_OBSTACLE as u64 + time_alive_ms / 1000
}
