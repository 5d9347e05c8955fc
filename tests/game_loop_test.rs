//! Integration test: runner game loop
//!
//! Drives whole sessions through the public API: fixed-step ticking,
//! obstacle flow, scoring, game over and restart.

use music_runner::game::{
    check_collision, player_box, process_input, start_game, step_physics, take_submission,
    tick_runner, Aabb, GameOverCause, GameStatus, JumpRule, Obstacle, PhysicsConfig, RunnerGame,
    RunnerInput, PHYSICS_TICK_MS, POINTS_PER_OBSTACLE,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// A softer jump so the autopilot's bounce fits comfortably inside a gap.
fn autopilot_game() -> RunnerGame {
    let mut game = RunnerGame::new(PhysicsConfig {
        jump_strength: -8.0,
        ..PhysicsConfig::default()
    });
    start_game(&mut game);
    game
}

/// Keep the player inside the current gap (or mid-field when no obstacle is
/// close) by flapping whenever it sinks below the target line.
fn autopilot(game: &mut RunnerGame) {
    let target = game
        .obstacles
        .iter()
        .find(|o| o.right() >= game.config.player_x)
        .map(|o| o.gap_y + o.gap_size / 2.0 - game.config.player_size / 2.0)
        .unwrap_or(game.config.playfield_height / 2.0);
    if game.player_y > target && game.velocity >= 0.0 {
        process_input(game, RunnerInput::Jump);
    }
}

// =============================================================================
// State transitions
// =============================================================================

#[test]
fn test_menu_to_playing_to_game_over_to_restart() {
    let mut game = RunnerGame::default();
    let mut rng = rng(1);
    assert_eq!(game.status, GameStatus::Menu);

    // Ticks do nothing on the menu
    assert!(!tick_runner(&mut game, 1000, &mut rng));

    process_input(&mut game, RunnerInput::Jump);
    assert_eq!(game.status, GameStatus::Playing);

    // Without input the player falls to the floor
    for _ in 0..200 {
        tick_runner(&mut game, PHYSICS_TICK_MS, &mut rng);
    }
    assert_eq!(game.status, GameStatus::GameOver);
    assert_eq!(game.game_over_cause, Some(GameOverCause::Floor));
    assert_eq!(game.final_score, Some(0));

    // Frozen after game over
    let ticks = game.tick_count;
    tick_runner(&mut game, 500, &mut rng);
    assert_eq!(game.tick_count, ticks);

    process_input(&mut game, RunnerInput::Start);
    assert_eq!(game.status, GameStatus::Playing);
    assert_eq!(game.score, 0);
    assert_eq!(game.tick_count, 0);
    assert!(game.obstacles.is_empty());
    assert_eq!(game.player_y, game.config.player_start_y);
    assert_eq!(game.speed, game.config.initial_speed);
}

#[test]
fn test_accumulator_runs_whole_ticks_only() {
    let mut game = RunnerGame::default();
    start_game(&mut game);
    let mut rng = rng(2);

    tick_runner(&mut game, 10, &mut rng);
    assert_eq!(game.tick_count, 0);
    tick_runner(&mut game, 10, &mut rng);
    assert_eq!(game.tick_count, 1);
    assert_eq!(game.accumulated_time_ms, 4);

    // Stalls are clamped so a long pause cannot fast-forward the run
    tick_runner(&mut game, 10_000, &mut rng);
    assert!(game.tick_count <= 1 + 100 / PHYSICS_TICK_MS + 1);
}

// =============================================================================
// Obstacles and scoring
// =============================================================================

#[test]
fn test_autopilot_scores_ten_per_obstacle() {
    let mut game = autopilot_game();
    let mut rng = rng(3);

    for _ in 0..1500 {
        autopilot(&mut game);
        step_physics(&mut game, &mut rng);
        if game.status != GameStatus::Playing {
            break;
        }
    }

    assert!(game.obstacles_passed >= 3, "passed {}", game.obstacles_passed);
    assert_eq!(game.score, game.obstacles_passed * POINTS_PER_OBSTACLE);
    // Each obstacle is counted once
    assert!(game
        .obstacles
        .iter()
        .filter(|o| o.right() < game.config.player_x)
        .all(|o| o.scored));
}

#[test]
fn test_spawned_gaps_stay_inside_margins() {
    let mut game = autopilot_game();
    let mut rng = rng(4);
    let config = game.config;

    for _ in 0..3000 {
        autopilot(&mut game);
        let result = step_physics(&mut game, &mut rng);
        if result.spawned {
            let newest = game.obstacles.last().unwrap();
            assert!(newest.gap_y >= config.gap_margin);
            assert!(newest.gap_end() <= config.playfield_height - config.gap_margin);
            assert_eq!(newest.x, config.playfield_width);
        }
        if game.status != GameStatus::Playing {
            break;
        }
    }
}

#[test]
fn test_speed_ramps_and_caps() {
    let mut game = autopilot_game();
    let mut rng = rng(5);
    let mut last_speed = game.speed;

    for _ in 0..20_000 {
        autopilot(&mut game);
        step_physics(&mut game, &mut rng);
        assert!(game.speed >= last_speed);
        last_speed = game.speed;
        if game.status != GameStatus::Playing {
            break;
        }
    }
    assert!(game.speed <= game.config.max_speed);
}

// =============================================================================
// Collision
// =============================================================================

#[test]
fn test_collision_against_gap() {
    let obstacle = Obstacle {
        x: 90.0,
        width: 30.0,
        gap_y: 200.0,
        gap_size: 150.0,
        scored: false,
    };

    // Inside the gap
    assert!(!check_collision(&Aabb::new(100.0, 250.0, 40.0, 40.0), &obstacle));
    // Poking above the gap
    assert!(check_collision(&Aabb::new(100.0, 190.0, 40.0, 40.0), &obstacle));
    // Below the gap
    assert!(check_collision(&Aabb::new(100.0, 330.0, 40.0, 40.0), &obstacle));
    // No horizontal overlap
    assert!(!check_collision(&Aabb::new(300.0, 0.0, 40.0, 40.0), &obstacle));
}

#[test]
fn test_hitting_a_column_ends_run() {
    let mut game = RunnerGame::default();
    start_game(&mut game);
    game.obstacles.push(Obstacle {
        x: game.config.player_x + 5.0,
        width: game.config.playfield_width,
        gap_y: 0.0,
        gap_size: 10.0,
        scored: false,
    });
    let before = player_box(&game);
    assert!(before.y > 10.0);

    step_physics(&mut game, &mut rng(6));
    assert_eq!(game.status, GameStatus::GameOver);
    assert_eq!(game.game_over_cause, Some(GameOverCause::Collision));
}

// =============================================================================
// Grounded rule and submission latch
// =============================================================================

#[test]
fn test_grounded_rule_floor_is_safe() {
    let config = PhysicsConfig {
        jump_rule: JumpRule::Grounded,
        ..PhysicsConfig::default()
    };
    let mut game = RunnerGame::new(config);
    start_game(&mut game);
    let mut rng = rng(7);

    for _ in 0..100 {
        step_physics(&mut game, &mut rng);
    }
    assert_eq!(game.status, GameStatus::Playing);
    assert!(game.is_on_floor());

    // Jump from the floor, then a mid-air jump is ignored
    process_input(&mut game, RunnerInput::Jump);
    step_physics(&mut game, &mut rng);
    assert!(game.velocity < 0.0);
    let airborne_velocity = game.velocity;
    process_input(&mut game, RunnerInput::Jump);
    step_physics(&mut game, &mut rng);
    assert!(game.velocity > airborne_velocity);
}

#[test]
fn test_submission_taken_once_per_session() {
    let mut game = RunnerGame::default();
    let mut rng = rng(8);
    start_game(&mut game);
    assert_eq!(take_submission(&mut game), None);

    while game.status == GameStatus::Playing {
        tick_runner(&mut game, PHYSICS_TICK_MS, &mut rng);
    }
    assert_eq!(take_submission(&mut game), Some(0));
    assert_eq!(take_submission(&mut game), None);

    start_game(&mut game);
    while game.status == GameStatus::Playing {
        tick_runner(&mut game, PHYSICS_TICK_MS, &mut rng);
    }
    assert_eq!(take_submission(&mut game), Some(0));
}
