//! Pure per-tick physics: player motion, jumping, obstacle spawning and scrolling.

use super::types::{JumpRule, Obstacle, PhysicsConfig};
use rand::Rng;

/// Apply gravity and move the player one tick.
///
/// Position is clamped to `[0, floor_y]`. Landing on the floor zeroes the
/// velocity; bumping the ceiling stops upward motion.
pub fn advance_player(position: f64, velocity: f64, gravity: f64, floor_y: f64) -> (f64, f64) {
    let mut velocity = velocity + gravity;
    let mut position = position + velocity;

    if position >= floor_y {
        position = floor_y;
        velocity = 0.0;
    } else if position <= 0.0 {
        position = 0.0;
        if velocity < 0.0 {
            velocity = 0.0;
        }
    }

    (position, velocity)
}

/// Replace the velocity with `jump_strength` when the player has footing.
pub fn apply_jump(velocity: f64, is_grounded: bool, jump_strength: f64) -> f64 {
    if is_grounded {
        jump_strength
    } else {
        velocity
    }
}

/// Whether a jump is allowed at `position` under the configured jump rule.
pub fn can_jump(config: &PhysicsConfig, position: f64) -> bool {
    match config.jump_rule {
        JumpRule::Flap => position > 0.0,
        JumpRule::Grounded => position >= config.floor_y(),
    }
}

/// Create an obstacle at the right edge with a uniformly placed gap.
///
/// The gap never leaves the playfield: an oversized gap is clamped to the
/// playfield height and the margin shrinks to whatever room is left.
pub fn spawn_obstacle<R: Rng>(
    rng: &mut R,
    playfield_height: f64,
    playfield_width: f64,
    width: f64,
    gap_size: f64,
    margin: f64,
) -> Obstacle {
    let gap_size = gap_size.clamp(0.0, playfield_height.max(0.0));
    let free = playfield_height - gap_size;
    let margin = margin.clamp(0.0, (free / 2.0).max(0.0));

    let min_gap_y = margin;
    let max_gap_y = free - margin;
    let gap_y = if max_gap_y > min_gap_y {
        rng.gen_range(min_gap_y..=max_gap_y)
    } else {
        min_gap_y
    };

    Obstacle {
        x: playfield_width,
        width,
        gap_y,
        gap_size,
        scored: false,
    }
}

/// Height range of ground blocks under the grounded jump rule.
pub const GROUND_OBSTACLE_MIN_HEIGHT: f64 = 30.0;
pub const GROUND_OBSTACLE_MAX_HEIGHT: f64 = 70.0;

/// A block standing on the floor, expressed as an obstacle whose gap spans
/// everything above it.
pub fn spawn_ground_obstacle<R: Rng>(
    rng: &mut R,
    playfield_height: f64,
    playfield_width: f64,
    width: f64,
) -> Obstacle {
    let height = rng
        .gen_range(GROUND_OBSTACLE_MIN_HEIGHT..=GROUND_OBSTACLE_MAX_HEIGHT)
        .min(playfield_height.max(0.0));
    Obstacle {
        x: playfield_width,
        width,
        gap_y: 0.0,
        gap_size: playfield_height - height,
        scored: false,
    }
}

/// Spawn using the session's configured dimensions: gap columns under the
/// flap rule, ground blocks under the grounded rule.
pub fn spawn_configured<R: Rng>(rng: &mut R, config: &PhysicsConfig) -> Obstacle {
    match config.jump_rule {
        JumpRule::Flap => spawn_obstacle(
            rng,
            config.playfield_height,
            config.playfield_width,
            config.obstacle_width,
            config.gap_size,
            config.gap_margin,
        ),
        JumpRule::Grounded => spawn_ground_obstacle(
            rng,
            config.playfield_height,
            config.playfield_width,
            config.obstacle_width,
        ),
    }
}

/// Scroll obstacles left by `speed` and drop those fully past the left edge.
pub fn advance_obstacles(mut obstacles: Vec<Obstacle>, speed: f64) -> Vec<Obstacle> {
    for obstacle in &mut obstacles {
        obstacle.x -= speed;
    }
    obstacles.retain(|o| o.right() >= 0.0);
    obstacles
}

/// Scroll speed after `tick_count` ticks: a step every `speed_ramp_interval`
/// ticks, capped at `max_speed`.
pub fn ramp_speed(speed: f64, tick_count: u64, config: &PhysicsConfig) -> f64 {
    if config.speed_ramp_interval == 0 || tick_count == 0 {
        return speed;
    }
    if tick_count % config.speed_ramp_interval == 0 {
        (speed + config.speed_ramp_step).min(config.max_speed)
    } else {
        speed
    }
}
