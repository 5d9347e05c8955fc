//! Axis-aligned bounding-box collision between the player and obstacles.

use super::types::Obstacle;

/// An axis-aligned rectangle. `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Aabb {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// True if the horizontal extents intersect. Touching edges do not count.
    pub fn overlaps_horizontally(&self, left: f64, right: f64) -> bool {
        self.x < right && self.right() > left
    }

    /// Strict overlap on both axes.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.overlaps_horizontally(other.x, other.right())
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

/// True when the player shares columns with the obstacle and does not fit
/// inside its gap.
pub fn check_collision(player: &Aabb, obstacle: &Obstacle) -> bool {
    if !player.overlaps_horizontally(obstacle.x, obstacle.right()) {
        return false;
    }
    player.y < obstacle.gap_y || player.bottom() > obstacle.gap_end()
}

/// The two solid columns of an obstacle inside a playfield of `height`.
pub fn obstacle_columns(obstacle: &Obstacle, height: f64) -> [Aabb; 2] {
    [
        Aabb::new(obstacle.x, 0.0, obstacle.width, obstacle.gap_y),
        Aabb::new(
            obstacle.x,
            obstacle.gap_end(),
            obstacle.width,
            (height - obstacle.gap_end()).max(0.0),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obstacle_at(x: f64, gap_y: f64) -> Obstacle {
        Obstacle {
            x,
            width: 30.0,
            gap_y,
            gap_size: 150.0,
            scored: false,
        }
    }

    #[test]
    fn test_inside_gap_is_safe() {
        let player = Aabb::new(100.0, 200.0, 40.0, 40.0);
        assert!(!check_collision(&player, &obstacle_at(110.0, 150.0)));
    }

    #[test]
    fn test_above_gap_collides() {
        let player = Aabb::new(100.0, 120.0, 40.0, 40.0);
        assert!(check_collision(&player, &obstacle_at(110.0, 150.0)));
    }

    #[test]
    fn test_below_gap_collides() {
        // Gap spans 150..300; player bottom at 310
        let player = Aabb::new(100.0, 270.0, 40.0, 40.0);
        assert!(check_collision(&player, &obstacle_at(110.0, 150.0)));
    }

    #[test]
    fn test_no_horizontal_overlap_never_collides() {
        let player = Aabb::new(100.0, 0.0, 40.0, 40.0);
        assert!(!check_collision(&player, &obstacle_at(300.0, 150.0)));
        // Obstacle right edge exactly touching player's left edge
        assert!(!check_collision(&player, &obstacle_at(70.0, 150.0)));
    }

    #[test]
    fn test_gap_edges_fit_exactly() {
        let player = Aabb::new(100.0, 150.0, 40.0, 150.0);
        assert!(!check_collision(&player, &obstacle_at(100.0, 150.0)));
    }

    #[test]
    fn test_aabb_overlap() {
        let a = Aabb::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&Aabb::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!a.overlaps(&Aabb::new(10.0, 0.0, 10.0, 10.0)));
        assert!(!a.overlaps(&Aabb::new(0.0, 20.0, 10.0, 10.0)));
    }

    #[test]
    fn test_columns_agree_with_gap_check() {
        let obstacle = obstacle_at(110.0, 150.0);
        let columns = obstacle_columns(&obstacle, 500.0);
        assert!((columns[1].bottom() - 500.0).abs() < f64::EPSILON);

        for y in [0.0, 100.0, 130.0, 200.0, 260.0, 400.0] {
            let player = Aabb::new(100.0, y, 40.0, 40.0);
            let hits_column = columns.iter().any(|c| player.overlaps(c));
            assert_eq!(hits_column, check_collision(&player, &obstacle), "y = {}", y);
        }
    }
}
