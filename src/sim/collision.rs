//! Collision detection between the player and the world
//!
//! Two ways to end a run: leaving the corridor sideways, or running into a
//! tree. The check is read-only; the tick decides what to do with a hit.

use serde::{Deserialize, Serialize};

use super::geometry::Aabb;
use super::obstacles::Obstacle;

/// Lateral extent of the corridor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LateralBounds {
    pub half_width: f32,
}

impl LateralBounds {
    pub fn new(half_width: f32) -> Self {
        Self { half_width }
    }

    #[inline]
    pub fn contains(&self, x: f32) -> bool {
        (-self.half_width..=self.half_width).contains(&x)
    }
}

/// Result of a collision check
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CollisionResult {
    /// Nothing hit
    Clear,
    /// Player centre left the corridor
    Boundary { x: f32 },
    /// Player box overlaps a tree
    Obstacle { id: u32 },
}

impl CollisionResult {
    #[inline]
    pub fn is_hit(&self) -> bool {
        !matches!(self, CollisionResult::Clear)
    }
}

/// Check the player box against the corridor walls and every live obstacle
///
/// The boundary test wins over obstacles; among obstacles the first
/// overlapping one in slice order is reported.
pub fn check(player_box: &Aabb, obstacles: &[Obstacle], bounds: LateralBounds) -> CollisionResult {
    let x = player_box.center().x;
    if !bounds.contains(x) {
        return CollisionResult::Boundary { x };
    }

    obstacles
        .iter()
        .find(|obstacle| obstacle.bounding_box.intersects(player_box))
        .map_or(CollisionResult::Clear, |obstacle| {
            CollisionResult::Obstacle { id: obstacle.id }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn player_box(x: f32, z: f32) -> Aabb {
        Aabb::from_center_size(Vec3::new(x, 0.0, z), Vec3::new(20.0, 40.0, 20.0))
    }

    fn tree(id: u32, x: f32, z: f32) -> Obstacle {
        Obstacle::new(id, Vec3::new(x, 0.0, z), Vec3::new(15.0, 200.0, 15.0))
    }

    #[test]
    fn test_clear_when_nothing_near() {
        let trees = vec![tree(1, 100.0, 100.0), tree(2, -200.0, 30.0)];
        let result = check(&player_box(0.0, 0.0), &trees, LateralBounds::new(375.0));
        assert_eq!(result, CollisionResult::Clear);
        assert!(!result.is_hit());
    }

    #[test]
    fn test_boundary_hit() {
        let bounds = LateralBounds::new(375.0);
        assert_eq!(
            check(&player_box(375.0, 0.0), &[], bounds),
            CollisionResult::Clear
        );
        assert!(matches!(
            check(&player_box(375.5, 0.0), &[], bounds),
            CollisionResult::Boundary { .. }
        ));
        assert!(check(&player_box(-400.0, 0.0), &[], bounds).is_hit());
    }

    #[test]
    fn test_obstacle_hit_reports_first() {
        let trees = vec![tree(1, 100.0, 100.0), tree(2, 5.0, 10.0), tree(3, 0.0, 0.0)];
        let result = check(&player_box(0.0, 0.0), &trees, LateralBounds::new(375.0));
        assert_eq!(result, CollisionResult::Obstacle { id: 2 });
    }

    #[test]
    fn test_near_miss() {
        // Player half-width 10 + tree half-width 7.5 = 17.5
        let bounds = LateralBounds::new(375.0);
        let player = player_box(0.0, 0.0);
        assert!(!check(&player, &[tree(1, 18.0, 0.0)], bounds).is_hit());
        assert!(check(&player, &[tree(1, 17.0, 0.0)], bounds).is_hit());
    }
}
