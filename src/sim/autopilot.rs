//! Autopilot input
//!
//! Stands in for the keyboard in demo mode and headless runs: always runs
//! forward, dodges the nearest tree in its lane and drifts back toward the
//! centre line when close to a wall.

use super::collision::LateralBounds;
use super::obstacles::Obstacle;
use super::state::{MovementIntent, Player};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Autopilot {
    /// Half-width of the lane checked for trees
    pub lane_half_width: f32,
    /// Seconds of travel ahead that are scanned
    pub reaction_time: f32,
    /// Share of the half width past which the autopilot heads back to centre
    pub wall_margin: f32,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            lane_half_width: 30.0,
            reaction_time: 1.2,
            wall_margin: 0.8,
        }
    }
}

impl Autopilot {
    /// Pick this tick's intent
    pub fn intent(
        &self,
        player: &Player,
        obstacles: &[Obstacle],
        bounds: LateralBounds,
    ) -> MovementIntent {
        let mut intent = MovementIntent::run();
        let x = player.position.x;
        let z = player.position.z;
        let horizon = z + player.speed.max(0.0) * self.reaction_time + self.lane_half_width;

        let threat = obstacles
            .iter()
            .filter(|o| o.position.z >= z && o.position.z <= horizon)
            .filter(|o| (o.position.x - x).abs() <= self.lane_half_width)
            .min_by(|a, b| a.position.z.total_cmp(&b.position.z));

        let edge = bounds.half_width * self.wall_margin;
        if let Some(tree) = threat {
            // Left is +x; dodge to whichever side the tree is not on, unless
            // that side is already near the wall
            let go_left = if x > edge {
                false
            } else if x < -edge {
                true
            } else {
                tree.position.x <= x
            };
            intent.left = go_left;
            intent.right = !go_left;
        } else if x > edge {
            intent.right = true;
        } else if x < -edge {
            intent.left = true;
        }
        intent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::PlayerTuning;
    use glam::Vec3;

    fn tree(x: f32, z: f32) -> Obstacle {
        Obstacle::new(1, Vec3::new(x, 0.0, z), Vec3::new(15.0, 200.0, 15.0))
    }

    fn player_at(x: f32) -> Player {
        let mut player = Player::new(100.0, PlayerTuning::default());
        player.position.x = x;
        player
    }

    #[test]
    fn test_clear_road_runs_straight() {
        let pilot = Autopilot::default();
        let intent = pilot.intent(&player_at(0.0), &[], LateralBounds::new(375.0));
        assert_eq!(intent, MovementIntent::run());
    }

    #[test]
    fn test_dodges_tree_ahead() {
        let pilot = Autopilot::default();
        let bounds = LateralBounds::new(375.0);

        let intent = pilot.intent(&player_at(0.0), &[tree(5.0, 50.0)], bounds);
        assert!(intent.forward && intent.right && !intent.left);

        let intent = pilot.intent(&player_at(0.0), &[tree(-5.0, 50.0)], bounds);
        assert!(intent.left && !intent.right);
    }

    #[test]
    fn test_ignores_trees_behind_or_far() {
        let pilot = Autopilot::default();
        let trees = [tree(0.0, -50.0), tree(0.0, 5000.0), tree(200.0, 50.0)];
        let intent = pilot.intent(&player_at(0.0), &trees, LateralBounds::new(375.0));
        assert_eq!(intent, MovementIntent::run());
    }

    #[test]
    fn test_returns_from_walls() {
        let pilot = Autopilot::default();
        let bounds = LateralBounds::new(375.0);
        assert!(pilot.intent(&player_at(350.0), &[], bounds).right);
        assert!(pilot.intent(&player_at(-350.0), &[], bounds).left);

        // Near the left wall with a tree to the right: still heads right
        let intent = pilot.intent(&player_at(350.0), &[tree(340.0, 40.0)], bounds);
        assert!(intent.right);
    }
}
