//! Obstacle streaming
//!
//! Trees live in a window that moves with the player. Anything more than one
//! look-ahead distance behind the player is culled, and the population is
//! topped back up to the visible target with trees dropped at random lateral
//! offsets between 0.75 and 2.75 look-aheads in front of the player.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geometry::Aabb;
use super::resource::Release;
use crate::settings::Settings;

/// Nearest spawn distance, in look-aheads
pub const SPAWN_NEAR: f32 = 0.75;
/// Farthest spawn distance, in look-aheads
pub const SPAWN_FAR: f32 = 2.75;

/// A tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub position: Vec3,
    /// Fixed at spawn; trees never move
    pub bounding_box: Aabb,
    released: bool,
}

impl Obstacle {
    pub fn new(id: u32, position: Vec3, size: Vec3) -> Self {
        Self {
            id,
            position,
            bounding_box: Aabb::from_center_size(position, size),
            released: false,
        }
    }
}

impl Release for Obstacle {
    fn release(&mut self) {
        debug_assert!(!self.released, "obstacle {} culled twice", self.id);
        self.released = true;
    }

    fn is_released(&self) -> bool {
        self.released
    }
}

/// Placement rules for the tree population
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleLayout {
    pub look_ahead: f32,
    pub half_width: f32,
    pub target: usize,
    pub tree_size: Vec3,
}

impl From<&Settings> for ObstacleLayout {
    fn from(settings: &Settings) -> Self {
        Self {
            look_ahead: settings.look_ahead,
            half_width: settings.half_width(),
            target: settings.visible_trees,
            tree_size: settings.tree_extent(),
        }
    }
}

/// What an obstacle reconcile changed
#[derive(Debug, Default)]
pub struct ObstacleDelta {
    /// Ids of new trees
    pub created: Vec<u32>,
    /// Trees that fell out of the window, already released
    pub culled: Vec<Obstacle>,
}

/// Owns the live tree population
///
/// Generic over the random source so tests can pin placement with a seed.
#[derive(Debug, Clone)]
pub struct ObstacleStreamer<R = Pcg32> {
    layout: ObstacleLayout,
    live: Vec<Obstacle>,
    next_id: u32,
    rng: R,
}

impl ObstacleStreamer<Pcg32> {
    /// Seeded from `settings.seed`, or from entropy when no seed is set
    pub fn from_settings(settings: &Settings) -> Self {
        let seed = settings.seed.unwrap_or_else(rand::random);
        Self::with_rng(ObstacleLayout::from(settings), Pcg32::seed_from_u64(seed))
    }
}

impl<R: Rng> ObstacleStreamer<R> {
    pub fn with_rng(layout: ObstacleLayout, rng: R) -> Self {
        Self {
            layout,
            live: Vec::with_capacity(layout.target),
            next_id: 1,
            rng,
        }
    }

    pub fn layout(&self) -> &ObstacleLayout {
        &self.layout
    }

    /// Live trees in spawn order
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.live
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Cull trees behind the window, then refill to the target
    ///
    /// A non-finite position leaves the population untouched.
    pub fn reconcile(&mut self, player_z: f32) -> ObstacleDelta {
        if !player_z.is_finite() {
            log::warn!("Ignoring obstacle reconcile at z={}", player_z);
            return ObstacleDelta::default();
        }
        let mut delta = ObstacleDelta {
            culled: self.cull(player_z),
            ..Default::default()
        };

        while self.live.len() < self.layout.target {
            let id = self.spawn(player_z);
            delta.created.push(id);
        }

        if !delta.created.is_empty() || !delta.culled.is_empty() {
            log::trace!(
                "Obstacles at z={:.1}: +{} -{} (live {})",
                player_z,
                delta.created.len(),
                delta.culled.len(),
                self.live.len()
            );
        }
        delta
    }

    fn cull(&mut self, player_z: f32) -> Vec<Obstacle> {
        let limit = player_z - self.layout.look_ahead;
        let (mut culled, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.live)
            .into_iter()
            .partition(|o| o.position.z < limit);
        self.live = kept;
        for obstacle in &mut culled {
            obstacle.release();
        }
        culled
    }

    fn spawn(&mut self, player_z: f32) -> u32 {
        let layout = &self.layout;
        let x = self.rng.random_range(-layout.half_width..=layout.half_width);
        let near = player_z + SPAWN_NEAR * layout.look_ahead;
        let far = player_z + SPAWN_FAR * layout.look_ahead;
        let z = self.rng.random_range(near..=far);

        let id = self.next_id;
        self.next_id += 1;
        self.live.push(Obstacle::new(id, Vec3::new(x, 0.0, z), layout.tree_size));
        id
    }
}
