//! World configuration
//!
//! Every run is built from one `Settings` value; restarting a run rebuilds all
//! simulation state from the same settings. Settings can be loaded from JSON,
//! missing fields fall back to the defaults in [`crate::consts`].

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Result, SimError};

/// World and player tuning for a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Stage ===
    /// Full lateral width of the corridor
    pub stage_width: f32,
    /// Forward length of one terrain segment
    pub stage_length: f32,
    /// Side wall height
    pub wall_height: f32,
    /// Side wall thickness
    pub wall_thickness: f32,

    // === Obstacles ===
    /// Obstacle visibility window
    pub look_ahead: f32,
    /// Trees kept alive around the player
    pub visible_trees: usize,
    /// Tree bounding box size
    pub tree_size: [f32; 3],

    // === Player ===
    /// Player bounding box size
    pub player_size: [f32; 3],
    /// Speed at run start
    pub start_speed: f32,
    /// Speed cap
    pub max_speed: f32,
    /// Forward acceleration
    pub forward_accel: f32,
    /// Speed while dying (negative = recoil)
    pub death_recoil_speed: f32,
    /// Seconds between death and the run ending
    pub death_grace: f32,
    /// Let the backward intent move the player (off by default)
    pub reverse_enabled: bool,

    // === Run ===
    /// Seed for obstacle placement (random when absent)
    pub seed: Option<u64>,
    /// Seconds after the run ends before the driver restarts it (never when absent)
    pub auto_restart_after: Option<f32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            stage_width: STAGE_WIDTH,
            stage_length: STAGE_LENGTH,
            wall_height: WALL_HEIGHT,
            wall_thickness: WALL_THICKNESS,

            look_ahead: LOOK_AHEAD,
            visible_trees: VISIBLE_TREES,
            tree_size: TREE_SIZE,

            player_size: PLAYER_SIZE,
            start_speed: START_SPEED,
            max_speed: MAX_SPEED,
            forward_accel: FORWARD_ACCEL,
            death_recoil_speed: DEATH_RECOIL_SPEED,
            death_grace: DEATH_GRACE,
            reverse_enabled: false,

            seed: None,
            auto_restart_after: None,
        }
    }
}

impl Settings {
    /// Parse settings from a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("stage_width", self.stage_width),
            ("stage_length", self.stage_length),
            ("look_ahead", self.look_ahead),
            ("max_speed", self.max_speed),
            ("death_grace", self.death_grace),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SimError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        let sizes = [
            ("tree_size", self.tree_size),
            ("player_size", self.player_size),
        ];
        for (name, size) in sizes {
            if size.iter().any(|v| !(v.is_finite() && *v > 0.0)) {
                return Err(SimError::InvalidConfig(format!(
                    "{name} components must be positive, got {size:?}"
                )));
            }
        }

        if !self.forward_accel.is_finite() || self.forward_accel < 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "forward_accel must be >= 0, got {}",
                self.forward_accel
            )));
        }
        if !self.start_speed.is_finite() || self.start_speed > self.max_speed {
            return Err(SimError::InvalidConfig(format!(
                "start_speed {} exceeds max_speed {}",
                self.start_speed, self.max_speed
            )));
        }
        if !self.death_recoil_speed.is_finite() {
            return Err(SimError::InvalidConfig(
                "death_recoil_speed must be finite".into(),
            ));
        }
        if self.visible_trees == 0 {
            return Err(SimError::InvalidConfig(
                "visible_trees must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Half of the corridor width (lateral bound)
    #[inline]
    pub fn half_width(&self) -> f32 {
        self.stage_width / 2.0
    }

    pub fn tree_extent(&self) -> Vec3 {
        Vec3::from_array(self.tree_size)
    }

    pub fn player_extent(&self) -> Vec3 {
        Vec3::from_array(self.player_size)
    }
}
