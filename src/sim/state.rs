//! Player state and kinematics
//!
//! The player runs along +z. Each tick it integrates its position from the
//! four movement intents, and it owns the only path through the
//! Alive → Dying → Dead life cycle.

use std::f32::consts::FRAC_PI_2;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::geometry::{Rotation, Transform};
use crate::consts::*;
use crate::settings::Settings;
use crate::{approach, heading_to_vector};

/// Player life cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LifeState {
    /// Running and steerable
    Alive,
    /// Hit something; death animation plays until the grace period ends
    Dying { time_of_death: f32 },
    /// Run is over
    Dead,
}

impl LifeState {
    #[inline]
    pub fn is_alive(&self) -> bool {
        matches!(self, LifeState::Alive)
    }
}

/// Movement intents for a single tick
///
/// Forward wins over backward and left wins over right when both are set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementIntent {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl MovementIntent {
    /// Hold forward, no steering
    pub fn run() -> Self {
        Self {
            forward: true,
            ..Default::default()
        }
    }
}

/// Kinematic limits copied out of [`Settings`] at construction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerTuning {
    pub max_speed: f32,
    pub forward_accel: f32,
    pub death_recoil_speed: f32,
    pub death_grace: f32,
    pub reverse_enabled: bool,
}

impl From<&Settings> for PlayerTuning {
    fn from(settings: &Settings) -> Self {
        Self {
            max_speed: settings.max_speed,
            forward_accel: settings.forward_accel,
            death_recoil_speed: settings.death_recoil_speed,
            death_grace: settings.death_grace,
            reverse_enabled: settings.reverse_enabled,
        }
    }
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

/// The runner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub position: Vec3,
    /// Signed; negative only while dying
    pub speed: f32,
    /// Heading angle (radians); 0 runs along +z
    pub bearing: f32,
    pub rotation: Rotation,
    life_state: LifeState,
    /// Kept once dead so presentation can still time the death animation
    died_at: Option<f32>,
    tuning: PlayerTuning,
}

impl Default for Player {
    fn default() -> Self {
        Self::new(START_SPEED, PlayerTuning::default())
    }
}

impl Player {
    pub fn new(speed: f32, tuning: PlayerTuning) -> Self {
        Self {
            position: Vec3::ZERO,
            speed: speed.min(tuning.max_speed),
            bearing: 0.0,
            rotation: Rotation::ZERO,
            life_state: LifeState::Alive,
            died_at: None,
            tuning,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.start_speed, PlayerTuning::from(settings))
    }

    #[inline]
    pub fn life_state(&self) -> LifeState {
        self.life_state
    }

    /// Run time at which the player died, if it has; survives into `Dead`
    pub fn time_of_death(&self) -> Option<f32> {
        self.died_at
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.life_state == LifeState::Dead
    }

    pub fn transform(&self) -> Transform {
        Transform {
            translation: self.position,
            rotation: self.rotation,
        }
    }

    /// Angle of travel in the ground plane; bearing 0 faces +z
    #[inline]
    fn travel_angle(&self) -> f32 {
        self.bearing + FRAC_PI_2
    }

    /// Direction of travel in the ground plane
    pub fn forward_dir(&self) -> Vec3 {
        heading_to_vector(self.travel_angle())
    }

    /// Direction of a left strafe, a quarter turn clockwise from travel
    pub fn left_dir(&self) -> Vec3 {
        heading_to_vector(self.travel_angle() - FRAC_PI_2)
    }

    /// Advance the player by one tick
    ///
    /// `now` is the run time after this tick's clock advance; it drives the
    /// death timer. Returns the life state after integration.
    pub fn integrate(&mut self, dt: f32, intent: &MovementIntent, now: f32) -> LifeState {
        match self.life_state {
            LifeState::Dead => {}
            LifeState::Dying { time_of_death } => {
                if now - time_of_death >= self.tuning.death_grace {
                    self.life_state = LifeState::Dead;
                    log::info!("Player dead at t={:.2}s, z={:.1}", now, self.position.z);
                }
            }
            LifeState::Alive => self.integrate_alive(dt, intent),
        }
        self.life_state
    }

    fn integrate_alive(&mut self, dt: f32, intent: &MovementIntent) {
        // Step with the speed held at the start of the tick
        let step = self.speed * dt;
        let forward = self.forward_dir();
        let left = self.left_dir();

        if intent.forward {
            self.position += forward * step;
        } else if intent.backward && self.tuning.reverse_enabled {
            self.position -= forward * step * REVERSE_FACTOR;
        }

        let steer = dt.min(1.0);
        if intent.left {
            self.position += left * step * STRAFE_FACTOR;
            self.rotation.y = approach(self.rotation.y, STEER_YAW, steer);
            self.rotation.z = approach(self.rotation.z, -STEER_BANK, steer);
        } else if intent.right {
            self.position -= left * step * STRAFE_FACTOR;
            self.rotation.y = approach(self.rotation.y, -STEER_YAW, steer);
            self.rotation.z = approach(self.rotation.z, STEER_BANK, steer);
        } else {
            let keep = (1.0 - ROTATION_DECAY * dt).max(0.0);
            self.rotation.y *= keep;
            self.rotation.z *= keep;
        }

        let speed = self.speed + self.tuning.forward_accel * dt;
        self.speed = speed.min(self.tuning.max_speed);
    }

    /// Start dying at run time `now`
    ///
    /// Only the first call has an effect; returns whether the state changed.
    pub fn die(&mut self, now: f32) -> bool {
        if !self.life_state.is_alive() {
            return false;
        }
        self.life_state = LifeState::Dying { time_of_death: now };
        self.died_at = Some(now);
        self.speed = self.tuning.death_recoil_speed;
        log::info!(
            "Player hit at t={:.2}s, position=({:.1}, {:.1})",
            now,
            self.position.x,
            self.position.z
        );
        true
    }
}
