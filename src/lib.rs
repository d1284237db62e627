//! Endless Runner - simulation core for an endless-runner game
//!
//! Core modules:
//! - `sim`: Simulation (kinematics, collisions, terrain/obstacle streaming, tick)
//! - `driver`: Frame driver sitting between the platform loop and the simulation
//! - `settings`: Data-driven world configuration
//! - `error`: Error types shared by the whole crate

pub mod driver;
pub mod error;
pub mod settings;
pub mod sim;

pub use driver::FrameDriver;
pub use error::{Result, SimError};
pub use settings::Settings;

/// World configuration constants
pub mod consts {
    /// Full lateral width of a stage (player must stay within ± half of it)
    pub const STAGE_WIDTH: f32 = 750.0;
    /// Forward length of one terrain segment
    pub const STAGE_LENGTH: f32 = 5000.0;
    /// Height of the side walls flanking each segment
    pub const WALL_HEIGHT: f32 = 300.0;
    /// Thickness of the side walls
    pub const WALL_THICKNESS: f32 = 10.0;

    /// Obstacle visibility/culling window along the forward axis
    pub const LOOK_AHEAD: f32 = 1500.0;
    /// Number of trees kept alive around the player
    pub const VISIBLE_TREES: usize = 50;
    /// Tree bounding box template (x, y, z)
    pub const TREE_SIZE: [f32; 3] = [15.0, 200.0, 15.0];
    /// Player bounding box template (x, y, z)
    pub const PLAYER_SIZE: [f32; 3] = [20.0, 40.0, 20.0];

    /// Player speed cap
    pub const MAX_SPEED: f32 = 1000.0;
    /// Constant forward acceleration (units/s²)
    pub const FORWARD_ACCEL: f32 = 9.81;
    /// Speed the run starts with
    pub const START_SPEED: f32 = 100.0;
    /// Speed while the death animation plays
    pub const DEATH_RECOIL_SPEED: f32 = -15.0;
    /// Time between death and the run being over
    pub const DEATH_GRACE: f32 = 2.5;

    /// Share of the forward step applied when reversing
    pub const REVERSE_FACTOR: f32 = 1.0 / 3.0;
    /// Share of the forward step applied when strafing
    pub const STRAFE_FACTOR: f32 = 3.0 / 8.0;
    /// Yaw target while strafing
    pub const STEER_YAW: f32 = std::f32::consts::FRAC_PI_8;
    /// Bank target while strafing
    pub const STEER_BANK: f32 = std::f32::consts::PI / 16.0;
    /// Exponential decay rate of the visual rotation with no lateral input
    pub const ROTATION_DECAY: f32 = 2.0;

    /// Nominal display refresh used by the headless driver
    pub const FRAME_DT: f32 = 1.0 / 60.0;
    /// Largest frame delta forwarded to the simulation
    pub const MAX_FRAME_DT: f32 = 0.1;
}

/// Move `current` toward `target` by `fraction` of the remaining distance
#[inline]
pub fn approach(current: f32, target: f32, fraction: f32) -> f32 {
    current + (target - current) * fraction.clamp(0.0, 1.0)
}

/// Unit vector in the ground (x, z) plane for a heading angle
#[inline]
pub fn heading_to_vector(angle: f32) -> glam::Vec3 {
    glam::Vec3::new(angle.cos(), 0.0, angle.sin())
}
