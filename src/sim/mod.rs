//! Simulation module
//!
//! All gameplay logic lives here. Nothing in this module renders, polls
//! input devices or loads assets; those collaborators talk to it through
//! `MovementIntent`, `ReadyGate`, `BoundsProvider` and `SimEvent`.
//! Given a seed and a sequence of inputs, a run is deterministic.

pub mod assets;
pub mod autopilot;
pub mod clock;
pub mod collision;
pub mod events;
pub mod geometry;
pub mod obstacles;
pub mod resource;
pub mod state;
pub mod terrain;
pub mod tick;

pub use assets::{ReadyGate, Templates};
pub use autopilot::Autopilot;
pub use clock::Clock;
pub use collision::{CollisionResult, LateralBounds, check};
pub use events::{Observers, RunStats, SimEvent};
pub use geometry::{Aabb, BoundsProvider, Rotation, TemplateBounds, Transform};
pub use obstacles::{Obstacle, ObstacleDelta, ObstacleLayout, ObstacleStreamer};
pub use resource::Release;
pub use state::{LifeState, MovementIntent, Player, PlayerTuning};
pub use terrain::{
    PartKind, SegmentPart, StageLayout, TerrainDelta, TerrainSegment, TerrainStreamer,
};
pub use tick::{RunPhase, Simulation, TickInput, TickOutcome};
