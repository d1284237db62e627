//! Per-frame simulation tick
//!
//! One tick runs strictly in this order:
//! clock → player integration → collision (may kill the player) →
//! terrain reconcile → obstacle reconcile → publish events.
//! Streaming therefore always sees the post-collision player position.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::assets::Templates;
use super::clock::Clock;
use super::collision::{self, CollisionResult, LateralBounds};
use super::events::{Observers, RunStats, SimEvent};
use super::geometry::{BoundsProvider, TemplateBounds};
use super::obstacles::{Obstacle, ObstacleDelta, ObstacleLayout, ObstacleStreamer};
use super::state::{LifeState, MovementIntent, Player};
use super::terrain::{TerrainDelta, TerrainSegment, TerrainStreamer};
use crate::error::{Result, SimError};
use crate::settings::Settings;

/// Whether the run is still being simulated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Player not yet dead
    Running,
    /// Player dead; only the clock advances until restart
    Ended,
}

/// Input for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    pub intent: MovementIntent,
    /// Start a fresh run (only honoured once the current run has ended)
    pub restart: bool,
}

/// What happened during one tick
#[derive(Debug, Default)]
pub struct TickOutcome {
    pub collision: Option<CollisionResult>,
    /// Segments created/evicted; evicted ones are handed over for freeing
    pub terrain: TerrainDelta,
    /// Trees created/culled; culled ones are handed over for freeing
    pub obstacles: ObstacleDelta,
    pub restarted: bool,
}

/// Everything one run owns; rebuilt from scratch on restart
struct World<R> {
    clock: Clock,
    player: Player,
    terrain: TerrainStreamer,
    obstacles: ObstacleStreamer<R>,
    phase: RunPhase,
    stats: RunStats,
}

impl<R: Rng> World<R> {
    fn new(settings: &Settings, templates: &Templates, rng: R) -> Self {
        let layout = ObstacleLayout {
            tree_size: templates.tree_size,
            ..ObstacleLayout::from(settings)
        };
        let player = Player::from_settings(settings);
        let mut obstacles = ObstacleStreamer::with_rng(layout, rng);
        let mut terrain = TerrainStreamer::from_settings(settings);
        terrain.reconcile(player.position.z);
        obstacles.reconcile(player.position.z);

        Self {
            clock: Clock::new(),
            player,
            terrain,
            obstacles,
            phase: RunPhase::Running,
            stats: RunStats::default(),
        }
    }
}

/// The simulation core: owns the current run and its observers
///
/// Generic over the obstacle random source; each run is seeded through
/// `SeedableRng` so seeded runs are reproducible.
pub struct Simulation<R = Pcg32> {
    settings: Settings,
    templates: Templates,
    bounds: Box<dyn BoundsProvider>,
    observers: Observers,
    seed: u64,
    runs: u32,
    world: World<R>,
}

impl Simulation<Pcg32> {
    /// Build a run from validated settings and loaded templates
    pub fn new(settings: Settings, templates: Templates) -> Result<Self> {
        Self::with_seeded_rng(settings, templates)
    }
}

impl<R: Rng + SeedableRng> Simulation<R> {
    pub fn with_seeded_rng(settings: Settings, templates: Templates) -> Result<Self> {
        settings.validate()?;
        let seed = settings.seed.unwrap_or_else(rand::random);
        let world = World::new(&settings, &templates, R::seed_from_u64(seed));
        log::info!("Run 1 started (seed {})", seed);

        Ok(Self {
            bounds: Box::new(TemplateBounds::new(templates.player_size)),
            settings,
            templates,
            observers: Observers::new(),
            seed,
            runs: 1,
            world,
        })
    }

    /// Replace the player box provider
    pub fn set_bounds_provider(&mut self, bounds: impl BoundsProvider + 'static) {
        self.bounds = Box::new(bounds);
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&SimEvent) + 'static) {
        self.observers.subscribe(observer);
    }

    pub fn observers_mut(&mut self) -> &mut Observers {
        &mut self.observers
    }

    /// Discard the current run and build a fresh one from the same settings
    pub fn restart(&mut self) {
        self.seed = next_seed(self.seed);
        self.runs += 1;
        self.world = World::new(&self.settings, &self.templates, R::seed_from_u64(self.seed));
        log::info!("Run {} started (seed {})", self.runs, self.seed);
    }

    /// Advance the simulation by `dt` seconds
    ///
    /// Rejects negative or non-finite `dt`, and any `dt` that would carry the
    /// player past the representable range, without touching any state.
    pub fn tick(&mut self, dt: f32, input: &TickInput) -> Result<TickOutcome> {
        if self.world.phase == RunPhase::Running {
            let player = &self.world.player;
            let reach = player.position.z.abs() + player.speed.abs() * dt;
            if !reach.is_finite() {
                return Err(SimError::InvalidTimeStep(dt));
            }
        }
        let now = self.world.clock.advance(dt)?;
        let mut outcome = TickOutcome::default();
        let mut events = Vec::new();

        if input.restart && self.world.phase == RunPhase::Ended {
            self.restart();
            outcome.restarted = true;
        } else if self.world.phase == RunPhase::Running {
            self.step(dt, now, &input.intent, &mut outcome, &mut events);
        }

        events.push(SimEvent::TickCompleted {
            tick: self.world.clock.ticks(),
            time: self.world.clock.now(),
        });
        self.observers.publish(&events);
        Ok(outcome)
    }

    fn step(
        &mut self,
        dt: f32,
        now: f32,
        intent: &MovementIntent,
        outcome: &mut TickOutcome,
        events: &mut Vec<SimEvent>,
    ) {
        let bounds = LateralBounds::new(self.settings.half_width());
        let world = &mut self.world;
        let before = world.player.life_state();

        world.player.integrate(dt, intent, now);

        if world.player.life_state().is_alive() {
            let player_box = self.bounds.bounding_box(&world.player.transform());
            let result = collision::check(&player_box, world.obstacles.obstacles(), bounds);
            if result.is_hit() {
                world.player.die(now);
            }
            outcome.collision = Some(result);
        }

        let after = world.player.life_state();
        if after != before {
            events.push(SimEvent::LifeStateChanged {
                from: before,
                to: after,
                time: now,
            });
        }

        let player_z = world.player.position.z;
        outcome.terrain = world.terrain.reconcile(player_z);
        outcome.obstacles = world.obstacles.reconcile(player_z);

        events.extend(
            outcome
                .terrain
                .evicted
                .iter()
                .map(|s| SimEvent::SegmentEvicted { index: s.index }),
        );
        events.extend(
            outcome
                .terrain
                .created
                .iter()
                .map(|&index| SimEvent::SegmentCreated { index }),
        );

        let stats = &mut world.stats;
        stats.elapsed = now;
        stats.distance = stats.distance.max(player_z);
        stats.segments_streamed += outcome.terrain.created.len() as u32;
        if before.is_alive() {
            stats.obstacles_passed += outcome.obstacles.culled.len() as u32;
        }

        if after == LifeState::Dead {
            world.phase = RunPhase::Ended;
            log::info!(
                "Run {} ended: distance {:.0}, {:.1}s, {} trees passed",
                self.runs,
                stats.distance,
                stats.elapsed,
                stats.obstacles_passed
            );
            events.push(SimEvent::RunEnded { stats: *stats });
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn player(&self) -> &Player {
        &self.world.player
    }

    pub fn phase(&self) -> RunPhase {
        self.world.phase
    }

    pub fn stats(&self) -> &RunStats {
        &self.world.stats
    }

    /// Run time of the current run
    pub fn now(&self) -> f32 {
        self.world.clock.now()
    }

    /// Seed of the current run's obstacle layout
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Runs started so far, including the current one
    pub fn runs(&self) -> u32 {
        self.runs
    }

    pub fn segments(&self) -> impl ExactSizeIterator<Item = &TerrainSegment> {
        self.world.terrain.segments()
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        self.world.obstacles.obstacles()
    }

    pub fn lateral_bounds(&self) -> LateralBounds {
        LateralBounds::new(self.settings.half_width())
    }

    /// Player for tests that need to place it directly
    #[cfg(test)]
    pub(crate) fn player_mut(&mut self) -> &mut Player {
        &mut self.world.player
    }
}

/// Seed for the run after one seeded with `seed`
fn next_seed(seed: u64) -> u64 {
    seed.wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn seeded(seed: u64) -> Simulation {
        let settings = Settings {
            seed: Some(seed),
            ..Default::default()
        };
        let templates = Templates::from_settings(&settings);
        Simulation::new(settings, templates).unwrap()
    }

    fn run_input() -> TickInput {
        TickInput {
            intent: MovementIntent::run(),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_run_is_populated() {
        let sim = seeded(1);
        assert_eq!(sim.phase(), RunPhase::Running);
        assert_eq!(sim.segments().len(), 2);
        assert_eq!(sim.obstacles().len(), VISIBLE_TREES);
        assert!(sim.player().life_state().is_alive());
        assert_eq!(sim.now(), 0.0);
    }

    #[test]
    fn test_rejects_negative_dt() {
        let mut sim = seeded(1);
        assert!(sim.tick(-0.1, &run_input()).is_err());
        assert_eq!(sim.now(), 0.0);
        assert_eq!(sim.player().position.z, 0.0);
    }

    #[test]
    fn test_rejects_step_past_representable_range() {
        let mut sim = seeded(1);
        let err = sim.tick(f32::MAX, &run_input()).unwrap_err();
        assert!(matches!(err, SimError::InvalidTimeStep(_)));
        assert_eq!(sim.now(), 0.0);
        assert_eq!(sim.player().position.z, 0.0);
        assert_eq!(sim.segments().len(), 2);
    }

    #[test]
    fn test_huge_finite_step_stays_bounded() {
        let mut sim = seeded(1);
        let outcome = sim.tick(1.0e30, &run_input()).unwrap();
        assert!(sim.player().position.z.is_finite());
        assert_eq!(outcome.terrain.created.len(), 2);
        assert_eq!(outcome.terrain.evicted.len(), 2);
        assert_eq!(sim.segments().len(), 2);
        assert_eq!(sim.obstacles().len(), VISIBLE_TREES);
    }

    #[test]
    fn test_first_tick_moves_forward() {
        let mut sim = seeded(1);
        // Clear the way so nothing interferes
        sim.world.obstacles = ObstacleStreamer::with_rng(
            ObstacleLayout {
                target: 1,
                half_width: 0.0,
                ..ObstacleLayout::from(sim.settings())
            },
            Pcg32::seed_from_u64(0),
        );
        let outcome = sim.tick(0.1, &run_input()).unwrap();
        assert_eq!(outcome.collision, Some(CollisionResult::Clear));
        assert!((sim.player().position.z - 10.0).abs() < 1e-4);
        assert!(sim.player().position.x.abs() < 1e-4);
    }

    #[test]
    fn test_wall_hit_then_dead_after_grace() {
        let mut sim = seeded(2);
        sim.player_mut().position.x = 400.0;

        let outcome = sim.tick(0.1, &TickInput::default()).unwrap();
        assert!(matches!(
            outcome.collision,
            Some(CollisionResult::Boundary { .. })
        ));
        let died_at = sim.player().time_of_death().unwrap();
        assert!((died_at - 0.1).abs() < 1e-6);

        // 24 more ticks of 0.1 take elapsed to ~2.4s: still dying
        for _ in 0..24 {
            sim.tick(0.1, &TickInput::default()).unwrap();
        }
        assert!(matches!(sim.player().life_state(), LifeState::Dying { .. }));
        assert_eq!(sim.phase(), RunPhase::Running);

        sim.tick(0.2, &TickInput::default()).unwrap();
        assert!(sim.player().is_dead());
        assert_eq!(sim.phase(), RunPhase::Ended);
    }

    #[test]
    fn test_tree_hit() {
        let mut sim = seeded(3);
        let tree = sim.obstacles()[0].position;
        sim.player_mut().position = tree;
        let outcome = sim.tick(0.0, &TickInput::default()).unwrap();
        assert!(matches!(
            outcome.collision,
            Some(CollisionResult::Obstacle { .. })
        ));
        assert!(matches!(sim.player().life_state(), LifeState::Dying { .. }));
    }

    #[test]
    fn test_events_and_restart() {
        let mut sim = seeded(4);
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        sim.subscribe(move |e| sink.borrow_mut().push(e.clone()));

        sim.player_mut().position.x = -500.0;
        sim.tick(0.1, &TickInput::default()).unwrap();
        sim.tick(3.0, &TickInput::default()).unwrap();
        assert_eq!(sim.phase(), RunPhase::Ended);

        {
            let events = events.borrow();
            let changes: Vec<_> = events
                .iter()
                .filter_map(|e| match e {
                    SimEvent::LifeStateChanged { to, .. } => Some(*to),
                    _ => None,
                })
                .collect();
            assert!(matches!(changes[0], LifeState::Dying { .. }));
            assert_eq!(changes[1], LifeState::Dead);
            let ended = events
                .iter()
                .filter(|e| matches!(e, SimEvent::RunEnded { .. }))
                .count();
            assert_eq!(ended, 1);
            assert!(matches!(
                events.last(),
                Some(SimEvent::TickCompleted { tick: 2, .. })
            ));
        }

        // Ended runs ignore intents but keep the clock going
        let z = sim.player().position.z;
        sim.tick(0.1, &run_input()).unwrap();
        assert_eq!(sim.player().position.z, z);
        assert_eq!(sim.phase(), RunPhase::Ended);

        let first_seed = sim.seed();
        let outcome = sim
            .tick(
                0.1,
                &TickInput {
                    restart: true,
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(outcome.restarted);
        assert_eq!(sim.runs(), 2);
        assert_ne!(sim.seed(), first_seed);
        assert_eq!(sim.phase(), RunPhase::Running);
        assert_eq!(sim.player().position, glam::Vec3::ZERO);
        assert_eq!(sim.now(), 0.0);
        assert_eq!(*sim.stats(), RunStats::default());

        // Observers survive the restart
        let before = events.borrow().len();
        sim.tick(0.01, &TickInput::default()).unwrap();
        assert!(events.borrow().len() > before);
    }

    #[test]
    fn test_restart_ignored_while_running() {
        let mut sim = seeded(5);
        let outcome = sim
            .tick(
                0.01,
                &TickInput {
                    restart: true,
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(!outcome.restarted);
        assert_eq!(sim.runs(), 1);
    }

    #[test]
    fn test_streaming_follows_player() {
        let mut sim = seeded(6);
        sim.player_mut().position.z = 0.5 * STAGE_LENGTH + 1.0;
        // Empty population so the jump cannot land on a tree
        sim.world.obstacles = ObstacleStreamer::with_rng(
            ObstacleLayout::from(sim.settings()),
            Pcg32::seed_from_u64(6),
        );
        let outcome = sim.tick(0.0, &TickInput::default()).unwrap();
        assert_eq!(outcome.collision, Some(CollisionResult::Clear));
        assert_eq!(outcome.terrain.created, vec![2]);
        assert_eq!(outcome.terrain.evicted[0].index, 0);
        assert_eq!(sim.stats().segments_streamed, 1);
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = seeded(99);
        let mut b = seeded(99);
        for _ in 0..120 {
            a.tick(1.0 / 60.0, &run_input()).unwrap();
            b.tick(1.0 / 60.0, &run_input()).unwrap();
        }
        assert_eq!(a.player().position, b.player().position);
        assert_eq!(a.player().life_state(), b.player().life_state());
        let ta: Vec<_> = a.obstacles().iter().map(|o| o.position).collect();
        let tb: Vec<_> = b.obstacles().iter().map(|o| o.position).collect();
        assert_eq!(ta, tb);
    }
}
