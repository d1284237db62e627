//! Frame driver
//!
//! Sits between the platform's frame loop and the simulation. It owns the
//! asset-ready gate, builds the simulation once templates arrive, holds the
//! input collaborator's current intents and cleans up raw frame deltas
//! before they reach `Simulation::tick`, which rejects bad ones outright.

use crate::consts::MAX_FRAME_DT;
use crate::error::{Result, SimError};
use crate::settings::Settings;
use crate::sim::{
    MovementIntent, Observers, ReadyGate, RunPhase, SimEvent, Simulation, Templates, TickInput,
    TickOutcome,
};

pub struct FrameDriver {
    settings: Settings,
    gate: ReadyGate<Templates>,
    simulation: Option<Simulation>,
    /// Subscribers waiting for the simulation to exist
    pending: Observers,
    input: TickInput,
    /// Seconds since the current run ended
    ended_for: f32,
    frames: u64,
}

impl FrameDriver {
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            gate: ReadyGate::new(),
            simulation: None,
            pending: Observers::new(),
            input: TickInput::default(),
            ended_for: 0.0,
            frames: 0,
        })
    }

    /// Gate for collaborators that need the templates (renderer, UI)
    pub fn ready_gate(&mut self) -> &mut ReadyGate<Templates> {
        &mut self.gate
    }

    /// Called by the asset loader once template geometry is known
    pub fn assets_loaded(&mut self, templates: Templates) -> Result<()> {
        self.gate.fire(templates)?;
        let mut simulation = Simulation::new(self.settings.clone(), templates)?;
        simulation
            .observers_mut()
            .extend(std::mem::take(&mut self.pending));
        self.simulation = Some(simulation);
        Ok(())
    }

    /// Called by the asset loader when loading failed; the run never starts
    pub fn assets_failed(&mut self, reason: impl Into<String>) {
        self.gate.fail(reason);
    }

    /// Subscribe to simulation events, before or after assets are ready
    pub fn subscribe(&mut self, observer: impl FnMut(&SimEvent) + 'static) {
        match &mut self.simulation {
            Some(simulation) => simulation.subscribe(observer),
            None => self.pending.subscribe(observer),
        }
    }

    /// Latest intents from the input collaborator
    pub fn set_intent(&mut self, intent: MovementIntent) {
        self.input.intent = intent;
    }

    /// Ask for a new run; consumed by the next frame
    pub fn request_restart(&mut self) {
        self.input.restart = true;
    }

    pub fn simulation(&self) -> Option<&Simulation> {
        self.simulation.as_ref()
    }

    pub fn simulation_mut(&mut self) -> Option<&mut Simulation> {
        self.simulation.as_mut()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Run one display frame
    pub fn frame(&mut self, raw_dt: f32) -> Result<TickOutcome> {
        let dt = normalize_dt(raw_dt);
        let Some(simulation) = self.simulation.as_mut() else {
            return Err(self.gate.value().err().unwrap_or(SimError::NotReady));
        };

        if simulation.phase() == RunPhase::Ended {
            self.ended_for += dt;
            let ended_for = self.ended_for;
            if self
                .settings
                .auto_restart_after
                .is_some_and(|delay| ended_for >= delay)
            {
                self.input.restart = true;
            }
        }

        let outcome = simulation.tick(dt, &self.input)?;
        self.frames += 1;

        // One-shot input
        self.input.restart = false;
        if outcome.restarted {
            self.ended_for = 0.0;
        }
        Ok(outcome)
    }
}

/// Clamp a raw frame delta into what the simulation accepts
pub fn normalize_dt(raw: f32) -> f32 {
    if !raw.is_finite() || raw < 0.0 {
        log::warn!("Dropping invalid frame delta {}", raw);
        0.0
    } else if raw > MAX_FRAME_DT {
        log::debug!("Clamping frame delta {:.3}s to {:.3}s", raw, MAX_FRAME_DT);
        MAX_FRAME_DT
    } else {
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn settings() -> Settings {
        Settings {
            seed: Some(11),
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_dt() {
        assert_eq!(normalize_dt(0.016), 0.016);
        assert_eq!(normalize_dt(-1.0), 0.0);
        assert_eq!(normalize_dt(f32::NAN), 0.0);
        assert_eq!(normalize_dt(5.0), MAX_FRAME_DT);
    }

    #[test]
    fn test_frame_before_ready_fails() {
        let mut driver = FrameDriver::new(settings()).unwrap();
        assert!(matches!(driver.frame(0.016), Err(SimError::NotReady)));

        driver.assets_failed("player.glb: bad header");
        assert!(matches!(driver.frame(0.016), Err(SimError::AssetLoad(_))));
        assert!(driver.assets_loaded(Templates::default()).is_err());
        assert!(driver.simulation().is_none());
    }

    #[test]
    fn test_early_subscribers_get_events() {
        let mut driver = FrameDriver::new(settings()).unwrap();
        let ticks = Rc::new(RefCell::new(0));
        let counter = ticks.clone();
        driver.subscribe(move |e| {
            if matches!(e, SimEvent::TickCompleted { .. }) {
                *counter.borrow_mut() += 1;
            }
        });

        let templates_seen = Rc::new(RefCell::new(false));
        let flag = templates_seen.clone();
        driver.ready_gate().on_ready(move |_| *flag.borrow_mut() = true);

        driver.assets_loaded(Templates::default()).unwrap();
        assert!(*templates_seen.borrow());
        driver.frame(0.016).unwrap();
        driver.frame(0.016).unwrap();
        assert_eq!(*ticks.borrow(), 2);
        assert_eq!(driver.frames(), 2);
    }

    #[test]
    fn test_bad_delta_does_not_error() {
        let mut driver = FrameDriver::new(settings()).unwrap();
        driver.assets_loaded(Templates::default()).unwrap();
        driver.set_intent(MovementIntent::run());
        driver.frame(-3.0).unwrap();
        driver.frame(f32::INFINITY).unwrap();
        let sim = driver.simulation().unwrap();
        assert!(sim.now() <= MAX_FRAME_DT + 1e-6);
    }

    #[test]
    fn test_auto_restart() {
        let mut driver = FrameDriver::new(Settings {
            auto_restart_after: Some(1.0),
            ..settings()
        })
        .unwrap();
        driver.assets_loaded(Templates::default()).unwrap();
        driver.simulation_mut().unwrap().restart();
        assert_eq!(driver.simulation().unwrap().runs(), 2);

        // Steer straight into the wall
        driver.set_intent(MovementIntent {
            forward: true,
            left: true,
            ..Default::default()
        });
        let mut restarted = false;
        for _ in 0..2000 {
            if driver.frame(0.05).unwrap().restarted {
                restarted = true;
                break;
            }
        }
        assert!(restarted);
        assert_eq!(driver.simulation().unwrap().runs(), 3);
        assert_eq!(driver.simulation().unwrap().phase(), RunPhase::Running);
    }
}
