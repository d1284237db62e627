//! Asset-ready gate
//!
//! Template geometry (tree and player boxes) comes from the asset loader.
//! Nothing that depends on it may run until the loader reports success.
//! [`ReadyGate`] fires exactly once; subscribers that arrive early are
//! buffered, subscribers that arrive late run immediately.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::settings::Settings;

/// Geometry measured from loaded models
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Templates {
    /// Tree bounding box size
    pub tree_size: Vec3,
    /// Player bounding box size
    pub player_size: Vec3,
}

impl Templates {
    /// Template sizes straight from configuration (headless runs, tests)
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            tree_size: settings.tree_extent(),
            player_size: settings.player_extent(),
        }
    }
}

impl Default for Templates {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

enum GateState<T> {
    Pending,
    Ready(T),
    Failed(String),
}

type Subscriber<T> = Box<dyn FnOnce(&T)>;

/// One-shot "ready" signal carrying a value
pub struct ReadyGate<T> {
    state: GateState<T>,
    waiting: Vec<Subscriber<T>>,
}

impl<T> Default for ReadyGate<T> {
    fn default() -> Self {
        Self {
            state: GateState::Pending,
            waiting: Vec::new(),
        }
    }
}

impl<T> ReadyGate<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `subscriber` once the gate fires (now, if it already has)
    ///
    /// Subscribers to a failed gate are dropped without running.
    pub fn on_ready(&mut self, subscriber: impl FnOnce(&T) + 'static) {
        match &self.state {
            GateState::Ready(value) => subscriber(value),
            GateState::Pending => self.waiting.push(Box::new(subscriber)),
            GateState::Failed(_) => {}
        }
    }

    /// Fire the gate, running buffered subscribers in registration order
    pub fn fire(&mut self, value: T) -> Result<()> {
        match &self.state {
            GateState::Ready(_) => return Err(SimError::AlreadyReady),
            GateState::Failed(reason) => return Err(SimError::AssetLoad(reason.clone())),
            GateState::Pending => {}
        }

        for subscriber in self.waiting.drain(..) {
            subscriber(&value);
        }
        self.state = GateState::Ready(value);
        log::info!("Assets ready");
        Ok(())
    }

    /// Record a load failure; the gate will never fire
    pub fn fail(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        log::error!("Asset load failed: {}", reason);
        self.waiting.clear();
        self.state = GateState::Failed(reason);
    }

    /// The fired value
    pub fn value(&self) -> Result<&T> {
        match &self.state {
            GateState::Ready(value) => Ok(value),
            GateState::Pending => Err(SimError::NotReady),
            GateState::Failed(reason) => Err(SimError::AssetLoad(reason.clone())),
        }
    }
}
