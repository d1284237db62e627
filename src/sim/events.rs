//! Simulation events and their observers
//!
//! The tick collects events while it runs and publishes them once it is
//! done, so observers always see a finished frame. Observers are called
//! synchronously, in the order they subscribed.

use serde::{Deserialize, Serialize};

use super::state::LifeState;

/// Running totals for the current run
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    /// Furthest forward coordinate reached
    pub distance: f32,
    /// Run time in seconds
    pub elapsed: f32,
    /// Trees left behind while alive
    pub obstacles_passed: u32,
    /// Terrain segments created after the initial two
    pub segments_streamed: u32,
}

/// Something observers may care about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    LifeStateChanged {
        from: LifeState,
        to: LifeState,
        time: f32,
    },
    SegmentCreated {
        index: u32,
    },
    SegmentEvicted {
        index: u32,
    },
    /// The player reached `Dead`; sent once per run
    RunEnded {
        stats: RunStats,
    },
    /// Last event of every tick
    TickCompleted {
        tick: u64,
        time: f32,
    },
}

type Observer = Box<dyn FnMut(&SimEvent)>;

/// Ordered list of event subscribers
#[derive(Default)]
pub struct Observers {
    subscribers: Vec<Observer>,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&SimEvent) + 'static) {
        self.subscribers.push(Box::new(observer));
    }

    /// Move every subscriber of `other` to the end of this list
    pub fn extend(&mut self, other: Observers) {
        self.subscribers.extend(other.subscribers);
    }

    /// Deliver every event to every subscriber, event-major
    pub fn publish(&mut self, events: &[SimEvent]) {
        for event in events {
            for subscriber in &mut self.subscribers {
                subscriber(event);
            }
        }
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
