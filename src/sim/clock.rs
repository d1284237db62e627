//! Simulation clock
//!
//! Accumulates per-tick deltas into a monotonically increasing run time.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Clock {
    /// Seconds since the run started
    elapsed: f32,
    /// Ticks since the run started
    ticks: u64,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by `dt`, returning the new run time
    pub fn advance(&mut self, dt: f32) -> Result<f32> {
        let elapsed = self.elapsed + dt;
        if !dt.is_finite() || dt < 0.0 || !elapsed.is_finite() {
            return Err(SimError::InvalidTimeStep(dt));
        }
        self.elapsed = elapsed;
        self.ticks += 1;
        Ok(self.elapsed)
    }

    #[inline]
    pub fn now(&self) -> f32 {
        self.elapsed
    }

    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
