//! Coefficient sources: independent uniform draws, or an evenly spaced range
//! for sweeping a single coefficient.

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::core::Coefficients;
use crate::error::{LvError, Result};

const MAX_SWEEP_VALUES: usize = 10_000;

/// Draws coefficient tuples with every rate uniform on `[0, 1)`.
///
/// The generator is always explicit so a run can be replayed from its seed.
pub struct CoefficientSampler<R = StdRng> {
    rng: R,
}

impl CoefficientSampler<StdRng> {
    pub fn from_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> CoefficientSampler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn sample(&mut self) -> Coefficients {
        Coefficients {
            alpha: self.rng.random_range(0.0..1.0),
            beta: self.rng.random_range(0.0..1.0),
            gamma: self.rng.random_range(0.0..1.0),
            delta: self.rng.random_range(0.0..1.0),
        }
    }
}

/// Seed for runs where the caller did not pick one.
pub fn fresh_seed() -> u64 {
    rand::rng().random()
}

/// Half-open range `start, start + step, ...` stopping before `stop`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SweepRange {
    #[serde(default = "SweepRange::default_start")]
    pub start: f64,
    #[serde(default = "SweepRange::default_stop")]
    pub stop: f64,
    #[serde(default = "SweepRange::default_step")]
    pub step: f64,
}

impl SweepRange {
    fn default_start() -> f64 {
        0.0
    }
    fn default_stop() -> f64 {
        1.1
    }
    fn default_step() -> f64 {
        0.2
    }

    pub fn new(start: f64, stop: f64, step: f64) -> Self {
        Self { start, stop, step }
    }

    pub fn validate(&self) -> Result<()> {
        let Self { start, stop, step } = *self;
        if !(start.is_finite() && stop.is_finite() && step.is_finite()) {
            return Err(LvError::invalid(format!(
                "sweep range must be finite, got {start}..{stop} by {step}"
            )));
        }
        if step <= 0.0 {
            return Err(LvError::invalid(format!(
                "sweep step must be positive, got {step}"
            )));
        }
        if start > stop {
            return Err(LvError::invalid(format!(
                "sweep start {start} is past stop {stop}"
            )));
        }
        Ok(())
    }

    /// The swept values in increasing order.
    pub fn values(&self) -> Result<Vec<f64>> {
        self.validate()?;
        let span = (self.stop - self.start) / self.step;
        if span > MAX_SWEEP_VALUES as f64 {
            return Err(LvError::invalid(format!(
                "sweep range yields more than {MAX_SWEEP_VALUES} values"
            )));
        }
        let n = span.ceil() as usize;
        Ok((0..n).map(|i| self.start + i as f64 * self.step).collect())
    }
}

impl Default for SweepRange {
    fn default() -> Self {
        Self {
            start: Self::default_start(),
            stop: Self::default_stop(),
            step: Self::default_step(),
        }
    }
}
