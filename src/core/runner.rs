//! Fixed-step trajectory runner.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::integrator::step;
use super::state::{Coefficients, State};
use crate::error::{LvError, Result};

pub const DEFAULT_DT: f64 = 1e-5;
pub const DEFAULT_STEP_COUNT: usize = 10_000_000;

// Upper bound on states held by one trajectory (~1.6 GB of f64 pairs).
pub const MAX_RETAINED_STATES: usize = 100_000_000;

// Steps between polls of the stop flag; must be a power of two.
const CANCEL_POLL_STEPS: usize = 1 << 16;

/// What to do when a coordinate turns NaN or infinite mid-run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DivergencePolicy {
    /// Keep integrating; the trajectory carries the non-finite tail.
    Ignore,
    /// Keep integrating but log the first non-finite step.
    #[default]
    Warn,
    /// Abort with [`LvError::NumericDivergence`].
    Fail,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimulationSettings {
    #[serde(default = "SimulationSettings::default_dt")]
    pub dt: f64,
    #[serde(default = "SimulationSettings::default_step_count")]
    pub step_count: usize,
    /// Keep every k-th state (plus the last one). `1` keeps all of them.
    #[serde(default = "SimulationSettings::default_sample_stride")]
    pub sample_stride: usize,
    #[serde(default)]
    pub divergence: DivergencePolicy,
}

impl SimulationSettings {
    fn default_dt() -> f64 {
        DEFAULT_DT
    }
    fn default_step_count() -> usize {
        DEFAULT_STEP_COUNT
    }
    fn default_sample_stride() -> usize {
        100
    }

    /// Full-resolution settings: every state is kept.
    pub fn full(step_count: usize, dt: f64) -> Self {
        Self {
            dt,
            step_count,
            sample_stride: 1,
            divergence: DivergencePolicy::Ignore,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(LvError::invalid(format!(
                "dt must be finite and positive, got {}",
                self.dt
            )));
        }
        if self.sample_stride == 0 {
            return Err(LvError::invalid("sample_stride must be at least 1"));
        }
        match self.retained_len() {
            Some(n) if n <= MAX_RETAINED_STATES => Ok(()),
            _ => Err(LvError::invalid(format!(
                "{} steps at stride {} would retain more than {MAX_RETAINED_STATES} states",
                self.step_count, self.sample_stride
            ))),
        }
    }

    /// Number of states a run with these settings retains, or `None` if
    /// that count does not fit in `usize`.
    pub fn retained_len(&self) -> Option<usize> {
        let stride = self.sample_stride.max(1);
        let tail = usize::from(self.step_count % stride != 0);
        (self.step_count / stride).checked_add(1)?.checked_add(tail)
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            dt: Self::default_dt(),
            step_count: Self::default_step_count(),
            sample_stride: Self::default_sample_stride(),
            divergence: DivergencePolicy::default(),
        }
    }
}

/// States visited by one run, oldest first.
///
/// Element 0 is the initial state as supplied; the last element is the state
/// after the final step. With a sample stride above one the states in between
/// are every `stride`-th step.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    states: Vec<State>,
    stride: usize,
    step_count: usize,
    divergence_step: Option<usize>,
}

impl Trajectory {
    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn first(&self) -> State {
        self.states[0]
    }

    pub fn last(&self) -> State {
        self.states[self.states.len() - 1]
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// First step whose output had a non-finite coordinate.
    pub fn divergence_step(&self) -> Option<usize> {
        self.divergence_step
    }

    pub fn is_finite(&self) -> bool {
        self.divergence_step.is_none()
    }

    /// `(x, y)` pairs for plotting.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.states.iter().map(|s| (s.x, s.y))
    }

    pub fn into_states(self) -> Vec<State> {
        self.states
    }
}

/// Integrate `step_count` steps of size [`DEFAULT_DT`], keeping every state.
///
/// The returned trajectory has exactly `step_count + 1` elements.
pub fn run(initial: State, coefficients: &Coefficients, step_count: usize) -> Result<Trajectory> {
    let settings = SimulationSettings::full(step_count, DEFAULT_DT);
    run_with(initial, coefficients, &settings, None)
}

/// Integrate under `settings`, optionally polling `stop` for cancellation.
pub fn run_with(
    initial: State,
    coefficients: &Coefficients,
    settings: &SimulationSettings,
    stop: Option<&AtomicBool>,
) -> Result<Trajectory> {
    settings.validate()?;
    if !initial.is_finite() {
        return Err(LvError::invalid(format!(
            "initial state must be finite, got ({}, {})",
            initial.x, initial.y
        )));
    }

    let SimulationSettings {
        dt,
        step_count,
        sample_stride: stride,
        divergence,
    } = *settings;

    debug!(
        x0 = initial.x,
        y0 = initial.y,
        ?coefficients,
        dt,
        step_count,
        stride,
        "starting run"
    );

    let mut states = Vec::with_capacity(settings.retained_len().unwrap_or(1));
    states.push(initial);

    let mut current = initial;
    let mut divergence_step = None;
    for i in 1..=step_count {
        if i & (CANCEL_POLL_STEPS - 1) == 0 {
            if let Some(flag) = stop {
                if flag.load(Ordering::Relaxed) {
                    return Err(LvError::Cancelled { step: i - 1 });
                }
            }
        }

        current = step(current, coefficients, dt);

        if divergence_step.is_none() && !current.is_finite() {
            divergence_step = Some(i);
            match divergence {
                DivergencePolicy::Ignore => {}
                DivergencePolicy::Warn => warn!(
                    step = i,
                    x = current.x,
                    y = current.y,
                    ?coefficients,
                    "trajectory diverged"
                ),
                DivergencePolicy::Fail => {
                    return Err(LvError::NumericDivergence {
                        step: i,
                        x: current.x,
                        y: current.y,
                    });
                }
            }
        }

        if i % stride == 0 || i == step_count {
            states.push(current);
        }
    }

    debug!(
        x = current.x,
        y = current.y,
        retained = states.len(),
        "finished run"
    );

    Ok(Trajectory {
        states,
        stride,
        step_count,
        divergence_step,
    })
}
