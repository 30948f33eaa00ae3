//! Sweep orchestration: one run per swept value, labelled and kept in input
//! order so legend entries line up with the values that produced them.

use std::sync::atomic::AtomicBool;

use rand::Rng;
use tracing::info;

use crate::core::{Coefficients, SimulationSettings, State, Trajectory, run_with};
use crate::error::{LvError, Result};
use crate::sampler::{CoefficientSampler, SweepRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coefficient {
    Alpha,
    Beta,
    Gamma,
    Delta,
}

impl Coefficient {
    pub const ALL: [Coefficient; 4] = [Self::Alpha, Self::Beta, Self::Gamma, Self::Delta];

    pub fn name(self) -> &'static str {
        match self {
            Self::Alpha => "alpha",
            Self::Beta => "beta",
            Self::Gamma => "gamma",
            Self::Delta => "delta",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Alpha => "α",
            Self::Beta => "β",
            Self::Gamma => "γ",
            Self::Delta => "δ",
        }
    }

    pub fn get(self, c: &Coefficients) -> f64 {
        match self {
            Self::Alpha => c.alpha,
            Self::Beta => c.beta,
            Self::Gamma => c.gamma,
            Self::Delta => c.delta,
        }
    }

    /// Copy of `c` with this slot replaced by `value`.
    pub fn with(self, c: &Coefficients, value: f64) -> Coefficients {
        let mut out = *c;
        match self {
            Self::Alpha => out.alpha = value,
            Self::Beta => out.beta = value,
            Self::Gamma => out.gamma = value,
            Self::Delta => out.delta = value,
        }
        out
    }
}

/// The single input a sweep varies, with the values it takes.
#[derive(Debug, Clone, PartialEq)]
pub enum SweepAxis {
    Coefficient {
        which: Coefficient,
        values: Vec<f64>,
    },
    InitialCondition(Vec<State>),
}

impl SweepAxis {
    pub fn coefficient(which: Coefficient, values: Vec<f64>) -> Self {
        Self::Coefficient { which, values }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Coefficient { values, .. } => values.len(),
            Self::InitialCondition(pairs) => pairs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short identifier used in file names and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Coefficient { which, .. } => which.name(),
            Self::InitialCondition(_) => "initial",
        }
    }

    /// `(coefficients, initial state, label)` for every value, in order.
    fn cases(&self, fixed: &Coefficients, initial: State) -> Vec<(Coefficients, State, String)> {
        match self {
            Self::Coefficient { which, values } => values
                .iter()
                .map(|&v| {
                    (
                        which.with(fixed, v),
                        initial,
                        format!("{} = {v:.2}", which.symbol()),
                    )
                })
                .collect(),
            Self::InitialCondition(pairs) => pairs
                .iter()
                .map(|&s| (*fixed, s, initial_condition_label(s)))
                .collect(),
        }
    }
}

/// A trajectory with the legend text describing the input that produced it.
#[derive(Debug, Clone)]
pub struct LabeledTrajectory {
    pub label: String,
    pub trajectory: Trajectory,
}

pub fn initial_condition_label(s: State) -> String {
    format!("x0={:.2}, y0={:.2}", s.x, s.y)
}

/// Run one simulation per value on `axis`, holding every other input fixed.
pub fn run_sweep(
    axis: &SweepAxis,
    fixed: &Coefficients,
    initial: State,
    settings: &SimulationSettings,
) -> Result<Vec<LabeledTrajectory>> {
    run_sweep_with(axis, fixed, initial, settings, None, |_, _| {})
}

/// [`run_sweep`] with a stop flag and a callback fired after each run with
/// `(completed, total)`.
pub fn run_sweep_with(
    axis: &SweepAxis,
    fixed: &Coefficients,
    initial: State,
    settings: &SimulationSettings,
    stop: Option<&AtomicBool>,
    on_run: impl FnMut(usize, usize),
) -> Result<Vec<LabeledTrajectory>> {
    if axis.is_empty() {
        return Err(LvError::invalid(format!(
            "sweep over {} has no values",
            axis.name()
        )));
    }
    settings.validate()?;
    info!(axis = axis.name(), runs = axis.len(), "starting sweep");
    run_cases(axis.cases(fixed, initial), settings, stop, on_run)
}

/// `count` runs from `initial`, each with freshly sampled coefficients.
pub fn run_random_batch<R: Rng>(
    sampler: &mut CoefficientSampler<R>,
    count: usize,
    initial: State,
    settings: &SimulationSettings,
    stop: Option<&AtomicBool>,
    on_run: impl FnMut(usize, usize),
) -> Result<Vec<LabeledTrajectory>> {
    if count == 0 {
        return Err(LvError::invalid("random batch needs at least one run"));
    }
    settings.validate()?;
    let cases: Vec<_> = (0..count)
        .map(|_| {
            let c = sampler.sample();
            (c, initial, c.label())
        })
        .collect();
    info!(runs = count, "starting random batch");
    run_cases(cases, settings, stop, on_run)
}

fn run_cases(
    cases: Vec<(Coefficients, State, String)>,
    settings: &SimulationSettings,
    stop: Option<&AtomicBool>,
    mut on_run: impl FnMut(usize, usize),
) -> Result<Vec<LabeledTrajectory>> {
    let total = cases.len();
    let mut out = Vec::with_capacity(total);
    for (idx, (coefficients, initial, label)) in cases.into_iter().enumerate() {
        let trajectory = run_with(initial, &coefficients, settings, stop)?;
        out.push(LabeledTrajectory { label, trajectory });
        on_run(idx + 1, total);
    }
    Ok(out)
}

/// One sweep of the standard battery together with how to present it.
#[derive(Debug, Clone)]
pub struct SweepPlan {
    pub axis: SweepAxis,
    pub title: String,
    pub file_name: String,
}

/// The five standard sweeps, in order: delta, gamma, beta, alpha, then the
/// initial condition. Coefficient sweeps share `range` and hold the other
/// three rates at `baseline`.
pub fn sweep_battery(
    baseline: &Coefficients,
    range: &SweepRange,
    initial_conditions: &[State],
    initial: State,
) -> Result<Vec<SweepPlan>> {
    let values = range.values()?;
    let mut plans = Vec::with_capacity(5);
    for which in [
        Coefficient::Delta,
        Coefficient::Gamma,
        Coefficient::Beta,
        Coefficient::Alpha,
    ] {
        let held = Coefficient::ALL
            .iter()
            .filter(|&&c| c != which)
            .map(|&c| format!("{}={:.2}", c.symbol(), c.get(baseline)))
            .collect::<Vec<_>>()
            .join(", ");
        plans.push(SweepPlan {
            title: format!(
                "Lotka-Volterra varying {} ({held}, x0={:.2}, y0={:.2})",
                which.symbol(),
                initial.x,
                initial.y
            ),
            file_name: format!("lotka_volterra_vary_{}.png", which.name()),
            axis: SweepAxis::coefficient(which, values.clone()),
        });
    }
    plans.push(SweepPlan {
        axis: SweepAxis::InitialCondition(initial_conditions.to_vec()),
        title: format!(
            "Lotka-Volterra varying initial condition ({})",
            baseline.label()
        ),
        file_name: "lotka_volterra_vary_initial.png".to_string(),
    });
    Ok(plans)
}

pub fn random_batch_title(initial: State) -> String {
    format!(
        "Lotka-Volterra Simulations where x0={:?} and y0={:?}",
        initial.x, initial.y
    )
}

pub fn random_batch_file_name(initial: State) -> String {
    format!("lotka_volterra_x={:.2}_y={:.2}.png", initial.x, initial.y)
}
