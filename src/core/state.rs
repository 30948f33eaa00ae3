use serde::{Deserialize, Serialize};

/// Prey (`x`) and predator (`y`) population sizes at one instant.
///
/// Nothing keeps these non-negative; an unstable run may drift below zero or
/// overflow to infinity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub x: f64,
    pub y: f64,
}

impl State {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for State {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for State {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

/// The four Lotka-Volterra rates.
///
/// - `alpha`: prey growth
/// - `beta`: predation
/// - `gamma`: predator death
/// - `delta`: predator growth from predation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coefficients {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub delta: f64,
}

impl Coefficients {
    pub const fn new(alpha: f64, beta: f64, gamma: f64, delta: f64) -> Self {
        Self {
            alpha,
            beta,
            gamma,
            delta,
        }
    }

    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Legend text listing all four rates, e.g. `α=0.12, β=0.34, γ=0.56, δ=0.78`.
    pub fn label(&self) -> String {
        format!(
            "α={:.2}, β={:.2}, γ={:.2}, δ={:.2}",
            self.alpha, self.beta, self.gamma, self.delta
        )
    }
}
