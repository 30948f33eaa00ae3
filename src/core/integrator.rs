//! One forward-Euler step of the Lotka-Volterra vector field.
//!
//! ```text
//! dx/dt = alpha*x - beta*x*y
//! dy/dt = delta*x*y - gamma*y
//! ```
//!
//! Explicit Euler is first order and not structure preserving: closed orbits
//! of the continuous system spiral outward, and large rates relative to `dt`
//! blow up to inf/NaN. Nothing here checks for that.

use super::state::{Coefficients, State};

/// Instantaneous derivative `(dx/dt, dy/dt)` at `state`.
#[inline]
pub fn derivative(state: State, c: &Coefficients) -> (f64, f64) {
    let State { x, y } = state;
    let dxdt = c.alpha * x - c.beta * x * y;
    let dydt = c.delta * x * y - c.gamma * y;
    (dxdt, dydt)
}

/// Advance `state` by `dt`.
#[inline]
pub fn step(state: State, c: &Coefficients, dt: f64) -> State {
    let (dxdt, dydt) = derivative(state, c);
    State {
        x: state.x + dxdt * dt,
        y: state.y + dydt * dt,
    }
}

/// First integral of the continuous system:
/// `delta*x - gamma*ln(x) + beta*y - alpha*ln(y)`.
///
/// Only meaningful for positive populations; returns NaN otherwise.
pub fn conserved_quantity(state: State, c: &Coefficients) -> f64 {
    if state.x <= 0.0 || state.y <= 0.0 {
        return f64::NAN;
    }
    c.delta * state.x - c.gamma * state.x.ln() + c.beta * state.y - c.alpha * state.y.ln()
}

/// Coexistence equilibrium `(gamma/delta, alpha/beta)`, if it is finite.
pub fn fixed_point(c: &Coefficients) -> Option<State> {
    let fp = State::new(c.gamma / c.delta, c.alpha / c.beta);
    fp.is_finite().then_some(fp)
}
