//! Numerical core: state types, the Euler step and the fixed-step runner.

pub mod integrator;
pub mod runner;
pub mod state;

pub use integrator::{conserved_quantity, derivative, fixed_point, step};
pub use runner::{
    DEFAULT_DT, DEFAULT_STEP_COUNT, DivergencePolicy, SimulationSettings, Trajectory, run, run_with,
};
pub use state::{Coefficients, State};
