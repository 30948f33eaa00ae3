//! Forward-Euler Lotka-Volterra simulation and phase-space sweeps.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod plot;
pub mod sampler;
pub mod sweep;

pub use error::{LvError, Result};
