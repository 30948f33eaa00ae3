use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by simulation, sweep and rendering entry points.
#[derive(Debug, Error)]
pub enum LvError {
    /// Rejected before any integration starts.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A state coordinate became NaN or infinite under the `fail` divergence policy.
    #[error("integration diverged at step {step}: x={x}, y={y}")]
    NumericDivergence { step: usize, x: f64, y: f64 },

    /// The shared stop flag was raised mid-run after `step` completed steps.
    #[error("run cancelled after step {step}")]
    Cancelled { step: usize },

    #[error("failed to write {}: {message}", .path.display())]
    OutputWrite { path: PathBuf, message: String },

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, LvError>;

impl LvError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
