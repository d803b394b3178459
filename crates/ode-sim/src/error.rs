//! Error types for simulation operations.

use ode_core::CoreError;
use ode_func::FuncError;
use ode_solver::SolverError;
use thiserror::Error;

/// Errors encountered while setting up or running an integration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// An option or method coefficient failed validation.
    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    /// The residual expression of a scheme could not be assembled.
    #[error("Function error: {0}")]
    Function(#[from] FuncError),

    /// Step `step` (0-based) starting at `time` did not converge. The
    /// integrator still holds the state committed by the previous step.
    #[error("Step {step} at t = {time} failed: {source}")]
    StepFailed {
        step: usize,
        time: f64,
        source: SolverError,
    },
}

pub type SimResult<T> = Result<T, SimError>;
