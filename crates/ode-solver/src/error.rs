//! Error types for solver operations.

use ode_core::CoreError;
use ode_func::FuncError;
use thiserror::Error;

/// Errors that can occur while solving `F(x) = 0`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// The iteration budget ran out before the residual norm fell below the
    /// tolerance.
    #[error("Convergence failed after {iterations} iterations (|f| = {residual_norm:e})")]
    ConvergenceFailed {
        iterations: usize,
        residual_norm: f64,
    },

    #[error("Singular Jacobian at iteration {iteration}")]
    Singular { iteration: usize },

    #[error("Non-finite residual at iteration {iteration}")]
    NonFinite { iteration: usize },

    #[error("Function error: {0}")]
    Function(#[from] FuncError),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

impl SolverError {
    /// True for failures of the iteration itself, as opposed to a malformed
    /// problem.
    pub fn is_convergence_failure(&self) -> bool {
        matches!(
            self,
            SolverError::ConvergenceFailed { .. }
                | SolverError::Singular { .. }
                | SolverError::NonFinite { .. }
        )
    }
}

pub type SolverResult<T> = Result<T, SolverError>;
