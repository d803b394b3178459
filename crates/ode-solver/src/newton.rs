//! Undamped Newton iteration.

use nalgebra::DVector;
use ode_core::ensure_positive;
use ode_func::{Func, FuncError, ResidualFunction};
use tracing::{debug, trace, warn};

use crate::error::{SolverError, SolverResult};

/// Newton solver configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NewtonConfig {
    /// Maximum number of updates
    pub max_iterations: usize,
    /// Absolute tolerance on the Euclidean residual norm
    pub tolerance: f64,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            tolerance: 1e-10,
        }
    }
}

/// Outcome of a converged solve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NewtonResult {
    /// Number of updates applied to the iterate
    pub iterations: usize,
    /// Residual norm at the returned iterate
    pub residual_norm: f64,
}

/// Observer called after every update with `(iteration, |f|, x)`, where `|f|`
/// is the norm the update was computed from and `x` the updated iterate.
pub type NewtonCallback<'a> = &'a mut dyn FnMut(usize, f64, &DVector<f64>);

/// Solve `func(x) = 0` in place, starting from the current content of `x`.
///
/// Each iteration evaluates `f` and `J` at `x` and applies `x <- x - J^-1 f`
/// through an LU solve. Convergence (`|f| < tolerance`) is checked before
/// the update, so an `x` that already solves the system is returned untouched
/// with `iterations == 0`. There is no damping or line search.
///
/// On error `x` holds the last iterate.
pub fn newton_solve(
    func: &Func,
    x: &mut DVector<f64>,
    config: &NewtonConfig,
    mut callback: Option<NewtonCallback<'_>>,
) -> SolverResult<NewtonResult> {
    ensure_positive(config.tolerance, "newton tolerance")?;
    if func.dim_x() != func.dim_f() {
        return Err(FuncError::DimensionMismatch {
            what: "newton system must be square",
            expected: func.dim_x(),
            found: func.dim_f(),
        }
        .into());
    }

    let mut iteration = 0;
    loop {
        let res = func.value(x)?;
        let residual_norm = res.norm();
        trace!("Newton iteration {}: |f| = {:e}", iteration, residual_norm);

        if !residual_norm.is_finite() {
            warn!("Newton residual became non-finite at iteration {}", iteration);
            return Err(SolverError::NonFinite { iteration });
        }
        if residual_norm < config.tolerance {
            debug!(
                "Newton converged in {} iterations (|f| = {:e})",
                iteration, residual_norm
            );
            return Ok(NewtonResult {
                iterations: iteration,
                residual_norm,
            });
        }
        if iteration == config.max_iterations {
            warn!(
                "Newton did not converge in {} iterations (|f| = {:e})",
                iteration, residual_norm
            );
            return Err(SolverError::ConvergenceFailed {
                iterations: iteration,
                residual_norm,
            });
        }

        let jac = func.jacobian(x)?;
        let dx = jac.lu().solve(&res).ok_or_else(|| {
            warn!("Singular Jacobian at Newton iteration {}", iteration);
            SolverError::Singular { iteration }
        })?;
        *x -= dx;

        if let Some(cb) = callback.as_mut() {
            cb(iteration, residual_norm, &*x);
        }
        iteration += 1;
    }
}
