//! Nonlinear solver for residual expressions.
//!
//! Drives any square [`Func`](ode_func::Func) to a root with an undamped
//! Newton iteration. Every implicit time step of `ode-sim` ends up here.

pub mod error;
pub mod newton;

pub use error::{SolverError, SolverResult};
pub use newton::{NewtonCallback, NewtonConfig, NewtonResult, newton_solve};
