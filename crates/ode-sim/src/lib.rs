//! Fixed-step time integration for ODEs and DAEs.
//!
//! Provides:
//! - explicit and implicit Euler, Crank-Nicolson and Butcher-tableau
//!   Runge-Kutta for `dy/dt = rhs(y)`
//! - Newmark and generalized-alpha for `mass(d^2x/dt^2) = rhs(x)`, the latter
//!   also for singular mass operators (constrained mechanics)
//! - a run driver with per-step observation and trajectory recording
//!
//! Every implicit scheme assembles its step residual from `ode-func`
//! combinators once, keeps the previous time level in `Constant` leaves and
//! solves the residual with `ode-solver` once per step.

pub mod crank_nicolson;
pub mod error;
pub mod euler;
pub mod generalized_alpha;
pub mod integrator;
pub mod newmark;
pub mod runge_kutta;
pub mod sim;

pub use crank_nicolson::CrankNicolson;
pub use error::{SimError, SimResult};
pub use euler::{ExplicitEuler, ImplicitEuler};
pub use generalized_alpha::{AlphaParameters, GeneralizedAlpha};
pub use integrator::{
    Integrator, Phase, Run, SimOptions, SimRecord, StepObserver, run, run_recorded,
};
pub use newmark::{NEWMARK_BETA, NEWMARK_GAMMA, Newmark};
pub use runge_kutta::{ButcherTableau, RungeKutta};
pub use sim::{
    solve_crank_nicolson, solve_explicit_euler, solve_generalized_alpha, solve_implicit_euler,
    solve_newmark, solve_runge_kutta,
};
