//! One-call entry points over the integrators.
//!
//! Each function builds its integrator from the caller's vectors, runs
//! `opts.steps` steps from `t = 0` to `opts.t_end` and writes the committed
//! state back into those vectors. On a failed step the vectors hold the state
//! of the last committed step.

use nalgebra::DVector;
use ode_func::Func;

use crate::crank_nicolson::CrankNicolson;
use crate::error::SimResult;
use crate::euler::{ExplicitEuler, ImplicitEuler};
use crate::generalized_alpha::GeneralizedAlpha;
use crate::integrator::{Integrator, SimOptions, StepObserver, run};
use crate::newmark::Newmark;
use crate::runge_kutta::{ButcherTableau, RungeKutta};

fn run_first_order<I: Integrator>(
    mut integrator: I,
    opts: &SimOptions,
    y: &mut DVector<f64>,
    observer: Option<StepObserver<'_>>,
) -> SimResult<()> {
    let outcome = run(&mut integrator, opts.steps, observer);
    y.copy_from(integrator.state());
    outcome
}

/// Explicit Euler for `dy/dt = rhs(y)`.
pub fn solve_explicit_euler(
    opts: &SimOptions,
    y: &mut DVector<f64>,
    rhs: &Func,
    observer: Option<StepObserver<'_>>,
) -> SimResult<()> {
    let integrator = ExplicitEuler::new(rhs.clone(), y.clone(), opts)?;
    run_first_order(integrator, opts, y, observer)
}

/// Implicit Euler for `dy/dt = rhs(y)`.
pub fn solve_implicit_euler(
    opts: &SimOptions,
    y: &mut DVector<f64>,
    rhs: &Func,
    observer: Option<StepObserver<'_>>,
) -> SimResult<()> {
    let integrator = ImplicitEuler::new(rhs.clone(), y.clone(), opts)?;
    run_first_order(integrator, opts, y, observer)
}

/// Crank-Nicolson for `dy/dt = rhs(y)`.
pub fn solve_crank_nicolson(
    opts: &SimOptions,
    y: &mut DVector<f64>,
    rhs: &Func,
    observer: Option<StepObserver<'_>>,
) -> SimResult<()> {
    let integrator = CrankNicolson::new(rhs.clone(), y.clone(), opts)?;
    run_first_order(integrator, opts, y, observer)
}

/// Runge-Kutta with the given tableau for `dy/dt = rhs(y)`.
pub fn solve_runge_kutta(
    opts: &SimOptions,
    y: &mut DVector<f64>,
    rhs: &Func,
    tableau: &ButcherTableau,
    observer: Option<StepObserver<'_>>,
) -> SimResult<()> {
    let integrator = RungeKutta::new(rhs.clone(), y.clone(), tableau.clone(), opts)?;
    run_first_order(integrator, opts, y, observer)
}

/// Newmark for `mass(x'') = rhs(x)`; updates position `x` and velocity `v`.
pub fn solve_newmark(
    opts: &SimOptions,
    x: &mut DVector<f64>,
    v: &mut DVector<f64>,
    rhs: &Func,
    mass: &Func,
    observer: Option<StepObserver<'_>>,
) -> SimResult<()> {
    let mut integrator = Newmark::new(rhs.clone(), mass.clone(), x.clone(), v.clone(), opts)?;
    let outcome = run(&mut integrator, opts.steps, observer);
    x.copy_from(integrator.state());
    v.copy_from(integrator.velocity());
    outcome
}

/// Generalized-alpha for `mass(x'') = rhs(x)`; updates position `x`, velocity
/// `v` and acceleration `a`.
#[allow(clippy::too_many_arguments)]
pub fn solve_generalized_alpha(
    opts: &SimOptions,
    rho_inf: f64,
    x: &mut DVector<f64>,
    v: &mut DVector<f64>,
    a: &mut DVector<f64>,
    rhs: &Func,
    mass: &Func,
    observer: Option<StepObserver<'_>>,
) -> SimResult<()> {
    let mut integrator = GeneralizedAlpha::new(
        rhs.clone(),
        mass.clone(),
        x.clone(),
        v.clone(),
        a.clone(),
        rho_inf,
        opts,
    )?;
    let outcome = run(&mut integrator, opts.steps, observer);
    x.copy_from(integrator.state());
    v.copy_from(integrator.velocity());
    a.copy_from(integrator.acceleration());
    outcome
}
