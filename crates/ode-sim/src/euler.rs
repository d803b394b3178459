//! Explicit and implicit Euler for `dy/dt = rhs(y)`.

use std::rc::Rc;

use nalgebra::DVector;
use ode_func::{Constant, Func, Identity, SettableLeaf};
use ode_solver::{NewtonConfig, SolverResult, newton_solve};

use crate::error::SimResult;
use crate::integrator::{Integrator, SimOptions, StepClock, check_system};

/// `y <- y + dt * rhs(y)`. No nonlinear solve.
#[derive(Debug)]
pub struct ExplicitEuler {
    rhs: Func,
    y: DVector<f64>,
    clock: StepClock,
}

impl ExplicitEuler {
    pub fn new(rhs: Func, y0: DVector<f64>, opts: &SimOptions) -> SimResult<Self> {
        check_system("explicit Euler rhs", &rhs, y0.len())?;
        Ok(Self {
            rhs,
            y: y0,
            clock: StepClock::new(opts)?,
        })
    }
}

impl Integrator for ExplicitEuler {
    fn dt(&self) -> f64 {
        self.clock.dt
    }

    fn time(&self) -> f64 {
        self.clock.time
    }

    fn steps_taken(&self) -> usize {
        self.clock.steps_taken
    }

    fn state(&self) -> &DVector<f64> {
        &self.y
    }

    fn step(&mut self) -> SolverResult<()> {
        let f = self.rhs.value(&self.y)?;
        self.y += self.clock.dt * f;
        self.clock.tick();
        Ok(())
    }
}

/// Solves `y_new - y_old - dt * rhs(y_new) = 0` for `y_new` each step.
///
/// `y_old` is a [`Constant`] leaf of the step residual, refreshed after every
/// committed step.
#[derive(Debug)]
pub struct ImplicitEuler {
    equ: Func,
    y_old: Rc<Constant>,
    y: DVector<f64>,
    clock: StepClock,
    newton: NewtonConfig,
}

impl ImplicitEuler {
    pub fn new(rhs: Func, y0: DVector<f64>, opts: &SimOptions) -> SimResult<Self> {
        let n = y0.len();
        check_system("implicit Euler rhs", &rhs, n)?;
        let clock = StepClock::new(opts)?;

        let y_old = Rc::new(Constant::new(y0.clone()));
        let y_new = Func::new(Identity::new(n));
        let equ = y_new - Func::from(y_old.clone()) - clock.dt * rhs;

        Ok(Self {
            equ,
            y_old,
            y: y0,
            clock,
            newton: opts.newton,
        })
    }

    /// Residual whose root is the next state.
    pub fn step_residual(&self) -> &Func {
        &self.equ
    }
}

impl Integrator for ImplicitEuler {
    fn dt(&self) -> f64 {
        self.clock.dt
    }

    fn time(&self) -> f64 {
        self.clock.time
    }

    fn steps_taken(&self) -> usize {
        self.clock.steps_taken
    }

    fn state(&self) -> &DVector<f64> {
        &self.y
    }

    fn step(&mut self) -> SolverResult<()> {
        let mut y_new = self.y.clone();
        newton_solve(&self.equ, &mut y_new, &self.newton, None)?;

        self.y_old.set(&y_new)?;
        self.y = y_new;
        self.clock.tick();
        Ok(())
    }
}
