//! Crank-Nicolson (trapezoidal rule) for `dy/dt = rhs(y)`.

use std::rc::Rc;

use nalgebra::DVector;
use ode_func::{Constant, Func, Identity, SettableLeaf};
use ode_solver::{NewtonConfig, SolverResult, newton_solve};

use crate::error::SimResult;
use crate::integrator::{Integrator, SimOptions, StepClock, check_system};

/// Solves `y_new - y_old - dt/2 * (rhs(y_new) + rhs(y_old)) = 0` each step.
///
/// `rhs(y_old)` is cached in a [`Constant`] leaf, so every step evaluates the
/// right-hand side at the committed state exactly once.
#[derive(Debug)]
pub struct CrankNicolson {
    rhs: Func,
    equ: Func,
    y_old: Rc<Constant>,
    rhs_old: Rc<Constant>,
    y: DVector<f64>,
    clock: StepClock,
    newton: NewtonConfig,
}

impl CrankNicolson {
    pub fn new(rhs: Func, y0: DVector<f64>, opts: &SimOptions) -> SimResult<Self> {
        let n = y0.len();
        check_system("Crank-Nicolson rhs", &rhs, n)?;
        let clock = StepClock::new(opts)?;

        let y_old = Rc::new(Constant::new(y0.clone()));
        let rhs_old = Rc::new(Constant::new(rhs.value(&y0)?));
        let y_new = Func::new(Identity::new(n));
        let equ = y_new
            - Func::from(y_old.clone())
            - (0.5 * clock.dt) * (&rhs + Func::from(rhs_old.clone()));

        Ok(Self {
            rhs,
            equ,
            y_old,
            rhs_old,
            y: y0,
            clock,
            newton: opts.newton,
        })
    }
}

impl Integrator for CrankNicolson {
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
        let rhs_new = self.rhs.value(&y_new)?;

        self.y_old.set(&y_new)?;
        self.rhs_old.set(&rhs_new)?;
        self.y = y_new;
        self.clock.tick();
        Ok(())
    }
}
