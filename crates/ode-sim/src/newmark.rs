//! Newmark-beta for `mass(d^2x/dt^2) = rhs(x)`.
//!
//! The unknown of each step is the new acceleration `a`. Position and velocity
//! are affine in `a`:
//!
//! ```text
//! v_new = v_old + dt * ((1 - gamma) a_old + gamma a)
//! x_new = x_old + dt v_old + dt^2 / 2 * ((1 - 2 beta) a_old + 2 beta a)
//! ```

use std::rc::Rc;

use nalgebra::DVector;
use ode_func::{Constant, Func, FuncResult, Identity, SettableLeaf, compose};
use ode_solver::{NewtonConfig, SolverResult, newton_solve};

use crate::error::{SimError, SimResult};
use crate::integrator::{Integrator, SimOptions, StepClock, check_system};

/// Average acceleration parameters: unconditionally stable and free of
/// numerical damping.
pub const NEWMARK_GAMMA: f64 = 0.5;
pub const NEWMARK_BETA: f64 = 0.25;

/// Committed `(x, v, a)` of a second-order scheme, mirrored in [`Constant`]
/// leaves, plus the affine update expressions built on top of them.
#[derive(Debug)]
pub(crate) struct SecondOrderState {
    pub(crate) x_old: Rc<Constant>,
    v_old: Rc<Constant>,
    pub(crate) a_old: Rc<Constant>,
    /// `a -> a`, the unknown of the step
    pub(crate) a_new: Func,
    /// `a -> x_new`
    pub(crate) x_new: Func,
    /// `a -> v_new`
    v_new: Func,
    pub(crate) x: DVector<f64>,
    pub(crate) v: DVector<f64>,
    pub(crate) a: DVector<f64>,
}

impl SecondOrderState {
    pub(crate) fn new(
        x0: DVector<f64>,
        v0: DVector<f64>,
        a0: DVector<f64>,
        dt: f64,
        gamma: f64,
        beta: f64,
    ) -> SimResult<Self> {
        let n = x0.len();
        if v0.len() != n || a0.len() != n {
            return Err(SimError::InvalidArg {
                what: "position, velocity and acceleration must have equal length",
            });
        }

        let x_old = Rc::new(Constant::new(x0.clone()));
        let v_old = Rc::new(Constant::new(v0.clone()));
        let a_old = Rc::new(Constant::new(a0.clone()));
        let a_new = Func::new(Identity::new(n));

        let x_old_f = Func::from(x_old.clone());
        let v_old_f = Func::from(v_old.clone());
        let a_old_f = Func::from(a_old.clone());

        let v_new = &v_old_f + dt * ((1.0 - gamma) * &a_old_f + gamma * &a_new);
        let x_new = &x_old_f
            + dt * &v_old_f
            + (0.5 * dt * dt) * ((1.0 - 2.0 * beta) * &a_old_f + (2.0 * beta) * &a_new);

        Ok(Self {
            x_old,
            v_old,
            a_old,
            a_new,
            x_new,
            v_new,
            x: x0,
            v: v0,
            a: a0,
        })
    }

    /// Evaluate the update expressions at the solved acceleration and make
    /// the result the new committed state.
    pub(crate) fn commit(&mut self, a: DVector<f64>) -> FuncResult<()> {
        let x = self.x_new.value(&a)?;
        let v = self.v_new.value(&a)?;

        self.x_old.set(&x)?;
        self.v_old.set(&v)?;
        self.a_old.set(&a)?;
        self.x = x;
        self.v = v;
        self.a = a;
        Ok(())
    }
}

/// Newmark integrator with `gamma = 1/2`, `beta = 1/4`.
///
/// Each step solves `mass(a) - rhs(x_new(a)) = 0`. The initial acceleration
/// is `rhs(x0)`, which is consistent when `mass` is the identity. For any
/// other mass the start is inconsistent and the trajectory is only first-order
/// accurate; use [`GeneralizedAlpha`](crate::GeneralizedAlpha) with
/// `rho_inf = 1` and a consistent `a0` for second order.
#[derive(Debug)]
pub struct Newmark {
    equ: Func,
    state: SecondOrderState,
    clock: StepClock,
    newton: NewtonConfig,
}

impl Newmark {
    pub fn new(
        rhs: Func,
        mass: Func,
        x0: DVector<f64>,
        v0: DVector<f64>,
        opts: &SimOptions,
    ) -> SimResult<Self> {
        let n = x0.len();
        check_system("Newmark rhs", &rhs, n)?;
        check_system("Newmark mass", &mass, n)?;
        let clock = StepClock::new(opts)?;

        let a0 = rhs.value(&x0)?;
        let state = SecondOrderState::new(x0, v0, a0, clock.dt, NEWMARK_GAMMA, NEWMARK_BETA)?;
        let equ = compose(&mass, &state.a_new) - compose(&rhs, &state.x_new);

        Ok(Self {
            equ,
            state,
            clock,
            newton: opts.newton,
        })
    }

    pub fn velocity(&self) -> &DVector<f64> {
        &self.state.v
    }

    pub fn acceleration(&self) -> &DVector<f64> {
        &self.state.a
    }
}

impl Integrator for Newmark {
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
        &self.state.x
    }

    fn step(&mut self) -> SolverResult<()> {
        let mut a = self.state.a.clone();
        newton_solve(&self.equ, &mut a, &self.newton, None)?;
        self.state.commit(a)?;
        self.clock.tick();
        Ok(())
    }
}
