//! Implicit Runge-Kutta schemes defined by a Butcher tableau.
//!
//! All `s` stage derivatives `k_1..k_s` of an `n`-dimensional system are the
//! unknowns of one `n * s` dimensional Newton problem per step:
//!
//! `k_i - rhs(y_old + dt * sum_l a_il k_l) = 0`, `i = 1..s`
//!
//! followed by `y_new = y_old + dt * sum_l b_l k_l`.

use std::rc::Rc;

use nalgebra::{DMatrix, DVector};
use ode_core::ensure_all_finite;
use ode_func::{BlockFunction, BlockMatVec, Constant, Func, Identity, SettableLeaf, compose};
use ode_solver::{NewtonConfig, SolverResult, newton_solve};

use crate::error::{SimError, SimResult};
use crate::integrator::{Integrator, SimOptions, StepClock, check_system};

/// Coefficients `(A, b)` of an `s`-stage Runge-Kutta method for autonomous
/// systems.
#[derive(Clone, Debug, PartialEq)]
pub struct ButcherTableau {
    a: DMatrix<f64>,
    b: DVector<f64>,
}

impl ButcherTableau {
    pub fn new(a: DMatrix<f64>, b: DVector<f64>) -> SimResult<Self> {
        if a.nrows() == 0 {
            return Err(SimError::InvalidArg {
                what: "tableau needs at least one stage",
            });
        }
        if !a.is_square() {
            return Err(SimError::InvalidArg {
                what: "tableau matrix must be square",
            });
        }
        if b.len() != a.nrows() {
            return Err(SimError::InvalidArg {
                what: "tableau weights must have one entry per stage",
            });
        }
        ensure_all_finite(a.iter().chain(b.iter()), "tableau coefficients must be finite")?;
        Ok(Self { a, b })
    }

    /// `A = [0], b = [1]`.
    pub fn explicit_euler() -> Self {
        Self::single_stage(0.0)
    }

    /// `A = [1], b = [1]`.
    pub fn implicit_euler() -> Self {
        Self::single_stage(1.0)
    }

    /// `A = [1/2], b = [1]`, second order and symplectic.
    pub fn implicit_midpoint() -> Self {
        Self::single_stage(0.5)
    }

    pub fn explicit_midpoint() -> Self {
        Self {
            a: DMatrix::from_row_slice(2, 2, &[0.0, 0.0, 0.5, 0.0]),
            b: DVector::from_vec(vec![0.0, 1.0]),
        }
    }

    /// Two-stage Gauss-Legendre method of order 4.
    pub fn gauss_legendre_2() -> Self {
        let r = 3.0_f64.sqrt() / 6.0;
        Self {
            a: DMatrix::from_row_slice(2, 2, &[0.25, 0.25 - r, 0.25 + r, 0.25]),
            b: DVector::from_vec(vec![0.5, 0.5]),
        }
    }

    /// Two-stage Radau IIA method of order 3 (L-stable).
    pub fn radau_iia_2() -> Self {
        Self {
            a: DMatrix::from_row_slice(2, 2, &[5.0 / 12.0, -1.0 / 12.0, 0.75, 0.25]),
            b: DVector::from_vec(vec![0.75, 0.25]),
        }
    }

    fn single_stage(a: f64) -> Self {
        Self {
            a: DMatrix::from_element(1, 1, a),
            b: DVector::from_element(1, 1.0),
        }
    }

    /// Number of stages `s`.
    pub fn stages(&self) -> usize {
        self.b.len()
    }

    pub fn a(&self) -> &DMatrix<f64> {
        &self.a
    }

    pub fn b(&self) -> &DVector<f64> {
        &self.b
    }

    /// True when no stage depends on itself or on a later stage.
    pub fn is_explicit(&self) -> bool {
        let s = self.stages();
        (0..s).all(|i| (i..s).all(|l| self.a[(i, l)] == 0.0))
    }
}

/// Runge-Kutta integrator for `dy/dt = rhs(y)`.
#[derive(Debug)]
pub struct RungeKutta {
    rhs: Func,
    tableau: ButcherTableau,
    equ: Func,
    y_old: Rc<Constant>,
    y: DVector<f64>,
    clock: StepClock,
    newton: NewtonConfig,
}

impl RungeKutta {
    pub fn new(
        rhs: Func,
        y0: DVector<f64>,
        tableau: ButcherTableau,
        opts: &SimOptions,
    ) -> SimResult<Self> {
        let n = y0.len();
        let s = tableau.stages();
        check_system("Runge-Kutta rhs", &rhs, n)?;
        let clock = StepClock::new(opts)?;

        // Every stage argument reads the full stage vector k
        let y_old = Rc::new(Constant::with_dim_x(y0.clone(), n * s));
        let k = Func::new(Identity::new(n * s));
        let stages = (0..s)
            .map(|i| -> SimResult<Func> {
                let increment = Func::new(BlockMatVec::new(tableau.a.clone(), k.clone(), i)?);
                let argument = Func::from(y_old.clone()) + clock.dt * increment;
                Ok(compose(&rhs, &argument))
            })
            .collect::<SimResult<Vec<_>>>()?;
        let equ = &k - Func::new(BlockFunction::new(stages)?);

        Ok(Self {
            rhs,
            tableau,
            equ,
            y_old,
            y: y0,
            clock,
            newton: opts.newton,
        })
    }

    pub fn tableau(&self) -> &ButcherTableau {
        &self.tableau
    }

    /// Starting point of the stage solve: `rhs(y)` for every stage.
    pub fn initial_stage_guess(&self) -> SolverResult<DVector<f64>> {
        let n = self.y.len();
        let f = self.rhs.value(&self.y)?;
        Ok(DVector::from_fn(n * self.tableau.stages(), |i, _| f[i % n]))
    }
}

impl Integrator for RungeKutta {
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
        let n = self.y.len();
        let mut k = self.initial_stage_guess()?;
        newton_solve(&self.equ, &mut k, &self.newton, None)?;

        let mut increment = DVector::zeros(n);
        for (l, b) in self.tableau.b.iter().enumerate() {
            increment.axpy(*b, &k.rows(l * n, n), 1.0);
        }
        let y_new = &self.y + self.clock.dt * increment;

        self.y_old.set(&y_new)?;
        self.y = y_new;
        self.clock.tick();
        Ok(())
    }
}
