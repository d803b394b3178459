//! Generalized-alpha for `mass(d^2x/dt^2) = rhs(x)`, including constrained
//! systems whose mass operator is singular.

use nalgebra::DVector;
use ode_core::ensure_unit_interval;
use ode_func::{Func, compose};
use ode_solver::{NewtonConfig, SolverResult, newton_solve};

use crate::error::SimResult;
use crate::integrator::{Integrator, SimOptions, StepClock, check_system};
use crate::newmark::SecondOrderState;

/// Method parameters derived from the spectral radius at infinite frequency.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlphaParameters {
    pub alpha_m: f64,
    pub alpha_f: f64,
    pub gamma: f64,
    pub beta: f64,
}

impl AlphaParameters {
    /// Parameters for `rho_inf` in `[0, 1]`: `1` keeps all frequencies
    /// undamped, `0` annihilates the highest ones in a single step.
    pub fn from_rho_inf(rho_inf: f64) -> SimResult<Self> {
        let rho_inf = ensure_unit_interval(rho_inf, "rho_inf must lie in [0, 1]")?;
        let alpha_m = (2.0 * rho_inf - 1.0) / (rho_inf + 1.0);
        let alpha_f = rho_inf / (rho_inf + 1.0);
        let gamma = 0.5 - alpha_m + alpha_f;
        let beta = 0.25 * (1.0 - alpha_m + alpha_f).powi(2);
        Ok(Self {
            alpha_m,
            alpha_f,
            gamma,
            beta,
        })
    }
}

/// Generalized-alpha integrator.
///
/// Each step solves
///
/// ```text
/// mass((1 - alpha_m) a + alpha_m a_old)
///     - (1 - alpha_f) rhs(x_new(a)) - alpha_f rhs(x_old) = 0
/// ```
///
/// The initial acceleration is supplied by the caller, since `rhs(x0)` is not
/// an acceleration when `mass` is singular.
#[derive(Debug)]
pub struct GeneralizedAlpha {
    params: AlphaParameters,
    equ: Func,
    state: SecondOrderState,
    clock: StepClock,
    newton: NewtonConfig,
}

impl GeneralizedAlpha {
    pub fn new(
        rhs: Func,
        mass: Func,
        x0: DVector<f64>,
        v0: DVector<f64>,
        a0: DVector<f64>,
        rho_inf: f64,
        opts: &SimOptions,
    ) -> SimResult<Self> {
        let params = AlphaParameters::from_rho_inf(rho_inf)?;
        let n = x0.len();
        check_system("generalized-alpha rhs", &rhs, n)?;
        check_system("generalized-alpha mass", &mass, n)?;
        let clock = StepClock::new(opts)?;

        let state = SecondOrderState::new(x0, v0, a0, clock.dt, params.gamma, params.beta)?;
        let AlphaParameters {
            alpha_m, alpha_f, ..
        } = params;
        let a_old = Func::from(state.a_old.clone());
        let x_old = Func::from(state.x_old.clone());

        let blended_a = (1.0 - alpha_m) * &state.a_new + alpha_m * &a_old;
        let equ = compose(&mass, &blended_a)
            - (1.0 - alpha_f) * compose(&rhs, &state.x_new)
            - alpha_f * compose(&rhs, &x_old);

        Ok(Self {
            params,
            equ,
            state,
            clock,
            newton: opts.newton,
        })
    }

    pub fn parameters(&self) -> AlphaParameters {
        self.params
    }

    pub fn velocity(&self) -> &DVector<f64> {
        &self.state.v
    }

    pub fn acceleration(&self) -> &DVector<f64> {
        &self.state.a
    }
}

impl Integrator for GeneralizedAlpha {
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
