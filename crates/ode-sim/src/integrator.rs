//! Fixed-step integrator contract and the driver that runs it.

use nalgebra::DVector;
use ode_core::ensure_positive;
use ode_func::{Func, FuncError, ResidualFunction};
use ode_solver::{NewtonConfig, SolverResult};
use tracing::{debug, info};

use crate::error::{SimError, SimResult};

/// Trait for fixed-step time integrators.
///
/// An integrator owns its committed state. `step` either commits exactly one
/// step of size `dt` or returns an error and leaves the committed state as it
/// was.
pub trait Integrator {
    /// Fixed step size.
    fn dt(&self) -> f64;

    /// Time of the committed state.
    fn time(&self) -> f64;

    /// Number of committed steps.
    fn steps_taken(&self) -> usize;

    /// Committed state (the position for second-order schemes).
    fn state(&self) -> &DVector<f64>;

    /// Advance the committed state by one step.
    fn step(&mut self) -> SolverResult<()>;
}

/// Options for simulation runs.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimOptions {
    /// Final time; integration starts at `t = 0`
    pub t_end: f64,
    /// Number of equal steps covering `[0, t_end]`
    pub steps: usize,
    /// Settings for the per-step nonlinear solve
    pub newton: NewtonConfig,
}

impl SimOptions {
    pub fn new(t_end: f64, steps: usize) -> Self {
        Self {
            t_end,
            steps,
            newton: NewtonConfig::default(),
        }
    }

    /// Step size `t_end / steps`.
    pub fn dt(&self) -> f64 {
        self.t_end / self.steps as f64
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.steps == 0 {
            return Err(SimError::InvalidArg {
                what: "steps must be positive",
            });
        }
        ensure_positive(self.t_end, "t_end must be positive and finite")?;
        Ok(())
    }
}

/// Position of a run in its fixed sequence of steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No step attempted yet.
    Initialized,
    /// Steps `0..i` are committed and step `i` is next.
    Stepping(usize),
    /// All steps are committed.
    Finished,
}

/// Observer called after every committed step with `(t, state)`.
pub type StepObserver<'a> = &'a mut dyn FnMut(f64, &DVector<f64>);

/// Drives an integrator through `steps` steps, one transition at a time.
pub struct Run<'a, I: Integrator + ?Sized> {
    integrator: &'a mut I,
    steps: usize,
    phase: Phase,
}

impl<'a, I: Integrator + ?Sized> Run<'a, I> {
    pub fn new(integrator: &'a mut I, steps: usize) -> Self {
        let phase = if steps == 0 {
            Phase::Finished
        } else {
            Phase::Initialized
        };
        Self {
            integrator,
            steps,
            phase,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn integrator(&self) -> &I {
        &*self.integrator
    }

    /// Attempt the next step and move to the following phase.
    ///
    /// A failed step leaves the phase unchanged and is reported as
    /// [`SimError::StepFailed`]. Advancing a finished run does nothing.
    pub fn advance(&mut self) -> SimResult<Phase> {
        let step = match self.phase {
            Phase::Initialized => 0,
            Phase::Stepping(i) => i,
            Phase::Finished => return Ok(Phase::Finished),
        };

        let time = self.integrator.time();
        self.integrator
            .step()
            .map_err(|source| SimError::StepFailed { step, time, source })?;
        debug!(
            "Committed step {} at t = {:.6e}",
            step,
            self.integrator.time()
        );

        self.phase = if step + 1 == self.steps {
            Phase::Finished
        } else {
            Phase::Stepping(step + 1)
        };
        Ok(self.phase)
    }
}

/// Run `steps` steps, calling `observer` after each committed one.
///
/// Any step failure aborts the run; steps committed before it stay in the
/// integrator.
pub fn run<I: Integrator + ?Sized>(
    integrator: &mut I,
    steps: usize,
    mut observer: Option<StepObserver<'_>>,
) -> SimResult<()> {
    info!(
        "Starting integration: {} steps of dt = {:e} from t = {}",
        steps,
        integrator.dt(),
        integrator.time()
    );

    let mut driver = Run::new(integrator, steps);
    while driver.phase() != Phase::Finished {
        driver.advance()?;
        if let Some(obs) = observer.as_mut() {
            let integrator = driver.integrator();
            obs(integrator.time(), integrator.state());
        }
    }

    info!("Integration finished at t = {}", driver.integrator().time());
    Ok(())
}

/// Record of simulation results.
#[derive(Clone, Debug, Default)]
pub struct SimRecord {
    /// Time points
    pub t: Vec<f64>,
    /// State snapshots
    pub x: Vec<DVector<f64>>,
}

/// Like [`run`], but collects the trajectory including the initial state.
///
/// On failure the record of the committed steps is lost; the integrator
/// itself still holds the last committed state.
pub fn run_recorded<I: Integrator + ?Sized>(
    integrator: &mut I,
    steps: usize,
) -> SimResult<SimRecord> {
    let mut record = SimRecord {
        t: Vec::with_capacity(steps + 1),
        x: Vec::with_capacity(steps + 1),
    };
    record.t.push(integrator.time());
    record.x.push(integrator.state().clone());

    let mut push = |t: f64, x: &DVector<f64>| {
        record.t.push(t);
        record.x.push(x.clone());
    };
    run(integrator, steps, Some(&mut push))?;
    Ok(record)
}

/// Time bookkeeping shared by the schemes.
#[derive(Clone, Copy, Debug)]
pub(crate) struct StepClock {
    pub(crate) dt: f64,
    pub(crate) time: f64,
    pub(crate) steps_taken: usize,
}

impl StepClock {
    pub(crate) fn new(opts: &SimOptions) -> SimResult<Self> {
        opts.validate()?;
        Ok(Self {
            dt: opts.dt(),
            time: 0.0,
            steps_taken: 0,
        })
    }

    pub(crate) fn tick(&mut self) {
        self.time += self.dt;
        self.steps_taken += 1;
    }
}

/// Check that `rhs` maps states of length `n` to vectors of length `n`.
pub(crate) fn check_system(what: &'static str, rhs: &Func, n: usize) -> SimResult<()> {
    for found in [rhs.dim_x(), rhs.dim_f()] {
        if found != n {
            return Err(FuncError::DimensionMismatch {
                what,
                expected: n,
                found,
            }
            .into());
        }
    }
    Ok(())
}
