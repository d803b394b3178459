//! Step failures keep the last committed state.
//!
//! For `dy/dt = y^2` from `y = 1` with `dt = 0.2` the first implicit Euler
//! step has the root `(1 - sqrt(0.2)) / 0.4`. The second step asks for a root
//! of `0.2 y^2 - y + 1.382` which has none.

use nalgebra::DVector;
use ode_func::{DMatrixViewMut, DVectorView, DVectorViewMut, Func, ResidualFunction};
use ode_sim::{ImplicitEuler, Integrator, SimError, SimOptions, run, solve_implicit_euler};

struct Square;

impl ResidualFunction for Square {
    fn dim_x(&self) -> usize {
        1
    }

    fn dim_f(&self) -> usize {
        1
    }

    fn evaluate(&self, x: DVectorView<'_, f64>, mut f: DVectorViewMut<'_, f64>) {
        f[0] = x[0] * x[0];
    }

    fn evaluate_deriv(&self, x: DVectorView<'_, f64>, mut df: DMatrixViewMut<'_, f64>) {
        df[(0, 0)] = 2.0 * x[0];
    }
}

fn first_root() -> f64 {
    (1.0 - 0.2_f64.sqrt()) / 0.4
}

#[test]
fn second_step_fails_and_first_stays_committed() {
    let opts = SimOptions::new(0.4, 2);
    let mut ie = ImplicitEuler::new(Func::new(Square), DVector::from_element(1, 1.0), &opts)
        .unwrap();

    let err = run(&mut ie, opts.steps, None).unwrap_err();
    match &err {
        SimError::StepFailed { step, time, source } => {
            assert_eq!(*step, 1);
            assert!((time - 0.2).abs() < 1e-12);
            assert!(source.is_convergence_failure());
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(ie.steps_taken(), 1);
    assert!((ie.time() - 0.2).abs() < 1e-12);
    assert!((ie.state()[0] - first_root()).abs() < 1e-9);

    // Retrying fails the same way without touching the state
    assert!(ie.step().is_err());
    assert_eq!(ie.steps_taken(), 1);
    assert!((ie.state()[0] - first_root()).abs() < 1e-9);
}

#[test]
fn entry_point_writes_back_the_committed_state() {
    let opts = SimOptions::new(0.4, 2);
    let mut y = DVector::from_element(1, 1.0);
    let mut observed = Vec::new();
    let mut observe = |t: f64, _: &DVector<f64>| observed.push(t);

    let result = solve_implicit_euler(&opts, &mut y, &Func::new(Square), Some(&mut observe));
    assert!(matches!(result, Err(SimError::StepFailed { step: 1, .. })));
    assert_eq!(observed.len(), 1);
    assert!((observed[0] - 0.2).abs() < 1e-12);
    assert!((y[0] - first_root()).abs() < 1e-9);
}
