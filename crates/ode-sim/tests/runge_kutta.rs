//! Butcher tableau consistency of the Runge-Kutta integrator.

use nalgebra::{DMatrix, DVector};
use ode_func::{DMatrixViewMut, DVectorView, DVectorViewMut, Func, ResidualFunction};
use ode_sim::{
    ButcherTableau, ExplicitEuler, Integrator, RungeKutta, SimOptions, run, run_recorded,
    solve_explicit_euler, solve_runge_kutta,
};

/// Lotka-Volterra predator-prey model, nonlinear and non-stiff.
struct LotkaVolterra;

impl ResidualFunction for LotkaVolterra {
    fn dim_x(&self) -> usize {
        2
    }

    fn dim_f(&self) -> usize {
        2
    }

    fn evaluate(&self, x: DVectorView<'_, f64>, mut f: DVectorViewMut<'_, f64>) {
        f[0] = x[0] * (1.0 - x[1]);
        f[1] = x[1] * (x[0] - 1.0);
    }

    fn evaluate_deriv(&self, x: DVectorView<'_, f64>, mut df: DMatrixViewMut<'_, f64>) {
        df[(0, 0)] = 1.0 - x[1];
        df[(0, 1)] = -x[0];
        df[(1, 0)] = x[1];
        df[(1, 1)] = x[0] - 1.0;
    }
}

/// dy/dt = -lambda * y
struct Stiff(f64);

impl ResidualFunction for Stiff {
    fn dim_x(&self) -> usize {
        1
    }

    fn dim_f(&self) -> usize {
        1
    }

    fn evaluate(&self, x: DVectorView<'_, f64>, mut f: DVectorViewMut<'_, f64>) {
        f[0] = -self.0 * x[0];
    }

    fn evaluate_deriv(&self, _x: DVectorView<'_, f64>, mut df: DMatrixViewMut<'_, f64>) {
        df[(0, 0)] = -self.0;
    }
}

fn y0() -> DVector<f64> {
    DVector::from_vec(vec![2.0, 0.5])
}

#[test]
fn trivial_tableau_reproduces_explicit_euler() {
    let opts = SimOptions::new(3.0, 60);
    let rhs = Func::new(LotkaVolterra);

    let mut ee = ExplicitEuler::new(rhs.clone(), y0(), &opts).unwrap();
    let mut rk = RungeKutta::new(rhs, y0(), ButcherTableau::explicit_euler(), &opts).unwrap();
    let ee_record = run_recorded(&mut ee, opts.steps).unwrap();
    let rk_record = run_recorded(&mut rk, opts.steps).unwrap();

    for (a, b) in ee_record.x.iter().zip(&rk_record.x) {
        assert!((a - b).amax() < 1e-10);
    }
    assert_eq!(ee_record.t, rk_record.t);
}

#[test]
fn trivial_tableau_matches_through_entry_points() {
    let opts = SimOptions::new(1.0, 20);
    let rhs = Func::new(LotkaVolterra);
    let mut y_ee = y0();
    let mut y_rk = y0();

    solve_explicit_euler(&opts, &mut y_ee, &rhs, None).unwrap();
    solve_runge_kutta(&opts, &mut y_rk, &rhs, &ButcherTableau::explicit_euler(), None).unwrap();
    assert!((y_ee - y_rk).amax() < 1e-10);
}

#[test]
fn every_stage_is_seeded_with_the_current_slope() {
    let opts = SimOptions::new(1.0, 10);
    let rhs = Func::new(LotkaVolterra);
    let mut rk = RungeKutta::new(rhs.clone(), y0(), ButcherTableau::radau_iia_2(), &opts).unwrap();

    let slope = rhs.value(&y0()).unwrap();
    let guess = rk.initial_stage_guess().unwrap();
    assert_eq!(guess.len(), 4);
    assert_eq!(guess.rows(0, 2), slope);
    assert_eq!(guess.rows(2, 2), slope);

    rk.step().unwrap();
    let slope = rhs.value(rk.state()).unwrap();
    let guess = rk.initial_stage_guess().unwrap();
    assert_eq!(guess.rows(0, 2), slope);
    assert_eq!(guess.rows(2, 2), slope);
}

#[test]
fn explicit_midpoint_tableau_matches_hand_written_scheme() {
    let opts = SimOptions::new(2.0, 40);
    let dt = opts.dt();
    let rhs = Func::new(LotkaVolterra);
    let mut rk =
        RungeKutta::new(rhs.clone(), y0(), ButcherTableau::explicit_midpoint(), &opts).unwrap();

    let mut y = y0();
    for _ in 0..opts.steps {
        rk.step().unwrap();
        let half = &y + (0.5 * dt) * rhs.value(&y).unwrap();
        y += dt * rhs.value(&half).unwrap();
        assert!((rk.state() - &y).amax() < 1e-9);
    }
}

#[test]
fn radau_damps_stiff_decay_where_explicit_euler_explodes() {
    let opts = SimOptions::new(1.0, 10);
    let rhs = Func::new(Stiff(100.0));
    let y0 = DVector::from_element(1, 1.0);

    let mut radau = RungeKutta::new(rhs.clone(), y0.clone(), ButcherTableau::radau_iia_2(), &opts)
        .unwrap();
    let record = run_recorded(&mut radau, opts.steps).unwrap();
    assert!(record.x.windows(2).all(|w| w[1][0].abs() < w[0][0].abs()));
    assert!(radau.state()[0].abs() < 1e-6);

    let mut ee = ExplicitEuler::new(rhs, y0, &opts).unwrap();
    run(&mut ee, opts.steps, None).unwrap();
    assert!(ee.state()[0].abs() > 1e6);
}

#[test]
fn custom_tableau_is_accepted() {
    // Two-stage SDIRK, gamma = 1 - 1/sqrt(2)
    let g = 1.0 - 0.5_f64.sqrt();
    let tableau = ButcherTableau::new(
        DMatrix::from_row_slice(2, 2, &[g, 0.0, 1.0 - g, g]),
        DVector::from_vec(vec![1.0 - g, g]),
    )
    .unwrap();
    assert!(!tableau.is_explicit());

    let opts = SimOptions::new(1.0, 50);
    let mut y = DVector::from_element(1, 1.0);
    solve_runge_kutta(&opts, &mut y, &Func::new(Stiff(1.0)), &tableau, None).unwrap();
    assert!((y[0] - (-1.0_f64).exp()).abs() < 1e-4);
}
