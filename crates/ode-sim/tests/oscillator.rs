//! Harmonic oscillator dy/dt = [y1, -y0] from y = (1, 0) over two periods.

use std::f64::consts::PI;

use nalgebra::DVector;
use ode_func::{DMatrixViewMut, DVectorView, DVectorViewMut, Func, ResidualFunction};
use ode_sim::{
    ButcherTableau, CrankNicolson, ImplicitEuler, Integrator, RungeKutta, SimOptions, SimRecord,
    run_recorded, solve_crank_nicolson,
};

struct Oscillator;

impl ResidualFunction for Oscillator {
    fn dim_x(&self) -> usize {
        2
    }

    fn dim_f(&self) -> usize {
        2
    }

    fn evaluate(&self, x: DVectorView<'_, f64>, mut f: DVectorViewMut<'_, f64>) {
        f[0] = x[1];
        f[1] = -x[0];
    }

    fn evaluate_deriv(&self, _x: DVectorView<'_, f64>, mut df: DMatrixViewMut<'_, f64>) {
        df[(0, 0)] = 0.0;
        df[(0, 1)] = 1.0;
        df[(1, 0)] = -1.0;
        df[(1, 1)] = 0.0;
    }
}

fn opts() -> SimOptions {
    SimOptions::new(4.0 * PI, 100)
}

fn y0() -> DVector<f64> {
    DVector::from_vec(vec![1.0, 0.0])
}

fn record<I: Integrator>(mut integrator: I) -> SimRecord {
    let record = run_recorded(&mut integrator, opts().steps).unwrap();
    assert_eq!(record.t.len(), 101);
    assert!((record.t[100] - 4.0 * PI).abs() < 1e-9);
    record
}

/// Largest `| |y|^2 - 1 |` along the trajectory.
fn energy_drift(record: &SimRecord) -> f64 {
    record
        .x
        .iter()
        .map(|y| (y.norm_squared() - 1.0).abs())
        .fold(0.0, f64::max)
}

fn distance_to_start(record: &SimRecord) -> f64 {
    (record.x[100].clone() - y0()).norm()
}

#[test]
fn implicit_euler_is_bounded_and_dissipative() {
    let ie = record(ImplicitEuler::new(Func::new(Oscillator), y0(), &opts()).unwrap());

    let norms: Vec<f64> = ie.x.iter().map(|y| y.norm()).collect();
    assert!(norms.windows(2).all(|w| w[1] <= w[0] + 1e-12));
    // |y_n|^2 = (1 + dt^2)^-n
    let dt = opts().dt();
    assert!((ie.x[100].norm_squared() - (1.0 + dt * dt).powi(-100)).abs() < 1e-8);
}

#[test]
fn crank_nicolson_drifts_less_than_implicit_euler() {
    let ie = record(ImplicitEuler::new(Func::new(Oscillator), y0(), &opts()).unwrap());
    let cn = record(CrankNicolson::new(Func::new(Oscillator), y0(), &opts()).unwrap());

    let ie_drift = energy_drift(&ie);
    let cn_drift = energy_drift(&cn);
    assert!(cn_drift < ie_drift);
    assert!(cn_drift < 1e-8);
    assert!(distance_to_start(&cn) < 0.1);
}

#[test]
fn implicit_runge_kutta_is_approximately_periodic() {
    for tableau in [
        ButcherTableau::implicit_midpoint(),
        ButcherTableau::gauss_legendre_2(),
    ] {
        let rk = record(RungeKutta::new(Func::new(Oscillator), y0(), tableau, &opts()).unwrap());
        assert!(energy_drift(&rk) < 1e-8);
        assert!(distance_to_start(&rk) < 0.1);
    }
}

#[test]
fn gauss_legendre_beats_midpoint_in_phase() {
    let midpoint = record(
        RungeKutta::new(
            Func::new(Oscillator),
            y0(),
            ButcherTableau::implicit_midpoint(),
            &opts(),
        )
        .unwrap(),
    );
    let gauss = record(
        RungeKutta::new(
            Func::new(Oscillator),
            y0(),
            ButcherTableau::gauss_legendre_2(),
            &opts(),
        )
        .unwrap(),
    );
    assert!(distance_to_start(&gauss) < 1e-4);
    assert!(distance_to_start(&gauss) < distance_to_start(&midpoint));
}

#[test]
fn entry_point_writes_back_and_observes() {
    let mut y = y0();
    let mut times = Vec::new();
    let mut observe = |t: f64, y: &DVector<f64>| {
        assert!((y.norm() - 1.0).abs() < 1e-8);
        times.push(t);
    };
    solve_crank_nicolson(&opts(), &mut y, &Func::new(Oscillator), Some(&mut observe)).unwrap();

    assert_eq!(times.len(), 100);
    assert!((times[99] - 4.0 * PI).abs() < 1e-9);
    assert!((y - y0()).norm() < 0.1);
}
