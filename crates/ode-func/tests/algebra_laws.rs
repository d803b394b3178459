//! Linearity and chain-rule properties of the function algebra.

use ode_func::{
    DMatrixViewMut, DVector, DVectorView, DVectorViewMut, Embed, Func, Identity, Projector,
    ResidualFunction, compose, jacobian_deviation,
};
use proptest::prelude::*;

/// A smooth 3 -> 3 map with a coupling parameter.
struct Twist {
    c: f64,
}

impl ResidualFunction for Twist {
    fn dim_x(&self) -> usize {
        3
    }

    fn dim_f(&self) -> usize {
        3
    }

    fn evaluate(&self, x: DVectorView<'_, f64>, mut f: DVectorViewMut<'_, f64>) {
        f[0] = self.c * x[0] * x[1] + x[2];
        f[1] = (x[1] - x[2]).sin();
        f[2] = x[0] * x[0] * x[2];
    }

    fn evaluate_deriv(&self, x: DVectorView<'_, f64>, mut df: DMatrixViewMut<'_, f64>) {
        df[(0, 0)] = self.c * x[1];
        df[(0, 1)] = self.c * x[0];
        df[(0, 2)] = 1.0;
        df[(1, 0)] = 0.0;
        df[(1, 1)] = (x[1] - x[2]).cos();
        df[(1, 2)] = -(x[1] - x[2]).cos();
        df[(2, 0)] = 2.0 * x[0] * x[2];
        df[(2, 1)] = 0.0;
        df[(2, 2)] = x[0] * x[0];
    }
}

fn vec3() -> impl Strategy<Value = DVector<f64>> {
    prop::collection::vec(-2.0_f64..2.0, 3).prop_map(DVector::from_vec)
}

proptest! {
    #[test]
    fn linear_combination_is_pointwise(
        c1 in -5.0_f64..5.0,
        c2 in -5.0_f64..5.0,
        p in -3.0_f64..3.0,
        x in vec3(),
    ) {
        let fa = Func::new(Twist { c: p });
        let fb = Func::new(Projector::new(3, 1, 3).unwrap());
        let combined = c1 * &fa + c2 * &fb;

        let expected = fa.value(&x).unwrap() * c1 + fb.value(&x).unwrap() * c2;
        prop_assert!((combined.value(&x).unwrap() - expected).amax() < 1e-12);

        let expected_jac = fa.jacobian(&x).unwrap() * c1 + fb.jacobian(&x).unwrap() * c2;
        prop_assert!((combined.jacobian(&x).unwrap() - expected_jac).amax() < 1e-12);
    }

    #[test]
    fn composition_matches_central_differences(p in -2.0_f64..2.0, x in vec3()) {
        let outer = Func::new(Twist { c: p });
        let inner = Func::new(Twist { c: 1.0 - p }) - 0.5 * Func::new(Identity::new(3));
        let composed = compose(&outer, &inner);

        let y = inner.value(&x).unwrap();
        let chain = outer.jacobian(&y).unwrap() * inner.jacobian(&x).unwrap();
        prop_assert!((composed.jacobian(&x).unwrap() - chain).amax() < 1e-12);
        prop_assert!(jacobian_deviation(&composed, &x, 1e-6).unwrap() < 1e-6);
    }
}

#[test]
fn embedded_subsystem_keeps_consistency() {
    // A 3-unknown system placed at unknowns 2..5 of a 6-unknown residual
    let sub = Func::new(Twist { c: 0.7 });
    let embedded = Func::new(Embed::new(sub, 2, 6, 1, 6).unwrap());
    let whole = &embedded + &Func::new(Identity::new(6));

    let x = DVector::from_vec(vec![0.1, -0.4, 0.9, 1.3, -0.2, 0.6]);
    assert!(jacobian_deviation(&whole, &x, 1e-6).unwrap() < 1e-7);

    // Rows and columns outside the window only see the identity
    let jac = whole.jacobian(&x).unwrap();
    assert_eq!(jac[(0, 0)], 1.0);
    assert_eq!(jac[(0, 3)], 0.0);
    assert_eq!(jac[(5, 5)], 1.0);
    assert_eq!(jac[(5, 2)], 0.0);
}
