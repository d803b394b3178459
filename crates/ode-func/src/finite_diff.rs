//! Numerical Jacobians.
//!
//! [`FiniteDifference`] is the documented alternative to an analytic
//! derivative: a user leaf that only knows how to evaluate itself and
//! approximates its Jacobian by central differences. The free functions check
//! an analytic Jacobian against the same approximation.

use nalgebra::{DMatrix, DMatrixViewMut, DVector, DVectorView, DVectorViewMut};

use crate::error::{FuncResult, ensure_dim};
use crate::function::{Func, ResidualFunction, full_view_mut};

/// Default relative step for central differences.
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// Residual function whose Jacobian is approximated by central differences.
///
/// Column `j` of the Jacobian is `(f(x + h e_j) - f(x - h e_j)) / 2h` with
/// `h = epsilon * max(|x_j|, 1)`. The approximation error is `O(h^2)`, so the
/// consistency between value and derivative only holds to that order.
pub struct FiniteDifference<E> {
    dim_x: usize,
    dim_f: usize,
    eval: E,
    epsilon: f64,
}

impl<E> FiniteDifference<E>
where
    E: Fn(DVectorView<'_, f64>, DVectorViewMut<'_, f64>),
{
    pub fn new(dim_x: usize, dim_f: usize, eval: E) -> Self {
        Self {
            dim_x,
            dim_f,
            eval,
            epsilon: DEFAULT_EPSILON,
        }
    }

    /// Override the relative difference step.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }
}

impl<E> ResidualFunction for FiniteDifference<E>
where
    E: Fn(DVectorView<'_, f64>, DVectorViewMut<'_, f64>),
{
    fn dim_x(&self) -> usize {
        self.dim_x
    }

    fn dim_f(&self) -> usize {
        self.dim_f
    }

    fn evaluate(&self, x: DVectorView<'_, f64>, f: DVectorViewMut<'_, f64>) {
        (self.eval)(x, f)
    }

    fn evaluate_deriv(&self, x: DVectorView<'_, f64>, df: DMatrixViewMut<'_, f64>) {
        central_difference_into(&self.eval, self.dim_f, x, df, self.epsilon);
    }
}

/// Central-difference Jacobian of `func` at `x`, using only `evaluate`.
pub fn central_difference_jacobian(
    func: &Func,
    x: &DVector<f64>,
    epsilon: f64,
) -> FuncResult<DMatrix<f64>> {
    ensure_dim("function input", func.dim_x(), x.len())?;
    let mut jac = DMatrix::zeros(func.dim_f(), func.dim_x());
    central_difference_into(
        |x, f| func.evaluate(x, f),
        func.dim_f(),
        x.column(0),
        full_view_mut(&mut jac),
        epsilon,
    );
    Ok(jac)
}

/// Largest absolute deviation between the analytic Jacobian of `func` and its
/// central-difference approximation at `x`.
pub fn jacobian_deviation(func: &Func, x: &DVector<f64>, epsilon: f64) -> FuncResult<f64> {
    let analytic = func.jacobian(x)?;
    let numeric = central_difference_jacobian(func, x, epsilon)?;
    Ok((analytic - numeric).amax())
}

fn central_difference_into<E>(
    eval: E,
    dim_f: usize,
    x: DVectorView<'_, f64>,
    mut df: DMatrixViewMut<'_, f64>,
    epsilon: f64,
) where
    E: Fn(DVectorView<'_, f64>, DVectorViewMut<'_, f64>),
{
    let mut probe = x.clone_owned();
    let mut f_plus = DVector::zeros(dim_f);
    let mut f_minus = DVector::zeros(dim_f);

    for j in 0..x.len() {
        let h = epsilon * x[j].abs().max(1.0);

        probe[j] = x[j] + h;
        eval(probe.column(0), f_plus.column_mut(0));
        probe[j] = x[j] - h;
        eval(probe.column(0), f_minus.column_mut(0));
        probe[j] = x[j];

        let mut col = df.column_mut(j);
        col.copy_from(&f_plus);
        col -= &f_minus;
        col /= 2.0 * h;
    }
}
