//! Sum, scaling, composition and embedding of residual functions.

use nalgebra::{DMatrix, DMatrixViewMut, DVector, DVectorView, DVectorViewMut};

use crate::error::{FuncResult, ensure_dim, ensure_within};
use crate::function::{Func, ResidualFunction, full_view_mut, reborrow, reborrow_mat};

/// `ca * fa(x) + cb * fb(x)`.
#[derive(Debug, Clone)]
pub struct Sum {
    fa: Func,
    fb: Func,
    ca: f64,
    cb: f64,
}

impl Sum {
    pub fn new(fa: Func, fb: Func, ca: f64, cb: f64) -> FuncResult<Self> {
        ensure_dim("sum operand inputs", fa.dim_x(), fb.dim_x())?;
        ensure_dim("sum operand outputs", fa.dim_f(), fb.dim_f())?;
        Ok(Self { fa, fb, ca, cb })
    }
}

impl ResidualFunction for Sum {
    fn dim_x(&self) -> usize {
        self.fa.dim_x()
    }

    fn dim_f(&self) -> usize {
        self.fa.dim_f()
    }

    fn evaluate(&self, x: DVectorView<'_, f64>, mut f: DVectorViewMut<'_, f64>) {
        self.fa.evaluate(x, reborrow(&mut f));
        let mut tmp = DVector::zeros(self.fb.dim_f());
        self.fb.evaluate(x, tmp.column_mut(0));
        f.axpy(self.cb, &tmp, self.ca);
    }

    fn evaluate_deriv(&self, x: DVectorView<'_, f64>, mut df: DMatrixViewMut<'_, f64>) {
        self.fa.evaluate_deriv(x, reborrow_mat(&mut df));
        let mut tmp = DMatrix::zeros(self.fb.dim_f(), self.fb.dim_x());
        self.fb.evaluate_deriv(x, full_view_mut(&mut tmp));
        df *= self.ca;
        tmp *= self.cb;
        df += &tmp;
    }
}

/// `c * fa(x)`.
#[derive(Debug, Clone)]
pub struct Scale {
    fa: Func,
    factor: f64,
}

impl Scale {
    pub fn new(fa: Func, factor: f64) -> Self {
        Self { fa, factor }
    }
}

impl ResidualFunction for Scale {
    fn dim_x(&self) -> usize {
        self.fa.dim_x()
    }

    fn dim_f(&self) -> usize {
        self.fa.dim_f()
    }

    fn evaluate(&self, x: DVectorView<'_, f64>, mut f: DVectorViewMut<'_, f64>) {
        self.fa.evaluate(x, reborrow(&mut f));
        f *= self.factor;
    }

    fn evaluate_deriv(&self, x: DVectorView<'_, f64>, mut df: DMatrixViewMut<'_, f64>) {
        self.fa.evaluate_deriv(x, reborrow_mat(&mut df));
        df *= self.factor;
    }
}

/// `outer(inner(x))`, differentiated by the chain rule.
#[derive(Debug, Clone)]
pub struct Compose {
    outer: Func,
    inner: Func,
}

impl Compose {
    pub fn new(outer: Func, inner: Func) -> FuncResult<Self> {
        ensure_dim("composition inner output", outer.dim_x(), inner.dim_f())?;
        Ok(Self { outer, inner })
    }
}

impl ResidualFunction for Compose {
    fn dim_x(&self) -> usize {
        self.inner.dim_x()
    }

    fn dim_f(&self) -> usize {
        self.outer.dim_f()
    }

    fn evaluate(&self, x: DVectorView<'_, f64>, f: DVectorViewMut<'_, f64>) {
        let mut y = DVector::zeros(self.inner.dim_f());
        self.inner.evaluate(x, y.column_mut(0));
        self.outer.evaluate(y.column(0), f);
    }

    fn evaluate_deriv(&self, x: DVectorView<'_, f64>, mut df: DMatrixViewMut<'_, f64>) {
        let mut y = DVector::zeros(self.inner.dim_f());
        self.inner.evaluate(x, y.column_mut(0));

        let mut jac_outer = DMatrix::zeros(self.outer.dim_f(), self.outer.dim_x());
        let mut jac_inner = DMatrix::zeros(self.inner.dim_f(), self.inner.dim_x());
        self.inner.evaluate_deriv(x, full_view_mut(&mut jac_inner));
        self.outer
            .evaluate_deriv(y.column(0), full_view_mut(&mut jac_outer));

        df.copy_from(&(jac_outer * jac_inner));
    }
}

/// Places `fa` inside a larger system.
///
/// `fa` reads the inputs `first_x..first_x + fa.dim_x()` of a `dim_x` vector
/// and writes the outputs `first_f..first_f + fa.dim_f()` of a `dim_f` vector;
/// every other entry of the value and of the Jacobian is zero.
#[derive(Debug, Clone)]
pub struct Embed {
    fa: Func,
    first_x: usize,
    dim_x: usize,
    first_f: usize,
    dim_f: usize,
}

impl Embed {
    pub fn new(
        fa: Func,
        first_x: usize,
        dim_x: usize,
        first_f: usize,
        dim_f: usize,
    ) -> FuncResult<Self> {
        ensure_within("embedded input range", first_x + fa.dim_x(), dim_x)?;
        ensure_within("embedded output range", first_f + fa.dim_f(), dim_f)?;
        Ok(Self {
            fa,
            first_x,
            dim_x,
            first_f,
            dim_f,
        })
    }
}

impl ResidualFunction for Embed {
    fn dim_x(&self) -> usize {
        self.dim_x
    }

    fn dim_f(&self) -> usize {
        self.dim_f
    }

    fn evaluate(&self, x: DVectorView<'_, f64>, mut f: DVectorViewMut<'_, f64>) {
        f.fill(0.0);
        self.fa.evaluate(
            x.rows(self.first_x, self.fa.dim_x()),
            f.rows_mut(self.first_f, self.fa.dim_f()),
        );
    }

    fn evaluate_deriv(&self, x: DVectorView<'_, f64>, mut df: DMatrixViewMut<'_, f64>) {
        df.fill(0.0);
        self.fa.evaluate_deriv(
            x.rows(self.first_x, self.fa.dim_x()),
            df.view_mut(
                (self.first_f, self.first_x),
                (self.fa.dim_f(), self.fa.dim_x()),
            ),
        );
    }
}
