//! The residual function contract and the shared handle used to build expressions.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::rc::Rc;

use nalgebra::{DMatrix, DMatrixViewMut, DVector, DVectorView, DVectorViewMut};

use crate::combinators::{Compose, Scale, Sum};
use crate::error::{FuncResult, ensure_dim};

/// A mapping `x -> f(x)` from `dim_x` unknowns to `dim_f` defects, together with
/// its `dim_f x dim_x` Jacobian.
///
/// Implementations must be pure functions of `x` and must overwrite every entry
/// of the output buffer. `evaluate_deriv` has to be the Jacobian of the mapping
/// realized by `evaluate`, either analytic or an explicitly documented
/// approximation such as [`FiniteDifference`](crate::FiniteDifference).
///
/// The buffers passed in always have the advertised sizes; size checks happen
/// when expressions are assembled and at the [`Func`] entry points.
pub trait ResidualFunction {
    /// Number of unknowns.
    fn dim_x(&self) -> usize;

    /// Number of residual entries.
    fn dim_f(&self) -> usize;

    /// Write `f(x)` into `f`.
    fn evaluate(&self, x: DVectorView<'_, f64>, f: DVectorViewMut<'_, f64>);

    /// Write the Jacobian `df/dx` into `df` (rows = outputs, columns = inputs).
    fn evaluate_deriv(&self, x: DVectorView<'_, f64>, df: DMatrixViewMut<'_, f64>);
}

/// Shared handle to a node of a residual expression.
///
/// Cloning is cheap and shares the node, so one sub-expression can feed several
/// larger ones. The arithmetic operators build new nodes and never touch their
/// operands:
///
/// - `&a + &b`, `&a - &b`, `-&a`, `c * &a`
/// - [`compose`]`(&outer, &inner)` for `outer(inner(x))`
///
/// The operators panic when operand dimensions do not fit; the `try_*` methods
/// report the same condition as a [`FuncError`](crate::FuncError).
#[derive(Clone)]
pub struct Func(Rc<dyn ResidualFunction>);

impl Func {
    /// Wrap a residual function in a new shared node.
    pub fn new<F: ResidualFunction + 'static>(f: F) -> Self {
        Self(Rc::new(f))
    }

    /// Evaluate into a freshly allocated vector.
    pub fn value(&self, x: &DVector<f64>) -> FuncResult<DVector<f64>> {
        ensure_dim("function input", self.dim_x(), x.len())?;
        let mut f = DVector::zeros(self.dim_f());
        self.0.evaluate(x.column(0), f.column_mut(0));
        Ok(f)
    }

    /// Jacobian at `x` as a freshly allocated `dim_f x dim_x` matrix.
    pub fn jacobian(&self, x: &DVector<f64>) -> FuncResult<DMatrix<f64>> {
        ensure_dim("function input", self.dim_x(), x.len())?;
        let mut df = DMatrix::zeros(self.dim_f(), self.dim_x());
        self.0.evaluate_deriv(x.column(0), full_view_mut(&mut df));
        Ok(df)
    }

    /// `self + other`.
    pub fn try_add(&self, other: &Func) -> FuncResult<Func> {
        Sum::new(self.clone(), other.clone(), 1.0, 1.0).map(Func::new)
    }

    /// `self - other`.
    pub fn try_sub(&self, other: &Func) -> FuncResult<Func> {
        Sum::new(self.clone(), other.clone(), 1.0, -1.0).map(Func::new)
    }

    /// `factor * self`.
    pub fn scaled(&self, factor: f64) -> Func {
        Func::new(Scale::new(self.clone(), factor))
    }

    /// `self(inner(x))`.
    pub fn try_compose(&self, inner: &Func) -> FuncResult<Func> {
        Compose::new(self.clone(), inner.clone()).map(Func::new)
    }

    /// True when both handles point at the same node.
    pub fn ptr_eq(&self, other: &Func) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: ResidualFunction + 'static> From<Rc<T>> for Func {
    fn from(node: Rc<T>) -> Self {
        Func(node)
    }
}

impl ResidualFunction for Func {
    fn dim_x(&self) -> usize {
        self.0.dim_x()
    }

    fn dim_f(&self) -> usize {
        self.0.dim_f()
    }

    fn evaluate(&self, x: DVectorView<'_, f64>, f: DVectorViewMut<'_, f64>) {
        self.0.evaluate(x, f)
    }

    fn evaluate_deriv(&self, x: DVectorView<'_, f64>, df: DMatrixViewMut<'_, f64>) {
        self.0.evaluate_deriv(x, df)
    }
}

impl fmt::Debug for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Func")
            .field("dim_x", &self.dim_x())
            .field("dim_f", &self.dim_f())
            .finish()
    }
}

/// `outer(inner(x))`.
///
/// # Panics
/// If `outer.dim_x() != inner.dim_f()`.
pub fn compose(outer: &Func, inner: &Func) -> Func {
    fail_fast(outer.try_compose(inner))
}

fn fail_fast(built: FuncResult<Func>) -> Func {
    match built {
        Ok(func) => func,
        Err(err) => panic!("invalid residual expression: {err}"),
    }
}

macro_rules! impl_binary_op {
    ($op:ident, $method:ident, $checked:ident) => {
        impl $op<&Func> for &Func {
            type Output = Func;
            fn $method(self, rhs: &Func) -> Func {
                fail_fast(self.$checked(rhs))
            }
        }

        impl $op<Func> for Func {
            type Output = Func;
            fn $method(self, rhs: Func) -> Func {
                fail_fast(self.$checked(&rhs))
            }
        }

        impl $op<&Func> for Func {
            type Output = Func;
            fn $method(self, rhs: &Func) -> Func {
                fail_fast(self.$checked(rhs))
            }
        }

        impl $op<Func> for &Func {
            type Output = Func;
            fn $method(self, rhs: Func) -> Func {
                fail_fast(self.$checked(&rhs))
            }
        }
    };
}

impl_binary_op!(Add, add, try_add);
impl_binary_op!(Sub, sub, try_sub);

impl Mul<&Func> for f64 {
    type Output = Func;
    fn mul(self, rhs: &Func) -> Func {
        rhs.scaled(self)
    }
}

impl Mul<Func> for f64 {
    type Output = Func;
    fn mul(self, rhs: Func) -> Func {
        rhs.scaled(self)
    }
}

impl Neg for &Func {
    type Output = Func;
    fn neg(self) -> Func {
        self.scaled(-1.0)
    }
}

impl Neg for Func {
    type Output = Func;
    fn neg(self) -> Func {
        self.scaled(-1.0)
    }
}

/// Reborrow a vector view so it can be handed to a callee and used afterwards.
pub(crate) fn reborrow<'b>(f: &'b mut DVectorViewMut<'_, f64>) -> DVectorViewMut<'b, f64> {
    let n = f.nrows();
    f.rows_mut(0, n)
}

/// Reborrow a matrix view so it can be handed to a callee and used afterwards.
pub(crate) fn reborrow_mat<'b>(df: &'b mut DMatrixViewMut<'_, f64>) -> DMatrixViewMut<'b, f64> {
    let shape = df.shape();
    df.view_mut((0, 0), shape)
}

pub(crate) fn full_view_mut(m: &mut DMatrix<f64>) -> DMatrixViewMut<'_, f64> {
    let shape = m.shape();
    m.view_mut((0, 0), shape)
}
