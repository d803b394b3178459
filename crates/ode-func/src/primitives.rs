//! Leaf nodes: identity, constants and coordinate projectors.

use std::cell::RefCell;

use nalgebra::{DMatrixViewMut, DVector, DVectorView, DVectorViewMut};

use crate::error::{FuncError, FuncResult, ensure_dim, ensure_within};
use crate::function::ResidualFunction;

/// `f(x) = x`.
#[derive(Debug, Clone, Copy)]
pub struct Identity {
    n: usize,
}

impl Identity {
    pub fn new(n: usize) -> Self {
        Self { n }
    }
}

impl ResidualFunction for Identity {
    fn dim_x(&self) -> usize {
        self.n
    }

    fn dim_f(&self) -> usize {
        self.n
    }

    fn evaluate(&self, x: DVectorView<'_, f64>, mut f: DVectorViewMut<'_, f64>) {
        f.copy_from(&x);
    }

    fn evaluate_deriv(&self, _x: DVectorView<'_, f64>, mut df: DMatrixViewMut<'_, f64>) {
        df.fill(0.0);
        df.fill_diagonal(1.0);
    }
}

/// A leaf whose value can be replaced between solves without rebuilding the
/// expression that contains it.
///
/// Integrators keep a typed handle to the leaf and store the previous time
/// level in it after every committed step.
pub trait SettableLeaf {
    /// Replace the held value. The length must stay the same.
    fn set(&self, value: &DVector<f64>) -> FuncResult<()>;

    /// Copy of the held value.
    fn get(&self) -> DVector<f64>;
}

/// `f(x) = v`, independent of `x`.
///
/// The held value `v` is the only mutable state in an expression tree and is
/// changed through [`SettableLeaf::set`].
#[derive(Debug)]
pub struct Constant {
    value: RefCell<DVector<f64>>,
    dim_x: usize,
}

impl Constant {
    /// Constant accepting inputs of the same length as `value`.
    pub fn new(value: DVector<f64>) -> Self {
        let dim_x = value.len();
        Self::with_dim_x(value, dim_x)
    }

    /// Constant accepting inputs of length `dim_x`.
    pub fn with_dim_x(value: DVector<f64>, dim_x: usize) -> Self {
        Self {
            value: RefCell::new(value),
            dim_x,
        }
    }
}

impl SettableLeaf for Constant {
    fn set(&self, value: &DVector<f64>) -> FuncResult<()> {
        let mut held = self.value.borrow_mut();
        ensure_dim("constant value", held.len(), value.len())?;
        held.copy_from(value);
        Ok(())
    }

    fn get(&self) -> DVector<f64> {
        self.value.borrow().clone()
    }
}

impl ResidualFunction for Constant {
    fn dim_x(&self) -> usize {
        self.dim_x
    }

    fn dim_f(&self) -> usize {
        self.value.borrow().len()
    }

    fn evaluate(&self, _x: DVectorView<'_, f64>, mut f: DVectorViewMut<'_, f64>) {
        f.copy_from(&*self.value.borrow());
    }

    fn evaluate_deriv(&self, _x: DVectorView<'_, f64>, mut df: DMatrixViewMut<'_, f64>) {
        df.fill(0.0);
    }
}

/// Keeps the entries `first..next` of `x` and zeroes the rest.
///
/// Used as a singular mass operator: entries outside the range are algebraic
/// unknowns (e.g. Lagrange multipliers) without inertia.
#[derive(Debug, Clone, Copy)]
pub struct Projector {
    size: usize,
    first: usize,
    next: usize,
}

impl Projector {
    pub fn new(size: usize, first: usize, next: usize) -> FuncResult<Self> {
        if first > next {
            return Err(FuncError::InvalidArg {
                what: "projector range start after its end",
            });
        }
        ensure_within("projector range", next, size)?;
        Ok(Self { size, first, next })
    }
}

impl ResidualFunction for Projector {
    fn dim_x(&self) -> usize {
        self.size
    }

    fn dim_f(&self) -> usize {
        self.size
    }

    fn evaluate(&self, x: DVectorView<'_, f64>, mut f: DVectorViewMut<'_, f64>) {
        let len = self.next - self.first;
        f.fill(0.0);
        f.rows_mut(self.first, len)
            .copy_from(&x.rows(self.first, len));
    }

    fn evaluate_deriv(&self, _x: DVectorView<'_, f64>, mut df: DMatrixViewMut<'_, f64>) {
        df.fill(0.0);
        for i in self.first..self.next {
            df[(i, i)] = 1.0;
        }
    }
}
