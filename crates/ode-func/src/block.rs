//! Block-structured functions used to assemble multi-stage systems.

use nalgebra::{DMatrix, DMatrixViewMut, DVector, DVectorView, DVectorViewMut};

use crate::error::{FuncError, FuncResult, ensure_dim};
use crate::function::{Func, ResidualFunction, full_view_mut};

/// Stacks the outputs of several functions of the same input vertically.
#[derive(Debug, Clone)]
pub struct BlockFunction {
    funcs: Vec<Func>,
    dim_f: usize,
}

impl BlockFunction {
    pub fn new(funcs: Vec<Func>) -> FuncResult<Self> {
        let Some(first) = funcs.first() else {
            return Err(FuncError::InvalidArg {
                what: "block function needs at least one block",
            });
        };
        let dim_x = first.dim_x();
        for func in &funcs {
            ensure_dim("block function inputs", dim_x, func.dim_x())?;
        }
        let dim_f = funcs.iter().map(|func| func.dim_f()).sum();
        Ok(Self { funcs, dim_f })
    }

    /// Number of stacked blocks.
    pub fn num_blocks(&self) -> usize {
        self.funcs.len()
    }
}

impl ResidualFunction for BlockFunction {
    fn dim_x(&self) -> usize {
        self.funcs[0].dim_x()
    }

    fn dim_f(&self) -> usize {
        self.dim_f
    }

    fn evaluate(&self, x: DVectorView<'_, f64>, mut f: DVectorViewMut<'_, f64>) {
        let mut offset = 0;
        for func in &self.funcs {
            let rows = func.dim_f();
            func.evaluate(x, f.rows_mut(offset, rows));
            offset += rows;
        }
    }

    fn evaluate_deriv(&self, x: DVectorView<'_, f64>, mut df: DMatrixViewMut<'_, f64>) {
        let mut offset = 0;
        for func in &self.funcs {
            let rows = func.dim_f();
            func.evaluate_deriv(x, df.rows_mut(offset, rows));
            offset += rows;
        }
    }
}

/// Row `row` of a block matrix-vector product.
///
/// The output of `vecfun` is read as `s` consecutive blocks of length
/// `n = vecfun.dim_f() / s`, where `s` is the order of the square matrix `a`:
///
/// `f(x) = sum_l a[(row, l)] * block_l(vecfun(x))`
///
/// With `vecfun` the identity on the stacked Runge-Kutta stage vector this is
/// the stage increment `sum_l a_jl k_l`, and the Jacobian reduces to the blocks
/// `a[(row, l)] * I(n)`.
#[derive(Debug, Clone)]
pub struct BlockMatVec {
    a: DMatrix<f64>,
    vecfun: Func,
    row: usize,
    block_len: usize,
}

impl BlockMatVec {
    pub fn new(a: DMatrix<f64>, vecfun: Func, row: usize) -> FuncResult<Self> {
        let s = a.nrows();
        ensure_dim("block matrix columns", s, a.ncols())?;
        if s == 0 {
            return Err(FuncError::InvalidArg {
                what: "block matrix must not be empty",
            });
        }
        if row >= s {
            return Err(FuncError::IndexOob {
                what: "block matrix row",
                index: row,
                len: s,
            });
        }
        if vecfun.dim_f() % s != 0 {
            return Err(FuncError::InvalidArg {
                what: "block vector length must be a multiple of the matrix order",
            });
        }
        let block_len = vecfun.dim_f() / s;
        Ok(Self {
            a,
            vecfun,
            row,
            block_len,
        })
    }
}

impl ResidualFunction for BlockMatVec {
    fn dim_x(&self) -> usize {
        self.vecfun.dim_x()
    }

    fn dim_f(&self) -> usize {
        self.block_len
    }

    fn evaluate(&self, x: DVectorView<'_, f64>, mut f: DVectorViewMut<'_, f64>) {
        let n = self.block_len;
        let mut stacked = DVector::zeros(self.vecfun.dim_f());
        self.vecfun.evaluate(x, stacked.column_mut(0));

        f.fill(0.0);
        for l in 0..self.a.ncols() {
            f.axpy(self.a[(self.row, l)], &stacked.rows(n * l, n), 1.0);
        }
    }

    fn evaluate_deriv(&self, x: DVectorView<'_, f64>, mut df: DMatrixViewMut<'_, f64>) {
        let n = self.block_len;
        let mut jac = DMatrix::zeros(self.vecfun.dim_f(), self.vecfun.dim_x());
        self.vecfun.evaluate_deriv(x, full_view_mut(&mut jac));

        df.fill(0.0);
        for l in 0..self.a.ncols() {
            let coeff = self.a[(self.row, l)];
            if coeff != 0.0 {
                df += &(jac.rows(n * l, n) * coeff);
            }
        }
    }
}
