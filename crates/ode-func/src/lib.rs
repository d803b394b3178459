//! Residual function algebra.
//!
//! A residual function maps an unknown vector `x` (length `dim_x`) to a defect
//! vector `f` (length `dim_f`) and supplies its Jacobian. Expressions are built
//! by combining shared [`Func`] handles:
//! - primitives: [`Identity`], [`Constant`], [`Projector`]
//! - combinators: [`Sum`], [`Scale`], [`Compose`], [`Embed`]
//! - block forms: [`BlockFunction`], [`BlockMatVec`]
//! - user leaves implementing [`ResidualFunction`] directly, or
//!   [`FiniteDifference`] when no analytic Jacobian is at hand
//!
//! Values and Jacobians compose exactly through the tree. Nodes are immutable
//! after construction apart from the payload of a [`Constant`], which is
//! updated through the [`SettableLeaf`] capability. A node can only refer to
//! nodes that already exist, so expression graphs are acyclic.

pub mod block;
pub mod combinators;
pub mod error;
pub mod finite_diff;
pub mod function;
pub mod primitives;

pub use block::{BlockFunction, BlockMatVec};
pub use combinators::{Compose, Embed, Scale, Sum};
pub use error::{FuncError, FuncResult};
pub use finite_diff::{FiniteDifference, central_difference_jacobian, jacobian_deviation};
pub use function::{Func, ResidualFunction, compose};
pub use primitives::{Constant, Identity, Projector, SettableLeaf};

// Buffer types appearing in the `ResidualFunction` signatures
pub use nalgebra::{DMatrix, DMatrixViewMut, DVector, DVectorView, DVectorViewMut};
