//! Error types for building and evaluating residual functions.

use thiserror::Error;

/// Result type for function algebra operations.
pub type FuncResult<T> = Result<T, FuncError>;

/// Structural errors in an expression.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FuncError {
    /// Operand or argument sizes do not fit together.
    #[error("Dimension mismatch for {what}: expected {expected}, found {found}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// A range or row index lies outside its container.
    #[error("Index out of bounds: {what} (index={index}, len={len})")]
    IndexOob {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

pub(crate) fn ensure_dim(what: &'static str, expected: usize, found: usize) -> FuncResult<()> {
    if expected == found {
        Ok(())
    } else {
        Err(FuncError::DimensionMismatch {
            what,
            expected,
            found,
        })
    }
}

pub(crate) fn ensure_within(what: &'static str, end: usize, len: usize) -> FuncResult<()> {
    if end <= len {
        Ok(())
    } else {
        Err(FuncError::IndexOob {
            what,
            index: end,
            len,
        })
    }
}
