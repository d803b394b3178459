//! ode-core: scalar helpers shared by the odeflow crates.
//!
//! - numeric: tolerances and argument validation for step sizes, end times
//!   and method coefficients
//! - error: the shared [`CoreError`]

pub mod error;
pub mod numeric;

pub use error::{CoreError, CoreResult};
pub use numeric::*;
