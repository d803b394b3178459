use crate::{CoreError, CoreResult};

/// Mixed absolute/relative tolerance for comparing trajectories and roots.
///
/// Two values agree when their difference is below `abs` or below `rel` times
/// the larger magnitude.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tolerances {
    pub abs: f64,
    pub rel: f64,
}

impl Tolerances {
    pub const fn new(abs: f64, rel: f64) -> Self {
        Self { abs, rel }
    }

    pub fn accepts(&self, a: f64, b: f64) -> bool {
        let diff = (a - b).abs();
        diff <= self.abs || diff <= self.rel * a.abs().max(b.abs())
    }

    /// Component-wise [`Tolerances::accepts`]; slices of different length
    /// never agree.
    pub fn accepts_all(&self, a: &[f64], b: &[f64]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| self.accepts(*x, *y))
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Self::new(1e-12, 1e-9)
    }
}

pub fn nearly_equal(a: f64, b: f64, tol: Tolerances) -> bool {
    tol.accepts(a, b)
}

pub fn ensure_finite(v: f64, what: &'static str) -> CoreResult<f64> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// First non-finite entry of `values`, if any, as an error.
pub fn ensure_all_finite<'a, I>(values: I, what: &'static str) -> CoreResult<()>
where
    I: IntoIterator<Item = &'a f64>,
{
    values
        .into_iter()
        .try_for_each(|v| ensure_finite(*v, what).map(|_| ()))
}

/// Reject non-positive or non-finite values (step sizes, end times).
pub fn ensure_positive(v: f64, what: &'static str) -> CoreResult<f64> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(CoreError::InvalidArg { what })
    }
}

/// Accept `v` in the closed interval `[0, 1]`.
pub fn ensure_unit_interval(v: f64, what: &'static str) -> CoreResult<f64> {
    let v = ensure_finite(v, what)?;
    if (0.0..=1.0).contains(&v) {
        Ok(v)
    } else {
        Err(CoreError::InvalidArg { what })
    }
}
