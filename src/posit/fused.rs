//! Single-rounding reductions.
//!
//! Every partial sum and product is kept exact and the result is rounded once at the end, which is
//! what the posit standard's quire gives without a fixed-size accumulator register.

use std::sync::Arc;

use ndarray::ArrayView1;

use crate::error::{PositError, Result};

use super::{core::ExactValue, environment::PositEnvironment, value::Posit};

/// Sum of `values` rounded once into `environment`. An empty slice sums to zero.
pub fn fused_sum(environment: &Arc<PositEnvironment>, values: &[Posit]) -> Result<Posit> {
    let mut accumulator = ExactValue::Zero;
    for value in values {
        environment.ensure_compatible(value.environment())?;
        accumulator = &accumulator + &value.to_exact();
    }
    Ok(Posit::from_exact(environment, &accumulator))
}

/// Dot product of `a` and `b` rounded once into `environment`.
pub fn fused_dot(
    environment: &Arc<PositEnvironment>,
    a: ArrayView1<'_, Posit>,
    b: ArrayView1<'_, Posit>,
) -> Result<Posit> {
    if a.len() != b.len() {
        return Err(PositError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let mut accumulator = ExactValue::Zero;
    for (x, y) in a.iter().zip(b.iter()) {
        environment.ensure_compatible(x.environment())?;
        environment.ensure_compatible(y.environment())?;
        accumulator = &accumulator + &(&x.to_exact() * &y.to_exact());
    }
    Ok(Posit::from_exact(environment, &accumulator))
}
