//! Posit (type-III unum) arithmetic over runtime-configured formats.
//!
//! A [`PositEnvironment`] fixes the total width and the maximum exponent field width of one
//! format; [`Posit`] values carry a bit pattern of that width and a shared handle to their
//! environment. Arithmetic decodes both operands, computes the exact result and rounds it back
//! once (round to nearest, ties to even), saturating at maxpos/minpos.
//!
//! ```
//! use std::sync::Arc;
//!
//! use posit_env::{Posit, PositEnvironment};
//!
//! let env = Arc::new(PositEnvironment::new(16, 1)?);
//! let a = Posit::from_real(&env, 1.5);
//! let b = Posit::from_real(&env, 2.25);
//! assert_eq!((&a * &b).to_real(), 3.375);
//! assert!(a.less_than(&b)?);
//! # Ok::<(), posit_env::PositError>(())
//! ```

pub mod bitmask;
pub mod error;
pub mod posit;

pub use bitmask::BitMask;
pub use error::{PositError, Result};
pub use posit::{
    DecodedPosit, EnvironmentRegistry, ExactValue, Posit, PositEnvironment, UnpackedPosit,
    STANDARD_EXPONENT_SIZE, fused_dot, fused_sum, to_posit, to_real,
};
