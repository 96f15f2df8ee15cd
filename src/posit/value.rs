use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    ops::{Add, Div, Mul, Neg, Sub},
    sync::Arc,
};

use num_traits::ToPrimitive;

use crate::{bitmask::BitMask, error::Result};

use super::{
    convert,
    core::{DecodedPosit, ExactValue},
    decode::decode,
    encode::encode,
    environment::PositEnvironment,
};

/// A posit value: a bit pattern plus the format it is read in.
///
/// Values are immutable; every operation returns a new `Posit`. Binary operations require both
/// operands to use equal environments. The `try_*` methods report a mismatch as
/// [`PositError::EnvironmentMismatch`](crate::PositError::EnvironmentMismatch); the operator
/// traits panic on it.
#[derive(Clone)]
pub struct Posit {
    bits: BitMask,
    environment: Arc<PositEnvironment>,
}

impl Posit {
    /// Reads `bits` in `environment`, re-tagging the storage to the environment's width.
    pub fn from_bits(environment: &Arc<PositEnvironment>, bits: &BitMask) -> Self {
        Posit {
            bits: bits.with_width(environment.size()),
            environment: Arc::clone(environment),
        }
    }

    pub fn from_u64_bits(environment: &Arc<PositEnvironment>, bits: u64) -> Self {
        Self::from_bits(environment, &BitMask::from_u64(environment.size(), bits))
    }

    /// Rounds an exact value into `environment`.
    pub fn from_exact(environment: &Arc<PositEnvironment>, value: &ExactValue) -> Self {
        Posit {
            bits: encode(value, environment),
            environment: Arc::clone(environment),
        }
    }

    pub fn from_real(environment: &Arc<PositEnvironment>, value: f64) -> Self {
        convert::to_posit(environment, value)
    }

    pub fn zero(environment: &Arc<PositEnvironment>) -> Self {
        Self::from_bits(environment, &environment.zero_bits())
    }

    /// The reserved non-real pattern.
    pub fn infinite(environment: &Arc<PositEnvironment>) -> Self {
        Self::from_bits(environment, &environment.infinite_bits())
    }

    pub fn one(environment: &Arc<PositEnvironment>) -> Self {
        let bits = BitMask::new(environment.size()).set_bit(environment.first_regime_bit_position());
        Self::from_bits(environment, &bits)
    }

    pub fn max_pos(environment: &Arc<PositEnvironment>) -> Self {
        Self::from_bits(environment, &environment.max_pos_bits())
    }

    pub fn min_pos(environment: &Arc<PositEnvironment>) -> Self {
        Self::from_bits(environment, &environment.min_pos_bits())
    }

    pub fn bits(&self) -> &BitMask {
        &self.bits
    }

    pub fn environment(&self) -> &Arc<PositEnvironment> {
        &self.environment
    }

    pub fn decode(&self) -> DecodedPosit {
        decode(&self.bits, &self.environment)
    }

    pub fn to_exact(&self) -> ExactValue {
        self.decode().to_exact(&self.environment)
    }

    /// Best-effort `f64`; the reserved pattern reads as NaN.
    pub fn to_real(&self) -> f64 {
        convert::to_real(self)
    }

    pub fn is_zero(&self) -> bool {
        self.bits.is_zero()
    }

    pub fn is_infinite(&self) -> bool {
        &self.bits == self.environment.sign_bit_mask()
    }

    pub fn is_negative(&self) -> bool {
        self.bits.test_bit(self.environment.size() - 1) && !self.is_infinite()
    }

    pub fn try_add(&self, rhs: &Self) -> Result<Self> {
        self.combine(rhs, |a, b| a + b)
    }

    pub fn try_sub(&self, rhs: &Self) -> Result<Self> {
        self.combine(rhs, |a, b| a - b)
    }

    pub fn try_mul(&self, rhs: &Self) -> Result<Self> {
        self.combine(rhs, |a, b| a * b)
    }

    pub fn try_div(&self, rhs: &Self) -> Result<Self> {
        let precision = self.environment.size();
        self.combine(rhs, |a, b| a.quotient(b, precision))
    }

    /// Compares represented values. The reserved pattern orders below every real.
    pub fn try_cmp(&self, rhs: &Self) -> Result<Ordering> {
        self.environment.ensure_compatible(&rhs.environment)?;
        Ok(self.to_exact().value_cmp(&rhs.to_exact()))
    }

    pub fn equals(&self, rhs: &Self) -> Result<bool> {
        Ok(self.try_cmp(rhs)? == Ordering::Equal)
    }

    pub fn less_than(&self, rhs: &Self) -> Result<bool> {
        Ok(self.try_cmp(rhs)? == Ordering::Less)
    }

    pub fn abs(&self) -> Self {
        if self.is_negative() { -self } else { self.clone() }
    }

    /// Rounds toward zero to an integer.
    pub fn trunc(&self) -> Self {
        Self::from_exact(&self.environment, &self.to_exact().trunc())
    }

    /// Rounds to the nearest integer, ties away from zero.
    pub fn round(&self) -> Self {
        Self::from_exact(&self.environment, &self.to_exact().round_half_away())
    }

    fn combine(
        &self,
        rhs: &Self,
        op: impl FnOnce(&ExactValue, &ExactValue) -> ExactValue,
    ) -> Result<Self> {
        self.environment.ensure_compatible(&rhs.environment)?;
        let value = op(&self.to_exact(), &rhs.to_exact());
        Ok(Self::from_exact(&self.environment, &value))
    }
}

impl Neg for &Posit {
    type Output = Posit;

    /// Two's complement of the pattern; zero and the reserved pattern map to themselves.
    fn neg(self) -> Posit {
        Posit {
            bits: self.bits.twos_complement_negate(),
            environment: Arc::clone(&self.environment),
        }
    }
}

impl Neg for Posit {
    type Output = Posit;

    fn neg(self) -> Posit {
        -&self
    }
}

macro_rules! impl_binary_op {
    ($($trait:ident, $method:ident, $checked:ident;)+) => {
        $(
            impl $trait<&Posit> for &Posit {
                type Output = Posit;

                /// # Panics
                ///
                /// Panics if the operands use different environments.
                fn $method(self, rhs: &Posit) -> Posit {
                    self.$checked(rhs).unwrap_or_else(|err| panic!("{err}"))
                }
            }

            impl $trait for Posit {
                type Output = Posit;

                fn $method(self, rhs: Posit) -> Posit {
                    (&self).$method(&rhs)
                }
            }
        )+
    };
}

impl_binary_op! {
    Add, add, try_add;
    Sub, sub, try_sub;
    Mul, mul, try_mul;
    Div, div, try_div;
}

impl PartialEq for Posit {
    fn eq(&self, other: &Self) -> bool {
        self.environment == other.environment && self.bits == other.bits
    }
}

impl Eq for Posit {}

impl Hash for Posit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.environment.hash(state);
        self.bits.hash(state);
    }
}

impl PartialOrd for Posit {
    /// `None` only when the environments differ.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.try_cmp(other).ok()
    }
}

impl ToPrimitive for Posit {
    fn to_i64(&self) -> Option<i64> {
        self.to_real().to_i64()
    }

    fn to_u64(&self) -> Option<u64> {
        self.to_real().to_u64()
    }

    fn to_f64(&self) -> Option<f64> {
        let value = self.to_real();
        (!value.is_nan()).then_some(value)
    }
}

impl fmt::Display for Posit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_infinite() {
            return write!(f, "NaR");
        }
        write!(f, "{}", self.to_real())
    }
}

impl fmt::Binary for Posit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Binary::fmt(&self.bits, f)
    }
}

impl fmt::Debug for Posit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Posit<{}, {}>({:#b})",
            self.environment.size(),
            self.environment.max_exponent_size(),
            self.bits
        )
    }
}
