use std::{
    cmp::Ordering,
    ops::{Add, Mul, Neg, Sub},
};

use num_bigint::BigUint;
use num_traits::{One, Zero};

use super::environment::PositEnvironment;

/// The fields of one posit pattern.
///
/// For a finite, non-zero posit the represented value is
/// `(-1)^negative * useed^regime * 2^exponent * (1 + fraction / 2^fraction_bits)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPosit {
    pub is_zero: bool,
    pub is_infinite: bool,
    pub negative: bool,
    pub regime: i64,
    pub exponent: u64,
    pub fraction: BigUint,
    pub fraction_bits: usize,
}

impl DecodedPosit {
    pub(crate) fn zero() -> Self {
        DecodedPosit {
            is_zero: true,
            is_infinite: false,
            negative: false,
            regime: 0,
            exponent: 0,
            fraction: BigUint::zero(),
            fraction_bits: 0,
        }
    }

    pub(crate) fn infinite() -> Self {
        DecodedPosit {
            is_infinite: true,
            is_zero: false,
            ..Self::zero()
        }
    }

    /// Power of two carried by the hidden bit: `regime * 2^es + exponent`.
    pub fn scale(&self, environment: &PositEnvironment) -> i64 {
        self.regime * environment.useed_exponent() as i64 + self.exponent as i64
    }

    /// The fraction with its hidden bit, i.e. `2^fraction_bits + fraction`.
    pub fn significand(&self) -> BigUint {
        (BigUint::one() << self.fraction_bits) | &self.fraction
    }

    pub fn to_exact(&self, environment: &PositEnvironment) -> ExactValue {
        if self.is_infinite {
            return ExactValue::Infinite;
        }
        if self.is_zero {
            return ExactValue::Zero;
        }
        ExactValue::finite(
            self.negative,
            self.scale(environment) - self.fraction_bits as i64,
            self.significand(),
        )
    }
}

/// An exact finite non-zero value, `(-1)^negative * mantissa * 2^scale`.
///
/// The mantissa is not normalised; the encoder finds its leading bit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpackedPosit {
    pub negative: bool,
    pub scale: i64,
    pub mantissa: BigUint,
}

/// Result of an exact computation, before rounding into a format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExactValue {
    Zero,
    /// Also stands for every undefined result (`0 * inf`, `x / 0`, ...).
    Infinite,
    Finite(UnpackedPosit),
}

impl ExactValue {
    /// A zero mantissa collapses to [`ExactValue::Zero`].
    pub fn finite(negative: bool, scale: i64, mantissa: BigUint) -> Self {
        if mantissa.is_zero() {
            ExactValue::Zero
        } else {
            ExactValue::Finite(UnpackedPosit {
                negative,
                scale,
                mantissa,
            })
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, ExactValue::Zero)
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, ExactValue::Infinite)
    }

    /// Division is the one operation that is not exact: the quotient carries at least
    /// `precision + 1` significant bits plus a sticky bit, which is enough for a correctly rounded
    /// encode into any format no wider than `precision`.
    pub fn quotient(&self, divisor: &Self, precision: usize) -> Self {
        match (self, divisor) {
            (ExactValue::Infinite, _) | (_, ExactValue::Infinite) | (_, ExactValue::Zero) => {
                ExactValue::Infinite
            }
            (ExactValue::Zero, _) => ExactValue::Zero,
            (ExactValue::Finite(a), ExactValue::Finite(b)) => {
                let extra = precision + b.mantissa.bits() as usize + 2;
                let numerator = &a.mantissa << extra;
                let mut quotient = &numerator / &b.mantissa;
                let mut scale = a.scale - b.scale - extra as i64;
                if !(numerator % &b.mantissa).is_zero() {
                    quotient = (quotient << 1usize) + BigUint::one();
                    scale -= 1;
                }
                ExactValue::finite(a.negative != b.negative, scale, quotient)
            }
        }
    }

    /// Rounds toward zero to an integer.
    pub fn trunc(&self) -> Self {
        self.to_integer(false)
    }

    /// Rounds to the nearest integer, ties away from zero.
    pub fn round_half_away(&self) -> Self {
        self.to_integer(true)
    }

    fn to_integer(&self, round_half: bool) -> Self {
        let ExactValue::Finite(value) = self else {
            return self.clone();
        };
        if value.scale >= 0 {
            return self.clone();
        }
        let shift = value.scale.unsigned_abs();
        let mut integer = &value.mantissa >> shift;
        if round_half && value.mantissa.bit(shift - 1) {
            integer += 1u8;
        }
        ExactValue::finite(value.negative, 0, integer)
    }

    /// Total order on values: infinite sorts below every real, then reals ascending.
    pub fn value_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (ExactValue::Infinite, ExactValue::Infinite) | (ExactValue::Zero, ExactValue::Zero) => {
                Ordering::Equal
            }
            (ExactValue::Infinite, _) => Ordering::Less,
            (_, ExactValue::Infinite) => Ordering::Greater,
            (ExactValue::Zero, ExactValue::Finite(b)) => {
                if b.negative {
                    Ordering::Greater
                } else {
                    Ordering::Less
                }
            }
            (ExactValue::Finite(a), ExactValue::Zero) => {
                if a.negative {
                    Ordering::Less
                } else {
                    Ordering::Greater
                }
            }
            (ExactValue::Finite(a), ExactValue::Finite(b)) => match (a.negative, b.negative) {
                (false, true) => Ordering::Greater,
                (true, false) => Ordering::Less,
                (false, false) => magnitude_cmp(a, b),
                (true, true) => magnitude_cmp(b, a),
            },
        }
    }
}

/// Brings both mantissas to the smaller of the two scales.
fn align(a: &UnpackedPosit, b: &UnpackedPosit) -> (BigUint, BigUint, i64) {
    let scale = a.scale.min(b.scale);
    (
        &a.mantissa << (a.scale - scale) as u64,
        &b.mantissa << (b.scale - scale) as u64,
        scale,
    )
}

fn magnitude_cmp(a: &UnpackedPosit, b: &UnpackedPosit) -> Ordering {
    let top_a = a.scale + a.mantissa.bits() as i64;
    let top_b = b.scale + b.mantissa.bits() as i64;
    top_a.cmp(&top_b).then_with(|| {
        let (a, b, _) = align(a, b);
        a.cmp(&b)
    })
}

impl Neg for &ExactValue {
    type Output = ExactValue;

    fn neg(self) -> ExactValue {
        match self {
            ExactValue::Finite(value) => ExactValue::Finite(UnpackedPosit {
                negative: !value.negative,
                ..value.clone()
            }),
            other => other.clone(),
        }
    }
}

impl Add for &ExactValue {
    type Output = ExactValue;

    fn add(self, rhs: Self) -> ExactValue {
        match (self, rhs) {
            (ExactValue::Infinite, _) | (_, ExactValue::Infinite) => ExactValue::Infinite,
            (ExactValue::Zero, other) | (other, ExactValue::Zero) => other.clone(),
            (ExactValue::Finite(a), ExactValue::Finite(b)) => {
                let (ma, mb, scale) = align(a, b);
                if a.negative == b.negative {
                    return ExactValue::finite(a.negative, scale, ma + mb);
                }
                match ma.cmp(&mb) {
                    Ordering::Equal => ExactValue::Zero,
                    Ordering::Greater => ExactValue::finite(a.negative, scale, ma - mb),
                    Ordering::Less => ExactValue::finite(b.negative, scale, mb - ma),
                }
            }
        }
    }
}

impl Sub for &ExactValue {
    type Output = ExactValue;

    fn sub(self, rhs: Self) -> ExactValue {
        self + &(-rhs)
    }
}

impl Mul for &ExactValue {
    type Output = ExactValue;

    fn mul(self, rhs: Self) -> ExactValue {
        match (self, rhs) {
            (ExactValue::Infinite, _) | (_, ExactValue::Infinite) => ExactValue::Infinite,
            (ExactValue::Zero, _) | (_, ExactValue::Zero) => ExactValue::Zero,
            (ExactValue::Finite(a), ExactValue::Finite(b)) => ExactValue::finite(
                a.negative != b.negative,
                a.scale + b.scale,
                &a.mantissa * &b.mantissa,
            ),
        }
    }
}
