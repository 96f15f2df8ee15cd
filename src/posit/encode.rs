use num_bigint::BigUint;
use num_traits::{One, Zero};
use tracing::trace;

use crate::bitmask::BitMask;

use super::{
    core::{ExactValue, UnpackedPosit},
    environment::PositEnvironment,
};

/// Nearest pattern to an exact value, rounding to nearest with ties to even.
///
/// Magnitudes above maxpos saturate to maxpos and magnitudes below minpos to minpos; only
/// [`ExactValue::Infinite`] produces the reserved pattern.
pub fn encode(value: &ExactValue, environment: &PositEnvironment) -> BitMask {
    match value {
        ExactValue::Zero => environment.zero_bits(),
        ExactValue::Infinite => environment.infinite_bits(),
        ExactValue::Finite(unpacked) => encode_unpacked(unpacked, environment),
    }
}

/// Encodes `(-1)^negative * useed^regime * 2^exponent * (1 + fraction / 2^fraction_bits)`.
///
/// `fraction_bits` may exceed the room the format has; the excess is rounded away.
pub fn encode_fields(
    negative: bool,
    regime: i64,
    exponent: u64,
    fraction: &BigUint,
    fraction_bits: usize,
    environment: &PositEnvironment,
) -> BitMask {
    debug_assert!(exponent < environment.useed_exponent());
    debug_assert!(fraction.bits() <= fraction_bits as u64);

    let mantissa = (BigUint::one() << fraction_bits) | fraction;
    let scale = regime * environment.useed_exponent() as i64 + exponent as i64
        - fraction_bits as i64;
    encode(&ExactValue::finite(negative, scale, mantissa), environment)
}

fn encode_unpacked(unpacked: &UnpackedPosit, environment: &PositEnvironment) -> BitMask {
    if unpacked.mantissa.is_zero() {
        return environment.zero_bits();
    }

    let msb = unpacked.mantissa.bits() - 1;
    let scale = unpacked.scale + msb as i64;
    let useed_exponent = environment.useed_exponent() as i64;
    let regime = scale.div_euclid(useed_exponent);
    let exponent = scale.rem_euclid(useed_exponent) as u64;

    let magnitude = if regime >= environment.max_regime() {
        trace!(regime, "posit encode saturated to maxpos");
        environment.max_pos_bits()
    } else if regime < environment.min_regime() {
        trace!(regime, "posit encode saturated to minpos");
        environment.min_pos_bits()
    } else {
        round_magnitude(regime, exponent, &unpacked.mantissa, msb as usize, environment)
    };

    if unpacked.negative {
        magnitude.twos_complement_negate()
    } else {
        magnitude
    }
}

/// Lays out regime, exponent and fraction as one unbounded bit string, cuts it to the width
/// below the sign bit and rounds.
///
/// Positive posit patterns are ordered like their values, so rounding up is a plain increment of
/// the cut pattern: a carry out of the fraction bumps the exponent and a carry out of the exponent
/// lengthens the regime. The regime always fits here, which keeps the result between minpos and
/// maxpos.
fn round_magnitude(
    regime: i64,
    exponent: u64,
    mantissa: &BigUint,
    msb: usize,
    environment: &PositEnvironment,
) -> BitMask {
    let width = environment.size() - 1;
    let max_exponent_size = environment.max_exponent_size() as usize;

    let (regime_pattern, regime_length) = if regime >= 0 {
        let ones = regime as usize + 1;
        (((BigUint::one() << ones) - 1u8) << 1usize, ones + 1)
    } else {
        (BigUint::one(), regime.unsigned_abs() as usize + 1)
    };
    debug_assert!(regime_length <= width);

    let fraction = mantissa - (BigUint::one() << msb);
    let ideal = (regime_pattern << (max_exponent_size + msb))
        | (BigUint::from(exponent) << msb)
        | fraction;
    let ideal_length = regime_length + max_exponent_size + msb;

    if ideal_length <= width {
        return BitMask::from_biguint(environment.size(), &(ideal << (width - ideal_length)));
    }

    let cut = ideal_length - width;
    let kept = BitMask::from_biguint(environment.size(), &(&ideal >> cut));
    let guard = ideal.bit(cut as u64 - 1);
    let sticky = ideal
        .trailing_zeros()
        .is_some_and(|zeros| zeros < cut as u64 - 1);

    if guard && (sticky || kept.test_bit(0)) {
        kept.increment()
    } else {
        kept
    }
}
