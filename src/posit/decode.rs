use crate::bitmask::BitMask;

use super::{core::DecodedPosit, environment::PositEnvironment};

/// Splits a pattern into sign, regime, exponent and fraction. Exact for every pattern.
pub fn decode(bits: &BitMask, environment: &PositEnvironment) -> DecodedPosit {
    debug_assert_eq!(bits.width(), environment.size());

    if bits.is_zero() {
        return DecodedPosit::zero();
    }
    if bits == environment.sign_bit_mask() {
        return DecodedPosit::infinite();
    }

    let negative = bits.test_bit(environment.size() - 1);
    let magnitude = if negative {
        bits.twos_complement_negate()
    } else {
        bits.clone()
    };

    // The regime is a run of identical bits below the sign, closed by the first differing bit
    // or by the end of the pattern.
    let first = environment.first_regime_bit_position();
    let run_bit = magnitude.test_bit(first);
    let mut run_length = 0;
    let mut terminated = false;
    for position in (0..=first).rev() {
        if magnitude.test_bit(position) != run_bit {
            terminated = true;
            break;
        }
        run_length += 1;
    }

    let regime = if run_bit {
        run_length as i64 - 1
    } else {
        -(run_length as i64)
    };
    let regime_length = run_length + usize::from(terminated);

    let remaining = environment.size() - 1 - regime_length;
    let max_exponent_size = environment.max_exponent_size() as usize;
    let exponent_length = remaining.min(max_exponent_size);
    let fraction_bits = remaining - exponent_length;

    // Exponent bits cut off by a long regime are the low ones, and read as zero.
    let exponent = magnitude
        .shift_right(fraction_bits)
        .mask_low(exponent_length)
        .to_u64()
        << (max_exponent_size - exponent_length);
    let fraction = magnitude.mask_low(fraction_bits).to_biguint();

    DecodedPosit {
        is_zero: false,
        is_infinite: false,
        negative,
        regime,
        exponent,
        fraction,
        fraction_bits,
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigUint;
    use rstest::rstest;
    use softposit::{P16, P32};

    use super::*;
    use crate::posit::convert::exact_to_f64;

    fn environment(size: usize, es: u32) -> PositEnvironment {
        PositEnvironment::new(size, es).unwrap()
    }

    fn value_of(bits: u64, environment: &PositEnvironment) -> f64 {
        let decoded = decode(&BitMask::from_u64(environment.size(), bits), environment);
        exact_to_f64(&decoded.to_exact(environment))
    }

    #[test]
    fn test_decode_specials() {
        let env = environment(8, 2);
        assert!(decode(&BitMask::from_u64(8, 0b0000_0000), &env).is_zero);
        assert!(decode(&BitMask::from_u64(8, 0b1000_0000), &env).is_infinite);
    }

    #[test]
    fn test_decode_one() {
        let env = environment(8, 2);
        let decoded = decode(&BitMask::from_u64(8, 0b0100_0000), &env);
        assert!(!decoded.negative);
        assert_eq!(decoded.regime, 0);
        assert_eq!(decoded.exponent, 0);
        assert_eq!(decoded.fraction_bits, 3);
        assert_eq!(decoded.fraction, BigUint::from(0u8));
        assert_eq!(value_of(0b0100_0000, &env), 1.0);
    }

    #[test]
    fn test_decode_one_over_useed() {
        // 0 01 00 000: a single zero closed by a one is regime -1, i.e. 1/16.
        let env = environment(8, 2);
        let decoded = decode(&BitMask::from_u64(8, 0b0010_0000), &env);
        assert_eq!(decoded.regime, -1);
        assert_eq!(decoded.exponent, 0);
        assert_eq!(decoded.fraction_bits, 3);
        assert_eq!(value_of(0b0010_0000, &env), 1.0 / 16.0);
    }

    #[test]
    fn test_decode_fields() {
        // 0 110 01 01: regime 1, exponent 1, fraction 1/4 -> 16 * 2 * 1.25 = 40
        let env = environment(8, 2);
        let decoded = decode(&BitMask::from_u64(8, 0b0110_0101), &env);
        assert_eq!(decoded.regime, 1);
        assert_eq!(decoded.exponent, 1);
        assert_eq!(decoded.fraction, BigUint::from(1u8));
        assert_eq!(decoded.fraction_bits, 2);
        assert_eq!(value_of(0b0110_0101, &env), 40.0);
    }

    #[test]
    fn test_decode_saturated_regimes() {
        let env = environment(8, 2);
        let max_pos = decode(&BitMask::from_u64(8, 0b0111_1111), &env);
        assert_eq!(max_pos.regime, 6);
        assert_eq!(max_pos.fraction_bits, 0);
        assert_eq!(value_of(0b0111_1111, &env), 2f64.powi(24));

        let min_pos = decode(&BitMask::from_u64(8, 0b0000_0001), &env);
        assert_eq!(min_pos.regime, -6);
        assert_eq!(value_of(0b0000_0001, &env), 2f64.powi(-24));
    }

    #[test]
    fn test_decode_truncated_exponent() {
        // 0 111110 1: one exponent bit survives and is the high bit of the field.
        let env = environment(8, 2);
        let decoded = decode(&BitMask::from_u64(8, 0b0111_1101), &env);
        assert_eq!(decoded.regime, 4);
        assert_eq!(decoded.exponent, 2);
        assert_eq!(decoded.fraction_bits, 0);
        assert_eq!(value_of(0b0111_1101, &env), 2f64.powi(18));
    }

    #[test]
    fn test_decode_negative() {
        let env = environment(8, 2);
        let decoded = decode(&BitMask::from_u64(8, 0b1100_0000), &env);
        assert!(decoded.negative);
        assert_eq!(decoded.regime, 0);
        assert_eq!(value_of(0b1100_0000, &env), -1.0);
        assert_eq!(value_of(0b1111_1111, &env), -(2f64.powi(-24)));
    }

    #[rstest]
    #[case(2, 0)]
    #[case(5, 1)]
    #[case(8, 0)]
    #[case(8, 1)]
    #[case(8, 2)]
    #[case(10, 3)]
    fn test_decode_total_and_sign_symmetric(#[case] size: usize, #[case] es: u32) {
        let env = environment(size, es);
        for pattern in 0..(1u64 << size) {
            let bits = BitMask::from_u64(size, pattern);
            let decoded = decode(&bits, &env);
            let classes = [
                decoded.is_zero,
                decoded.is_infinite,
                !decoded.is_zero && !decoded.is_infinite,
            ];
            assert_eq!(classes.iter().filter(|&&c| c).count(), 1);

            if decoded.is_zero || decoded.is_infinite {
                continue;
            }
            let negated = decode(&bits.twos_complement_negate(), &env);
            assert_eq!(negated.negative, !decoded.negative);
            assert_eq!(
                value_of(bits.twos_complement_negate().to_u64(), &env),
                -value_of(pattern, &env),
                "pattern {pattern:#b}"
            );
        }
    }

    #[test]
    fn test_decode_matches_softposit_16_1() {
        let env = environment(16, 1);
        for pattern in 0..=u16::MAX {
            let reference = f64::from(P16::from_bits(pattern));
            let mine = value_of(u64::from(pattern), &env);
            if reference.is_nan() {
                assert!(mine.is_nan(), "pattern {pattern:#018b}");
            } else {
                assert_eq!(mine, reference, "pattern {pattern:#018b}");
            }
        }
    }

    #[test]
    fn test_decode_matches_softposit_32_2() {
        let env = environment(32, 2);
        let bit_patterns = [
            0x0000_0001u32, // minpos
            0x0000_0002,    // exponent cut to one bit
            0x0000_0003,
            0x0800_0000,
            0x2800_0000,
            0x4000_0000, // 1.0
            0x4000_0001,
            0x6000_0000,
            0x780E_324A,
            0x7FFF_FFFB,
            0x7FFF_FFFD, // exponent cut to one bit
            0x7FFF_FFFE,
            0x7FFF_FFFF, // maxpos
            0x8000_0001,
            0xC000_0000,
            0xFFFF_FFFF,
        ];
        for pattern in bit_patterns {
            let reference = f64::from(P32::from_bits(pattern));
            assert_eq!(
                value_of(u64::from(pattern), &env),
                reference,
                "pattern {pattern:#034b}"
            );
        }
    }
}
