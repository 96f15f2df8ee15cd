use std::sync::Arc;

use num_bigint::BigUint;

use super::{core::ExactValue, environment::PositEnvironment, value::Posit};

/// Nearest posit to a real number; NaN and the infinities map to the reserved pattern.
pub fn to_posit(environment: &Arc<PositEnvironment>, value: f64) -> Posit {
    Posit::from_exact(environment, &exact_from_f64(value))
}

/// Best-effort real value of a posit; the reserved pattern reads as NaN.
pub fn to_real(posit: &Posit) -> f64 {
    exact_to_f64(&posit.to_exact())
}

/// Every finite `f64` is a dyadic rational, so this is exact.
pub fn exact_from_f64(value: f64) -> ExactValue {
    if value == 0.0 {
        return ExactValue::Zero;
    }
    if !value.is_finite() {
        return ExactValue::Infinite;
    }

    let bits = value.to_bits();
    let negative = bits >> 63 == 1;
    let biased_exponent = ((bits >> 52) & 0x7FF) as i64;
    let fraction = bits & ((1 << 52) - 1);

    let (mantissa, scale) = if biased_exponent == 0 {
        // subnormal
        (fraction, -1074)
    } else {
        (fraction | (1 << 52), biased_exponent - 1075)
    };
    ExactValue::finite(negative, scale, BigUint::from(mantissa))
}

pub fn exact_to_f64(value: &ExactValue) -> f64 {
    let value = match value {
        ExactValue::Zero => return 0.0,
        ExactValue::Infinite => return f64::NAN,
        ExactValue::Finite(value) => value,
    };

    // Keep the top 64 bits and fold everything below into a sticky bit, so the final u64 -> f64
    // conversion rounds the same way the full mantissa would.
    let bits = value.mantissa.bits();
    let (top, shift) = if bits > 64 {
        let shift = bits - 64;
        let sticky = value
            .mantissa
            .trailing_zeros()
            .is_some_and(|zeros| zeros < shift);
        let top = (&value.mantissa >> shift).iter_u64_digits().next().unwrap_or(0);
        (top | u64::from(sticky), shift as i64)
    } else {
        (value.mantissa.iter_u64_digits().next().unwrap_or(0), 0)
    };

    let magnitude = scale_by_power_of_two(top as f64, value.scale + shift);
    if value.negative { -magnitude } else { magnitude }
}

fn scale_by_power_of_two(mut value: f64, mut exponent: i64) -> f64 {
    const STEP: i64 = 1000;
    while exponent > STEP && value.is_finite() {
        value *= 2f64.powi(STEP as i32);
        exponent -= STEP;
    }
    while exponent < -STEP && value != 0.0 {
        value *= 2f64.powi(-STEP as i32);
        exponent += STEP;
    }
    value * 2f64.powi(exponent.clamp(-STEP, STEP) as i32)
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};
    use rand_distr::{Distribution, StandardNormal};
    use softposit::{P16, P32};

    use super::*;

    fn environment(size: usize, es: u32) -> Arc<PositEnvironment> {
        Arc::new(PositEnvironment::new(size, es).unwrap())
    }

    #[test]
    fn test_exact_from_f64() {
        assert_eq!(exact_from_f64(0.0), ExactValue::Zero);
        assert_eq!(exact_from_f64(-0.0), ExactValue::Zero);
        assert_eq!(exact_from_f64(f64::NAN), ExactValue::Infinite);
        assert_eq!(exact_from_f64(f64::NEG_INFINITY), ExactValue::Infinite);
        for value in [1.0, -1.5, 0.1, 3.0e300, -4323.143, f64::MIN_POSITIVE / 8.0] {
            assert_eq!(exact_to_f64(&exact_from_f64(value)), value);
        }
    }

    #[test]
    fn test_exact_to_f64_wide_mantissa() {
        // (2^70 + 1) * 2^-70 rounds to 1.0; (2^70 + 2^17 + 1) * 2^-70 is above the tie.
        let mantissa = (BigUint::from(1u8) << 70usize) + BigUint::from(1u8);
        assert_eq!(exact_to_f64(&ExactValue::finite(false, -70, mantissa)), 1.0);

        let tie = BigUint::from(1u8) << 17usize;
        let mantissa = (BigUint::from(1u8) << 70usize) + tie + BigUint::from(1u8);
        assert_eq!(
            exact_to_f64(&ExactValue::finite(true, -70, mantissa)),
            -(1.0 + f64::EPSILON)
        );
    }

    fn validate_f32_to_posit_32_2(value: f32) {
        let env = environment(32, 2);
        let mine = to_posit(&env, f64::from(value));
        let reference = P32::from_f32(value);
        assert_eq!(
            mine.bits().to_u64(),
            u64::from(reference.to_bits()),
            "f32 -> posit conversion mismatch for {value}"
        );
    }

    #[test]
    fn test_f32_to_posit_32_2() {
        let test_cases = [
            0.0,
            -0.0,
            f32::NAN,
            f32::INFINITY,
            f32::NEG_INFINITY,
            1.0,
            2.0,
            4.0,
            0.5,
            0.25,
            0.125,
            -1.0,
            -2.0,
            -0.5,
            1.5,
            3.14159,
            -2.71828,
            4323.143,
            1.0e10,
            -1.0e10,
            1.0e-10,
            -1.0e-10,
            f32::from_bits(0x00400001),
            2.6815616e36,
            -2.6815616e36,
            3.7252903e-37,
            -3.7252903e-37,
        ];
        for value in test_cases {
            validate_f32_to_posit_32_2(value);
        }
    }

    #[test]
    fn test_f32_to_posit_16_1() {
        let env = environment(16, 1);
        let test_cases = [
            1.0, -1.0, 0.5, 1.5, 3.14159, -2.71828, 123.456, 1.0e3, -1.0e-4, 16384.0, 6.1035156e-5,
            1.0e9, 1.0e-9,
        ];
        for value in test_cases {
            let mine = to_posit(&env, f64::from(value));
            assert_eq!(
                mine.bits().to_u64(),
                u64::from(P16::from_f32(value).to_bits()),
                "f32 -> posit<16, 1> conversion mismatch for {value}"
            );
        }
    }

    #[test]
    fn test_to_real_round_trips_through_posit() {
        let env = environment(32, 2);
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..1000 {
            let sample: f64 = StandardNormal.sample(&mut rng);
            let value = sample as f32;
            let posit = to_posit(&env, f64::from(value));
            let reference = P32::from_f32(value);
            assert_eq!(to_real(&posit), f64::from(reference), "value {value}");
        }
    }

    #[test]
    fn test_to_real_specials() {
        let env = environment(8, 2);
        assert_eq!(to_real(&Posit::zero(&env)), 0.0);
        assert!(to_real(&Posit::infinite(&env)).is_nan());
        assert_eq!(to_real(&Posit::one(&env)), 1.0);
    }
}
