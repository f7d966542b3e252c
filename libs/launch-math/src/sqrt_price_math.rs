use crate::full_math::{div_rounding_up, mul_div, mul_div_rounding_up};
use launch_types::Q96;
use soroban_sdk::{Env, U256};

/// Token0 held by `liquidity` between two sqrt prices.
/// delta_x = L * (sqrt_b - sqrt_a) / (sqrt_a * sqrt_b)
pub fn get_amount0_delta(
    env: &Env,
    sqrt_ratio_a_x96: u128,
    sqrt_ratio_b_x96: u128,
    liquidity: u128,
    round_up: bool,
) -> u128 {
    let (sqrt_lower, sqrt_upper) = if sqrt_ratio_a_x96 > sqrt_ratio_b_x96 {
        (sqrt_ratio_b_x96, sqrt_ratio_a_x96)
    } else {
        (sqrt_ratio_a_x96, sqrt_ratio_b_x96)
    };
    if sqrt_lower == 0 {
        panic!("sqrt_ratio_lower cannot be zero");
    }

    let diff = sqrt_upper - sqrt_lower;

    // L << 96 overflows u128 for large liquidity, so widen first
    if liquidity <= u128::MAX >> 96 {
        let numerator = liquidity << 96;
        if round_up {
            div_rounding_up(
                mul_div_rounding_up(env, numerator, diff, sqrt_upper),
                sqrt_lower,
            )
        } else {
            mul_div(env, numerator, diff, sqrt_upper) / sqrt_lower
        }
    } else {
        let numerator = U256::from_u128(env, liquidity)
            .mul(&U256::from_u128(env, Q96))
            .mul(&U256::from_u128(env, diff));
        let denominator =
            U256::from_u128(env, sqrt_upper).mul(&U256::from_u128(env, sqrt_lower));
        let quotient = numerator.div(&denominator);
        let remainder = numerator.rem_euclid(&denominator);
        let mut result = quotient.to_u128().expect("amount0 overflow");
        if round_up && remainder > U256::from_u32(env, 0) {
            result += 1;
        }
        result
    }
}

/// Token1 held by `liquidity` between two sqrt prices.
/// delta_y = L * (sqrt_b - sqrt_a)
pub fn get_amount1_delta(
    env: &Env,
    sqrt_ratio_a_x96: u128,
    sqrt_ratio_b_x96: u128,
    liquidity: u128,
    round_up: bool,
) -> u128 {
    let (sqrt_lower, sqrt_upper) = if sqrt_ratio_a_x96 > sqrt_ratio_b_x96 {
        (sqrt_ratio_b_x96, sqrt_ratio_a_x96)
    } else {
        (sqrt_ratio_a_x96, sqrt_ratio_b_x96)
    };

    if round_up {
        mul_div_rounding_up(env, liquidity, sqrt_upper - sqrt_lower, Q96)
    } else {
        mul_div(env, liquidity, sqrt_upper - sqrt_lower, Q96)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use launch_types::{MAX_SQRT_RATIO, MIN_SQRT_RATIO};
    use soroban_sdk::Env;

    #[test]
    fn test_amount0_delta_order_independent() {
        let env = Env::default();
        let sqrt_a = Q96;
        let sqrt_b = Q96 * 11 / 10;
        let liquidity = 1_000_000_000_000u128;

        assert_eq!(
            get_amount0_delta(&env, sqrt_a, sqrt_b, liquidity, false),
            get_amount0_delta(&env, sqrt_b, sqrt_a, liquidity, false)
        );
    }

    #[test]
    fn test_amount0_delta_known_value() {
        let env = Env::default();
        // L * (2 - 1) / (1 * 2) = L / 2
        let amount = get_amount0_delta(&env, Q96, Q96 * 2, 1_000_000, false);
        assert_eq!(amount, 500_000);
    }

    #[test]
    fn test_amount1_delta_known_value() {
        let env = Env::default();
        // L * (2 - 1) = L
        let amount = get_amount1_delta(&env, Q96, Q96 * 2, 1_000_000, false);
        assert_eq!(amount, 1_000_000);
    }

    #[test]
    fn test_zero_width_is_zero() {
        let env = Env::default();
        assert_eq!(get_amount0_delta(&env, Q96, Q96, 1_000_000, true), 0);
        assert_eq!(get_amount1_delta(&env, Q96, Q96, 1_000_000, true), 0);
    }

    #[test]
    fn test_round_up_adds_at_most_one() {
        let env = Env::default();
        let sqrt_a = Q96 * 9 / 10;
        let sqrt_b = Q96 * 11 / 10;
        let liquidity = 999_999_937u128;

        let down0 = get_amount0_delta(&env, sqrt_a, sqrt_b, liquidity, false);
        let up0 = get_amount0_delta(&env, sqrt_a, sqrt_b, liquidity, true);
        assert!(up0 - down0 <= 1);

        let down1 = get_amount1_delta(&env, sqrt_a, sqrt_b, liquidity, false);
        let up1 = get_amount1_delta(&env, sqrt_a, sqrt_b, liquidity, true);
        assert!(up1 - down1 <= 1);
    }

    #[test]
    fn test_amount0_delta_large_liquidity() {
        let env = Env::default();
        // Liquidity above 2^32 forces the wide path
        let liquidity = 1u128 << 40;
        let small = get_amount0_delta(&env, Q96, Q96 * 2, 1u128 << 20, false);
        let large = get_amount0_delta(&env, Q96, Q96 * 2, liquidity, false);
        assert_eq!(large, small << 20);
    }

    #[test]
    fn test_full_range_amounts() {
        let env = Env::default();
        let amount1 = get_amount1_delta(&env, MIN_SQRT_RATIO, MAX_SQRT_RATIO, 1_000, true);
        assert!(amount1 > 0);
    }
}
