use soroban_sdk::{Env, U256};

/// 2^128 as U256
pub fn q128(env: &Env) -> U256 {
    U256::from_u128(env, 1u128 << 64).mul(&U256::from_u128(env, 1u128 << 64))
}

/// (a * b) / denominator with a 256-bit intermediate, rounded down
pub fn mul_div(env: &Env, a: u128, b: u128, denominator: u128) -> u128 {
    if denominator == 0 {
        panic!("Division by zero");
    }

    let product = U256::from_u128(env, a).mul(&U256::from_u128(env, b));
    narrow(env, &product.div(&U256::from_u128(env, denominator)))
}

/// ceil((a * b) / denominator) with a 256-bit intermediate
pub fn mul_div_rounding_up(env: &Env, a: u128, b: u128, denominator: u128) -> u128 {
    let result = mul_div(env, a, b, denominator);

    let product = U256::from_u128(env, a).mul(&U256::from_u128(env, b));
    let remainder = product.rem_euclid(&U256::from_u128(env, denominator));

    if remainder > U256::from_u32(env, 0) {
        result.checked_add(1).expect("mul_div overflow")
    } else {
        result
    }
}

/// Unsigned division rounding up
pub fn div_rounding_up(a: u128, b: u128) -> u128 {
    if b == 0 {
        panic!("Division by zero");
    }
    if a == 0 {
        return 0;
    }
    (a - 1) / b + 1
}

/// Seconds per unit of liquidity as Q128.128: (elapsed << 128) / liquidity.
/// Zero liquidity yields zero so empty ticks never accumulate.
pub fn seconds_per_liquidity_x128(env: &Env, elapsed: u64, liquidity: u128) -> U256 {
    if liquidity == 0 || elapsed == 0 {
        return U256::from_u32(env, 0);
    }
    U256::from_u128(env, elapsed as u128)
        .mul(&q128(env))
        .div(&U256::from_u128(env, liquidity))
}

/// (delta_x128 * liquidity) >> 128, rounded down
pub fn mul_shift_128(env: &Env, delta_x128: &U256, liquidity: u128) -> u128 {
    let product = delta_x128.mul(&U256::from_u128(env, liquidity));
    narrow(env, &product.div(&q128(env)))
}

/// Narrow a U256 to u128, panicking when it does not fit
fn narrow(env: &Env, value: &U256) -> u128 {
    if *value > U256::from_u128(env, u128::MAX) {
        panic!("U256 overflow when converting to u128");
    }
    value.to_u128().unwrap_or(u128::MAX)
}
