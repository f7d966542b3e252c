use crate::full_math::mul_div;
use crate::sqrt_price_math::{get_amount0_delta, get_amount1_delta};
use launch_types::Q96;
use soroban_sdk::Env;

fn ordered(a: u128, b: u128) -> (u128, u128) {
    if a > b {
        (b, a)
    } else {
        (a, b)
    }
}

/// Liquidity supplied by `amount0` of token0 over [sqrt_a, sqrt_b], rounded down.
/// L = amount0 * sqrt_a * sqrt_b / (sqrt_b - sqrt_a)
pub fn get_liquidity_for_amount0(
    env: &Env,
    sqrt_ratio_a_x96: u128,
    sqrt_ratio_b_x96: u128,
    amount0: u128,
) -> u128 {
    let (lower, upper) = ordered(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    if lower == upper {
        return 0;
    }
    let intermediate = mul_div(env, lower, upper, Q96);
    mul_div(env, amount0, intermediate, upper - lower)
}

/// Liquidity supplied by `amount1` of token1 over [sqrt_a, sqrt_b], rounded down.
/// L = amount1 / (sqrt_b - sqrt_a)
pub fn get_liquidity_for_amount1(
    env: &Env,
    sqrt_ratio_a_x96: u128,
    sqrt_ratio_b_x96: u128,
    amount1: u128,
) -> u128 {
    let (lower, upper) = ordered(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    if lower == upper {
        return 0;
    }
    mul_div(env, amount1, Q96, upper - lower)
}

/// Liquidity for the given amounts at the current price
pub fn get_liquidity_for_amounts(
    env: &Env,
    sqrt_ratio_x96: u128,
    sqrt_ratio_a_x96: u128,
    sqrt_ratio_b_x96: u128,
    amount0: u128,
    amount1: u128,
) -> u128 {
    let (lower, upper) = ordered(sqrt_ratio_a_x96, sqrt_ratio_b_x96);

    if sqrt_ratio_x96 <= lower {
        get_liquidity_for_amount0(env, lower, upper, amount0)
    } else if sqrt_ratio_x96 < upper {
        let liquidity0 = get_liquidity_for_amount0(env, sqrt_ratio_x96, upper, amount0);
        let liquidity1 = get_liquidity_for_amount1(env, lower, sqrt_ratio_x96, amount1);
        liquidity0.min(liquidity1)
    } else {
        get_liquidity_for_amount1(env, lower, upper, amount1)
    }
}

/// Token amounts represented by `liquidity` over [sqrt_a, sqrt_b] at the
/// current price. Rounds up when adding liquidity, down when removing.
pub fn get_amounts_for_liquidity(
    env: &Env,
    sqrt_ratio_x96: u128,
    sqrt_ratio_a_x96: u128,
    sqrt_ratio_b_x96: u128,
    liquidity: u128,
    round_up: bool,
) -> (u128, u128) {
    let (lower, upper) = ordered(sqrt_ratio_a_x96, sqrt_ratio_b_x96);

    if sqrt_ratio_x96 <= lower {
        (get_amount0_delta(env, lower, upper, liquidity, round_up), 0)
    } else if sqrt_ratio_x96 < upper {
        (
            get_amount0_delta(env, sqrt_ratio_x96, upper, liquidity, round_up),
            get_amount1_delta(env, lower, sqrt_ratio_x96, liquidity, round_up),
        )
    } else {
        (0, get_amount1_delta(env, lower, upper, liquidity, round_up))
    }
}

/// Apply a signed delta to unsigned liquidity
pub fn add_delta(liquidity: u128, delta: i128) -> u128 {
    if delta < 0 {
        liquidity
            .checked_sub(delta.unsigned_abs())
            .expect("Liquidity underflow")
    } else {
        liquidity
            .checked_add(delta as u128)
            .expect("Liquidity overflow")
    }
}
