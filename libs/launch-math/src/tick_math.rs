use crate::full_math::q128;
use launch_types::{MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK};
use soroban_sdk::{Env, U256};

/// sqrt(1.0001^-(2^i)) in Q128, indexed by bit i of |tick|
const SQRT_RATIO_FACTORS: [u128; 19] = [
    0xfffcb933bd6fad37aa2d162d1a594001,
    0xfff97272373d413259a46990580e213a,
    0xfff2e50f5f656932ef12357cf3c7fdcc,
    0xffe5caca7e10e4e61c3624eaa0941cd0,
    0xffcb9843d60f6159c9db58835c926644,
    0xff973b41fa98c081472e6896dfb254c0,
    0xff2ea16466c96a3843ec78b326b52861,
    0xfe5dee046a99a2a811c461f1969c3053,
    0xfcbe86c7900a88aedcffc83b479aa3a4,
    0xf987a7253ac413176f2b074cf7815e54,
    0xf3392b0822b70005940c7a398e4b70f3,
    0xe7159475a2c29b7443b29c7fa6e889d9,
    0xd097f3bdfd2022b8845ad8f792aa5825,
    0xa9f746462d870fdf8a65dc1f90e061e5,
    0x70d869a156d2a1b890bb3df62baf32f7,
    0x31be135f97d08fd981231505542fcfa6,
    0x9aa508b5b7a84e1c677de54f3e99bc9,
    0x5d6af8dedb81196699c329225ee604,
    0x2216e584f5fa1ea926041bedfe98,
];

/// sqrt(1.0001^tick) as Q64.96
pub fn get_sqrt_ratio_at_tick(env: &Env, tick: i32) -> u128 {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        panic!("Tick out of bounds");
    }

    let abs_tick = tick.unsigned_abs();
    let one = q128(env);
    let mut ratio = one.clone();

    for (bit, factor) in SQRT_RATIO_FACTORS.iter().enumerate() {
        if abs_tick & (1u32 << bit) != 0 {
            ratio = ratio.mul(&U256::from_u128(env, *factor)).div(&one);
        }
    }

    // Factors describe negative ticks; invert for positive ones
    if tick > 0 {
        ratio = u256_max(env).div(&ratio);
    }

    // Q128 -> Q96
    let result = ratio.div(&U256::from_u128(env, 1u128 << 32));
    result
        .to_u128()
        .unwrap_or(u128::MAX)
        .clamp(MIN_SQRT_RATIO, MAX_SQRT_RATIO)
}

/// Greatest tick whose sqrt ratio is <= sqrt_price_x96
pub fn get_tick_at_sqrt_ratio(env: &Env, sqrt_price_x96: u128) -> i32 {
    if !(MIN_SQRT_RATIO..MAX_SQRT_RATIO).contains(&sqrt_price_x96) {
        panic!("sqrt price out of bounds");
    }

    let mut low = MIN_TICK;
    let mut high = MAX_TICK;
    while low < high {
        let mid = low + (high - low + 1) / 2;
        if get_sqrt_ratio_at_tick(env, mid) <= sqrt_price_x96 {
            low = mid;
        } else {
            high = mid - 1;
        }
    }
    low
}

/// True when `tick` is a multiple of `tick_spacing`
pub fn is_aligned(tick: i32, tick_spacing: i32) -> bool {
    tick % tick_spacing == 0
}

/// Round toward negative infinity onto the spacing grid
pub fn align_tick_down(tick: i32, tick_spacing: i32) -> i32 {
    tick.div_euclid(tick_spacing) * tick_spacing
}

/// Round toward positive infinity onto the spacing grid
pub fn align_tick_up(tick: i32, tick_spacing: i32) -> i32 {
    let down = align_tick_down(tick, tick_spacing);
    if down == tick {
        down
    } else {
        down + tick_spacing
    }
}

fn u256_max(env: &Env) -> U256 {
    let max = U256::from_u128(env, u128::MAX);
    max.mul(&q128(env)).add(&max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use launch_types::Q96;
    use soroban_sdk::Env;

    fn abs_diff(a: u128, b: u128) -> u128 {
        if a > b {
            a - b
        } else {
            b - a
        }
    }

    #[test]
    fn test_sqrt_ratio_at_zero_is_q96() {
        let env = Env::default();
        let sqrt_price = get_sqrt_ratio_at_tick(&env, 0);
        assert!(abs_diff(sqrt_price, Q96) < Q96 / 1000);
    }

    #[test]
    fn test_sqrt_ratio_monotonic() {
        let env = Env::default();
        let mut prev = get_sqrt_ratio_at_tick(&env, -20_000);
        for tick in (-19_900..=20_000).step_by(100) {
            let sqrt = get_sqrt_ratio_at_tick(&env, tick);
            assert!(sqrt > prev);
            prev = sqrt;
        }
    }

    #[test]
    fn test_sqrt_ratio_doubles_price_near_6931() {
        let env = Env::default();
        // 1.0001^6931 ~ 2, so the sqrt ratio is ~1.414
        let sqrt = get_sqrt_ratio_at_tick(&env, 6931);
        let expected = Q96 * 1414 / 1000;
        assert!(abs_diff(sqrt, expected) < expected / 100);
    }

    #[test]
    fn test_sqrt_ratio_bounds() {
        let env = Env::default();
        assert!(get_sqrt_ratio_at_tick(&env, MIN_TICK) >= MIN_SQRT_RATIO);
        assert!(get_sqrt_ratio_at_tick(&env, MAX_TICK) <= MAX_SQRT_RATIO);
    }

    #[test]
    #[should_panic(expected = "Tick out of bounds")]
    fn test_sqrt_ratio_above_max_tick() {
        let env = Env::default();
        get_sqrt_ratio_at_tick(&env, MAX_TICK + 1);
    }

    #[test]
    fn test_tick_at_sqrt_ratio_roundtrip() {
        let env = Env::default();
        for tick in [-200_000, -10_000, -60, 0, 60, 10_000, 200_000] {
            let sqrt = get_sqrt_ratio_at_tick(&env, tick);
            let recovered = get_tick_at_sqrt_ratio(&env, sqrt);
            assert!((recovered - tick).abs() <= 1, "tick {} -> {}", tick, recovered);
        }
        assert_eq!(get_tick_at_sqrt_ratio(&env, MIN_SQRT_RATIO), MIN_TICK);
    }

    #[test]
    #[should_panic(expected = "sqrt price out of bounds")]
    fn test_tick_at_sqrt_ratio_at_max() {
        let env = Env::default();
        get_tick_at_sqrt_ratio(&env, MAX_SQRT_RATIO);
    }

    #[test]
    fn test_alignment_helpers() {
        assert!(is_aligned(120, 60));
        assert!(is_aligned(-120, 60));
        assert!(!is_aligned(-61, 60));

        assert_eq!(align_tick_down(61, 60), 60);
        assert_eq!(align_tick_down(-61, 60), -120);
        assert_eq!(align_tick_down(-60, 60), -60);
        assert_eq!(align_tick_up(61, 60), 120);
        assert_eq!(align_tick_up(-61, 60), -60);
        assert_eq!(align_tick_up(120, 60), 120);
    }
}
