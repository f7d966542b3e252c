#![no_std]

mod auction;
mod curve;
mod pool;
mod position;
mod tick;

pub use auction::*;
pub use curve::*;
pub use pool::*;
pub use position::*;
pub use tick::*;

/// Q96 constant (2^96) for fixed-point math
pub const Q96: u128 = 1 << 96;

/// Unit used for curve and beneficiary shares (1e18 = 100%)
pub const WAD: i128 = 1_000_000_000_000_000_000;

/// Minimum tick index
/// Limited by u128 representation (originally -887272 for uint160)
pub const MIN_TICK: i32 = -443636;

/// Maximum tick index
/// Limited by u128 representation (originally 887272 for uint160)
pub const MAX_TICK: i32 = 443636;

/// Minimum sqrt price (at MIN_TICK)
/// sqrt(1.0001^-443636) * 2^96
pub const MIN_SQRT_RATIO: u128 = 18446743374134;

/// Maximum sqrt price (at MAX_TICK)
/// sqrt(1.0001^443636) * 2^96, bounded by u128::MAX
pub const MAX_SQRT_RATIO: u128 = 340275971719517849884101479065584693834;

/// Largest tick spacing a pool may use
pub const MAX_TICK_SPACING: i32 = 16384;

/// Lowest tick usable with the given spacing
pub fn min_usable_tick(tick_spacing: i32) -> i32 {
    (MIN_TICK / tick_spacing) * tick_spacing
}

/// Highest tick usable with the given spacing
pub fn max_usable_tick(tick_spacing: i32) -> i32 {
    (MAX_TICK / tick_spacing) * tick_spacing
}

/// Order two currencies into (currency0, currency1)
pub fn sort_currencies(
    a: soroban_sdk::Address,
    b: soroban_sdk::Address,
) -> (soroban_sdk::Address, soroban_sdk::Address) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usable_ticks_are_aligned() {
        for spacing in [1, 10, 60, 200, MAX_TICK_SPACING] {
            let min = min_usable_tick(spacing);
            let max = max_usable_tick(spacing);
            assert_eq!(min % spacing, 0);
            assert_eq!(max % spacing, 0);
            assert!(min >= MIN_TICK);
            assert!(max <= MAX_TICK);
            assert_eq!(min, -max);
        }
    }

    #[test]
    fn test_sort_currencies() {
        use soroban_sdk::testutils::Address as _;
        let env = soroban_sdk::Env::default();
        let a = soroban_sdk::Address::generate(&env);
        let b = soroban_sdk::Address::generate(&env);

        let (c0, c1) = sort_currencies(a.clone(), b.clone());
        assert!(c0 < c1);
        assert_eq!(sort_currencies(b, a), (c0, c1));
    }
}
