//! Per-tick time-in-range accumulator.
//!
//! Each bid tick accumulates seconds-in-range per unit of liquidity as a
//! Q128.128 value. A position earns the accumulator growth times its
//! liquidity, so bidders sharing a tick split its time pro rata and a sole
//! bidder earns every second the tick spent in range. The accumulator only
//! grows while the tick is in range and holds liquidity; reconciliation is
//! lazy and happens on every touch.

use launch_math::{mul_shift_128, seconds_per_liquidity_x128};
use launch_types::{AuctionPosition, TickTimeState};
use soroban_sdk::{Env, U256};

/// Bring the accumulator up to `now`. Times before the last update add nothing.
pub fn reconcile(env: &Env, tick: &mut TickTimeState, now: u64) {
    if now <= tick.last_update {
        return;
    }
    if tick.in_range && tick.liquidity > 0 {
        let growth = seconds_per_liquidity_x128(env, now - tick.last_update, tick.liquidity);
        tick.accumulated_seconds_x128 = tick.accumulated_seconds_x128.add(&growth);
    }
    tick.last_update = now;
}

/// Reconcile, then change the in-range flag so time on either side of the
/// flip is attributed correctly
pub fn set_in_range(env: &Env, tick: &mut TickTimeState, in_range: bool, now: u64) {
    reconcile(env, tick, now);
    tick.in_range = in_range;
}

/// Share-weighted seconds earned by `position` since its checkpoint, plus
/// anything already crystallised
pub fn pending(env: &Env, position: &AuctionPosition, accumulated_x128: &U256) -> u128 {
    let growth = if *accumulated_x128 > position.reward_debt_x128 {
        accumulated_x128.sub(&position.reward_debt_x128)
    } else {
        U256::from_u32(env, 0)
    };
    position
        .earned_seconds
        .saturating_add(mul_shift_128(env, &growth, position.liquidity))
}
