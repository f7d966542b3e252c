// ============================================================================
// ACCUMULATOR SPECIFICATIONS
// ============================================================================
//
// KEY INVARIANTS:
// 1. The per-tick accumulator never decreases
// 2. Nothing accrues while a tick is out of range or empty
// 3. Reconciling twice at the same time is a no-op
//
// ============================================================================

#[cfg(feature = "certora")]
use cvlr_soroban_derive::rule;

#[cfg(feature = "certora")]
use soroban_sdk::Env;

#[cfg(feature = "certora")]
use cvlr::asserts::{cvlr_assert, cvlr_assume, cvlr_satisfy};

/// RULE: reconcile never lowers the accumulator
#[cfg(feature = "certora")]
#[rule]
pub fn accumulator_monotonic(env: Env, liquidity: u128, in_range: bool, last_update: u64, now: u64) {
    use crate::accumulator::reconcile;
    use launch_types::TickTimeState;

    let mut tick = TickTimeState::new(&env, last_update);
    tick.liquidity = liquidity;
    tick.in_range = in_range;
    reconcile(&env, &mut tick, last_update.saturating_add(1));
    let before = tick.accumulated_seconds_x128.clone();

    reconcile(&env, &mut tick, now);
    cvlr_assert!(tick.accumulated_seconds_x128 >= before);
}

/// RULE: out-of-range ticks are frozen
#[cfg(feature = "certora")]
#[rule]
pub fn out_of_range_does_not_accrue(env: Env, liquidity: u128, last_update: u64, now: u64) {
    use crate::accumulator::reconcile;
    use launch_types::TickTimeState;
    use soroban_sdk::U256;

    let mut tick = TickTimeState::new(&env, last_update);
    tick.liquidity = liquidity;
    tick.in_range = false;

    reconcile(&env, &mut tick, now);
    cvlr_assert!(tick.accumulated_seconds_x128 == U256::from_u32(&env, 0));
}

/// RULE: elapsed time can reach the accumulator at all
#[cfg(feature = "certora")]
#[rule]
pub fn accumulator_can_grow(env: Env, liquidity: u128, elapsed: u64) {
    use crate::accumulator::reconcile;
    use launch_types::TickTimeState;
    use soroban_sdk::U256;

    cvlr_assume!(liquidity > 0);
    cvlr_assume!(elapsed > 0);

    let mut tick = TickTimeState::new(&env, 0);
    tick.liquidity = liquidity;
    tick.in_range = true;
    reconcile(&env, &mut tick, elapsed);
    cvlr_satisfy!(tick.accumulated_seconds_x128 > U256::from_u32(&env, 0));
}

// ============================================================================
// TESTS (run with cargo test)
// ============================================================================
