//! Read-only views. Nothing here writes storage; accumulators are
//! reconciled in memory only.

use crate::accumulator::{pending, reconcile};
use crate::clearing::is_in_range;
use crate::phase::reconcile_time;
use crate::storage::get_tick_time;
use launch_types::{AuctionPosition, AuctionState, TickTimeState};
use soroban_sdk::Env;

/// Tick state as it would read after reconciling now
pub fn tick_snapshot(env: &Env, state: &AuctionState, tick: i32, now: u64) -> Option<TickTimeState> {
    let mut snapshot = get_tick_time(env, tick)?;
    reconcile(env, &mut snapshot, reconcile_time(state, now));
    Some(snapshot)
}

pub fn position_in_range(state: &AuctionState, position: &AuctionPosition) -> bool {
    is_in_range(
        position.tick_lower,
        state.current_clearing_tick(),
        state.is_token0,
    )
}

/// Seconds the position could harvest at `now`
pub fn pending_reward(env: &Env, state: &AuctionState, position: &AuctionPosition, now: u64) -> u128 {
    match tick_snapshot(env, state, position.tick_lower, now) {
        Some(tick) => pending(env, position, &tick.accumulated_seconds_x128),
        None => position.earned_seconds,
    }
}
