use crate::error::AuctionError;
use launch_types::{AuctionPhase, AuctionState};
use soroban_sdk::{Env, Symbol};

/// Phase after applying the lazy Active -> Closed transition at `now`
pub fn effective_phase(state: &AuctionState, now: u64) -> AuctionPhase {
    match state.phase {
        AuctionPhase::Active if now >= state.end_time => AuctionPhase::Closed,
        phase => phase,
    }
}

/// Move to `next`, rejecting anything but a single step forward
pub fn transition(env: &Env, state: &mut AuctionState, next: AuctionPhase) -> Result<(), AuctionError> {
    if !state.phase.can_transition_to(next) {
        return Err(match state.phase {
            AuctionPhase::Active => AuctionError::AuctionNotClosed,
            AuctionPhase::Closed => AuctionError::AuctionNotActive,
            AuctionPhase::Settled => AuctionError::ClearingTickAlreadySet,
        });
    }
    let previous = state.phase;
    state.phase = next;
    env.events().publish(
        (Symbol::new(env, "phase_changed"),),
        (previous as u32, next as u32),
    );
    Ok(())
}

/// Persist the lazy close once the end time has passed
pub fn sync(env: &Env, state: &mut AuctionState, now: u64) -> Result<(), AuctionError> {
    if effective_phase(state, now) != state.phase {
        transition(env, state, AuctionPhase::Closed)?;
    }
    Ok(())
}

/// Latest time the accumulators may be reconciled to
pub fn reconcile_time(state: &AuctionState, now: u64) -> u64 {
    match effective_phase(state, now) {
        AuctionPhase::Active => now,
        AuctionPhase::Closed => now.min(state.end_time),
        AuctionPhase::Settled => state.end_time,
    }
}
