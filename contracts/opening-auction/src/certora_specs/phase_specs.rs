// ============================================================================
// PHASE SPECIFICATIONS
// ============================================================================
//
// KEY INVARIANTS:
// 1. Phases only move forward, one step at a time
// 2. The clearing tick is fixed exactly once, on settlement
// 3. Accumulators are never reconciled past the end time once closed
//
// ============================================================================

#[cfg(feature = "certora")]
use cvlr_soroban_derive::rule;

#[cfg(feature = "certora")]
use cvlr::asserts::{cvlr_assert, cvlr_assume};

/// RULE: a phase never transitions to an earlier or equal phase
#[cfg(feature = "certora")]
#[rule]
pub fn phase_never_regresses(from: u32, to: u32) {
    use launch_types::AuctionPhase;

    cvlr_assume!(from <= 2 && to <= 2);
    let phase = |code: u32| match code {
        0 => AuctionPhase::Active,
        1 => AuctionPhase::Closed,
        _ => AuctionPhase::Settled,
    };

    if phase(from).can_transition_to(phase(to)) {
        cvlr_assert!(to == from + 1);
    }
}

/// RULE: lazy close never reopens a settled auction
#[cfg(feature = "certora")]
#[rule]
pub fn effective_phase_is_not_behind(end_time: u64, now: u64) {
    use crate::phase::effective_phase;
    use launch_types::{AuctionPhase, AuctionState};

    let state = AuctionState {
        phase: AuctionPhase::Settled,
        is_token0: true,
        start_time: 0,
        end_time,
        estimated_clearing_tick: 0,
        clearing_tick: Some(0),
        total_liquidity: 0,
        bid_ticks: 0,
    };
    cvlr_assert!(effective_phase(&state, now) == AuctionPhase::Settled);
}

/// RULE: reconcile time never exceeds the end time after close
#[cfg(feature = "certora")]
#[rule]
pub fn reconcile_time_capped(end_time: u64, now: u64, settled: bool) {
    use crate::phase::reconcile_time;
    use launch_types::{AuctionPhase, AuctionState};

    let state = AuctionState {
        phase: if settled {
            AuctionPhase::Settled
        } else {
            AuctionPhase::Closed
        },
        is_token0: true,
        start_time: 0,
        end_time,
        estimated_clearing_tick: 0,
        clearing_tick: None,
        total_liquidity: 0,
        bid_ticks: 0,
    };
    cvlr_assert!(reconcile_time(&state, now) <= end_time);
}

// ============================================================================
// TESTS (run with cargo test)
// ============================================================================

#[cfg(test)]
mod tests {
    use launch_types::AuctionPhase;

    const PHASES: [AuctionPhase; 3] = [
        AuctionPhase::Active,
        AuctionPhase::Closed,
        AuctionPhase::Settled,
    ];

    #[test]
    fn test_only_single_forward_steps() {
        for from in PHASES {
            for to in PHASES {
                let allowed = from.can_transition_to(to);
                assert_eq!(allowed, to as u32 == from as u32 + 1);
            }
        }
    }

    #[test]
    fn test_bids_only_while_active() {
        assert!(AuctionPhase::Active.accepts_bids());
        assert!(!AuctionPhase::Closed.accepts_bids());
        assert!(!AuctionPhase::Settled.accepts_bids());
    }
}
