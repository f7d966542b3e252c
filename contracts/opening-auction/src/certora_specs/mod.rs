// ============================================================================
// CERTORA SUNBEAM FORMAL VERIFICATION SPECIFICATIONS
// ============================================================================
//
// Rules for the opening auction's time accounting and phase machine.
//
// - accumulator_specs.rs : seconds-per-liquidity accumulator
// - phase_specs.rs       : Active -> Closed -> Settled lifecycle
//
// USAGE:
// - Unit tests: cargo test -p opening-auction
// - Certora build: cargo build --features certora -p opening-auction
//
// ============================================================================

pub mod accumulator_specs;
pub mod phase_specs;
