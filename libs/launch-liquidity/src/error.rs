use soroban_sdk::contracterror;

/// Errors raised while shaping or moving liquidity
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum LiquidityError {
    /// A curve bound is not a multiple of the tick spacing
    UnalignedTick = 100,
    /// lower >= upper, or a bound outside the usable tick range
    InvalidTickRange = 101,
    /// Two adjusted curves cover the same ticks
    OverlappingCurves = 102,
    /// A share is not positive or shares do not sum to WAD
    InvalidShares = 103,
    /// No curves, or a curve cannot hold its positions
    InvalidCurveCount = 104,
    /// Action code is not MINT, BURN or COLLECT
    UnknownAction = 105,
    /// Completion handler reached outside an open unlock session
    OnlyPoolManager = 106,
    ArithmeticOverflow = 107,
    /// Amount to place must be positive
    InvalidAmount = 108,
    /// Tick spacing outside 1..=MAX_TICK_SPACING
    InvalidTickSpacing = 109,
}
