use launch_liquidity::LiquidityError;
use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum InitializerError {
    AlreadyInitialized = 1,
    PoolNotInitialized = 2,
    /// Liquidity of a pool with beneficiaries never exits
    PoolLocked = 3,
    AlreadyExited = 4,
    /// Pool price has not crossed the far tick yet
    InsufficientTick = 5,
    /// Fee collection is reserved for locked pools
    PoolNotLocked = 6,
    /// Beneficiary shares must be positive and sum to WAD
    InvalidBeneficiaries = 7,
    InvalidCurrencies = 8,
    InvalidAmount = 9,
    UnalignedTick = 10,
    InvalidTickRange = 11,
    OverlappingCurves = 12,
    InvalidShares = 13,
    InvalidCurveCount = 14,
    UnknownAction = 15,
    OnlyPoolManager = 16,
    ArithmeticOverflow = 17,
    InvalidTickSpacing = 18,
}

impl From<LiquidityError> for InitializerError {
    fn from(err: LiquidityError) -> Self {
        match err {
            LiquidityError::UnalignedTick => InitializerError::UnalignedTick,
            LiquidityError::InvalidTickRange => InitializerError::InvalidTickRange,
            LiquidityError::OverlappingCurves => InitializerError::OverlappingCurves,
            LiquidityError::InvalidShares => InitializerError::InvalidShares,
            LiquidityError::InvalidCurveCount => InitializerError::InvalidCurveCount,
            LiquidityError::UnknownAction => InitializerError::UnknownAction,
            LiquidityError::OnlyPoolManager => InitializerError::OnlyPoolManager,
            LiquidityError::ArithmeticOverflow => InitializerError::ArithmeticOverflow,
            LiquidityError::InvalidAmount => InitializerError::InvalidAmount,
            LiquidityError::InvalidTickSpacing => InitializerError::InvalidTickSpacing,
        }
    }
}
