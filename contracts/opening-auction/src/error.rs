use launch_liquidity::LiquidityError;
use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum AuctionError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    /// Bidding is over
    AuctionNotActive = 3,
    /// Settlement needs a closed auction
    AuctionNotClosed = 4,
    /// Rewards and fees are only available once settled
    AuctionNotSettled = 5,
    ClearingTickAlreadySet = 6,
    PositionNotFound = 7,
    NotPositionOwner = 8,
    /// Filled bids cannot be withdrawn before settlement
    PositionInRange = 9,
    /// Only filled bids earn fees
    PositionNotInRange = 10,
    /// Bid is not one spacing wide or sits on the wrong side of the start
    InvalidBidRange = 11,
    ZeroLiquidity = 12,
    InsufficientLiquidity = 13,
    /// Bid absorbs less than the minimum share of the supply
    BidTooSmall = 14,
    /// Limit tick on the wrong side of the start, or too far from it
    InvalidLimitTick = 15,
    InvalidEndTime = 16,
    InvalidAmount = 17,
    InvalidTickSpacing = 18,
    UnalignedTick = 19,
    InvalidTickRange = 20,
    UnknownAction = 21,
    OnlyPoolManager = 22,
    ArithmeticOverflow = 23,
    /// Curve shape rejected by the liquidity library
    InvalidCurve = 24,
    /// Asset and numeraire must differ
    InvalidCurrencies = 25,
}

impl From<LiquidityError> for AuctionError {
    fn from(err: LiquidityError) -> Self {
        match err {
            LiquidityError::UnalignedTick => AuctionError::UnalignedTick,
            LiquidityError::InvalidTickRange => AuctionError::InvalidTickRange,
            LiquidityError::UnknownAction => AuctionError::UnknownAction,
            LiquidityError::OnlyPoolManager => AuctionError::OnlyPoolManager,
            LiquidityError::ArithmeticOverflow => AuctionError::ArithmeticOverflow,
            LiquidityError::InvalidAmount => AuctionError::InvalidAmount,
            LiquidityError::InvalidTickSpacing => AuctionError::InvalidTickSpacing,
            LiquidityError::OverlappingCurves
            | LiquidityError::InvalidShares
            | LiquidityError::InvalidCurveCount => AuctionError::InvalidCurve,
        }
    }
}
