use crate::{Curve, Position};
use soroban_sdk::{contracttype, Address, BytesN, Vec};

/// Identity of a pool inside the pool manager
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolKey {
    /// Lower currency address
    pub currency0: Address,
    /// Higher currency address
    pub currency1: Address,
    /// Fee tier in hundredths of bps
    pub fee: u32,
    /// Tick spacing for this pool
    pub tick_spacing: i32,
}

/// Price slot of a pool as reported by the pool manager
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Slot0 {
    /// Current sqrt(price) as Q64.96
    pub sqrt_price_x96: u128,
    /// Current tick index
    pub tick: i32,
}

/// Signed token amounts from the caller's point of view.
/// Negative amounts are owed to the pool manager, positive amounts are owed
/// to the caller.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BalanceDelta {
    pub amount0: i128,
    pub amount1: i128,
}

impl BalanceDelta {
    pub fn new(amount0: i128, amount1: i128) -> Self {
        Self { amount0, amount1 }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Component-wise sum, panics on overflow
    pub fn add(&self, other: &BalanceDelta) -> BalanceDelta {
        BalanceDelta {
            amount0: self
                .amount0
                .checked_add(other.amount0)
                .expect("Delta overflow"),
            amount1: self
                .amount1
                .checked_add(other.amount1)
                .expect("Delta overflow"),
        }
    }
}

/// Arguments of a single modify-liquidity call
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ModifyLiquidityParams {
    pub tick_lower: i32,
    pub tick_upper: i32,
    /// Positive to add liquidity, negative to remove, zero to poke fees
    pub liquidity_delta: i128,
    /// Distinguishes positions of the same owner on the same range
    pub salt: BytesN<32>,
}

/// Exact-input swap request
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SwapParams {
    /// Sell token0 for token1 (price moves down) when true
    pub zero_for_one: bool,
    /// Amount of the input currency to sell
    pub amount_in: i128,
    /// The price never moves past this bound
    pub sqrt_price_limit_x96: u128,
}

/// Status of an asset's seeded pool
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum PoolStatus {
    Uninitialized = 0,
    /// Liquidity may exit once the far tick is crossed
    Initialized = 1,
    /// Liquidity is permanent, fees go to beneficiaries
    Locked = 2,
    /// Liquidity has been withdrawn
    Exited = 3,
}

impl PoolStatus {
    /// Validate a status transition
    pub fn can_transition_to(&self, next: PoolStatus) -> bool {
        matches!(
            (self, next),
            (PoolStatus::Uninitialized, PoolStatus::Initialized)
                | (PoolStatus::Uninitialized, PoolStatus::Locked)
                | (PoolStatus::Initialized, PoolStatus::Exited)
        )
    }
}

/// Recipient of a share of collected fees
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BeneficiaryShare {
    pub beneficiary: Address,
    /// Share of fees in WAD
    pub shares: i128,
}

/// Issuer supplied pool and curve configuration
#[contracttype]
#[derive(Clone, Debug)]
pub struct InitData {
    /// Fee tier in hundredths of bps
    pub fee: u32,
    /// Tick spacing for the pool
    pub tick_spacing: i32,
    /// Offset applied to every curve bound, must be spacing aligned
    pub reference_tick: i32,
    /// Liquidity curves in asset-is-token0 orientation
    pub curves: Vec<Curve>,
    /// Fee recipients; a non-empty list locks the liquidity forever
    pub beneficiaries: Vec<BeneficiaryShare>,
}

/// Per-asset record kept by the initializer
#[contracttype]
#[derive(Clone, Debug)]
pub struct PoolState {
    pub asset: Address,
    pub numeraire: Address,
    /// True when the asset is currency0 of the pool
    pub is_token0: bool,
    pub pool_key: PoolKey,
    pub beneficiaries: Vec<BeneficiaryShare>,
    pub positions: Vec<Position>,
    pub status: PoolStatus,
    /// Tick that must be crossed before liquidity may exit
    pub far_tick: i32,
    /// Asset amount actually placed in the pool
    pub total_amount: i128,
}

/// Amounts released by a liquidity exit
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExitResult {
    pub sqrt_price_x96: u128,
    pub currency0: Address,
    pub currency1: Address,
    /// Principal and fees of currency0 sent to the recipient
    pub amount0: i128,
    /// Principal and fees of currency1 sent to the recipient
    pub amount1: i128,
    pub fees0: i128,
    pub fees1: i128,
}
