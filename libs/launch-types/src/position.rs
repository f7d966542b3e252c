use soroban_sdk::{contracttype, Address, BytesN, Env, U256};

/// A concrete liquidity range owned by a venue contract in the pool manager
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Position {
    /// Lower tick boundary
    pub tick_lower: i32,
    /// Upper tick boundary
    pub tick_upper: i32,
    /// Liquidity amount
    pub liquidity: u128,
    /// Stable identifier used as the pool manager position salt
    pub salt: BytesN<32>,
}

/// A bid in the opening auction
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AuctionPosition {
    pub owner: Address,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: u128,
    /// Tick accumulator value at the position's last checkpoint (Q128)
    pub reward_debt_x128: U256,
    /// Share-weighted seconds in range, crystallised by earlier liquidity changes
    pub earned_seconds: u128,
}

impl AuctionPosition {
    pub fn new(env: &Env, owner: Address, tick_lower: i32, tick_upper: i32) -> Self {
        Self {
            owner,
            tick_lower,
            tick_upper,
            liquidity: 0,
            reward_debt_x128: U256::from_u32(env, 0),
            earned_seconds: 0,
        }
    }

    /// True when nothing remains to withdraw or harvest
    pub fn is_empty(&self) -> bool {
        self.liquidity == 0 && self.earned_seconds == 0
    }
}
