use soroban_sdk::{contracttype, Env, U256};

/// Time-in-range bookkeeping for a tick that has held auction liquidity
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TickTimeState {
    /// Seconds in range per unit of liquidity (Q128.128), never decreases
    pub accumulated_seconds_x128: U256,
    /// Auction liquidity currently resting on this tick
    pub liquidity: u128,
    /// True while the tick sits on the filled side of the clearing tick
    pub in_range: bool,
    /// Ledger timestamp of the last reconciliation
    pub last_update: u64,
}

impl TickTimeState {
    pub fn new(env: &Env, now: u64) -> Self {
        Self {
            accumulated_seconds_x128: U256::from_u32(env, 0),
            liquidity: 0,
            in_range: false,
            last_update: now,
        }
    }
}
