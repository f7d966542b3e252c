use soroban_sdk::{contracttype, Address};

/// Opening auction lifecycle phase
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum AuctionPhase {
    /// Bids are accepted
    Active = 0,
    /// End time reached or closed early, clearing tick pending
    Closed = 1,
    /// Clearing tick fixed, rewards harvestable
    Settled = 2,
}

impl AuctionPhase {
    /// Phases only move forward, one step at a time
    pub fn can_transition_to(&self, next: AuctionPhase) -> bool {
        matches!(
            (self, next),
            (AuctionPhase::Active, AuctionPhase::Closed)
                | (AuctionPhase::Closed, AuctionPhase::Settled)
        )
    }

    pub fn accepts_bids(&self) -> bool {
        matches!(self, AuctionPhase::Active)
    }
}

/// Auction configuration - immutable after initialization
#[contracttype]
#[derive(Clone, Debug)]
pub struct AuctionConfig {
    /// Issuer allowed to initialize and close the auction early
    pub admin: Address,
    /// Pool manager hosting the auction pool
    pub pool_manager: Address,
    /// Asset being sold
    pub asset: Address,
    /// Currency bids are denominated in
    pub numeraire: Address,
    /// Fee tier of the auction pool
    pub fee: u32,
    /// Tick spacing of the auction pool, also the width of every bid
    pub tick_spacing: i32,
    /// Tick the pool is initialized at; bids rest on the numeraire side of it
    pub start_tick: i32,
    /// Worst acceptable clearing tick; no bid may cross it
    pub limit_tick: i32,
    /// Asset amount held in custody and sold into the bids at settlement
    pub auction_amount: i128,
    /// Ledger timestamp at which bidding stops
    pub end_time: u64,
}

/// Mutable auction state
#[contracttype]
#[derive(Clone, Debug)]
pub struct AuctionState {
    pub phase: AuctionPhase,
    /// True when the asset is currency0 of the auction pool
    pub is_token0: bool,
    /// Ledger timestamp the auction opened at
    pub start_time: u64,
    /// Effective end time; pinned to the close time on an early close
    pub end_time: u64,
    /// Clearing estimate from the pool price as of the last touch.
    /// Drives the in-range flags; never used for payouts.
    pub estimated_clearing_tick: i32,
    /// Final clearing tick, set exactly once at settlement
    pub clearing_tick: Option<i32>,
    /// Total bid liquidity across all ticks
    pub total_liquidity: u128,
    /// Number of ticks currently holding bid liquidity
    pub bid_ticks: u32,
}

impl AuctionState {
    /// Fixed clearing tick once settled, the last stored estimate before
    pub fn current_clearing_tick(&self) -> i32 {
        self.clearing_tick.unwrap_or(self.estimated_clearing_tick)
    }
}
