use launch_types::{AuctionConfig, AuctionPosition, AuctionState, TickTimeState};
use soroban_sdk::{contracttype, Address, BytesN, Env};

// ============================================================================
// SOROBAN RESOURCE LIMITS
// ============================================================================
// - Read entries per tx: 100 entries / 200 KB
// - Write entries per tx: 50 entries / 132 KB
//
// A bid walks the bitmap from the live price until the supply is absorbed
// and rewrites the ticks the clearing estimate moves across. Every bid must
// absorb at least 1/MAX_FILLED_TICKS of the supply over its own tick, so
// both walks touch at most MAX_FILLED_TICKS filled ticks. Bitmap words are
// bounded by the start to limit distance.
// ============================================================================

/// Most ticks that can be filled at once given the minimum bid size
pub const MAX_FILLED_TICKS: u128 = 32;

/// Maximum distance between start and limit, in tick spacings
/// (16 bitmap words of 128 ticks)
pub const MAX_BID_RANGE_SPACINGS: i32 = 2048;

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    /// Issuer allowed to configure and close the auction (Instance)
    Admin,
    /// Pool manager hosting the auction pool (Instance)
    PoolManager,
    /// Auction configuration (Instance)
    Config,
    /// Phase and clearing state (Instance)
    State,
    /// Bid tick lower bound -> TickTimeState (Persistent)
    TickTime(i32),
    /// Bitmap word position -> u128 of bid ticks (Persistent)
    TickBitmap(i32),
    /// Position id -> AuctionPosition (Persistent)
    Position(BytesN<32>),
}

const INSTANCE_TTL_THRESHOLD: u32 = 17280; // ~1 day
const INSTANCE_TTL_EXTEND: u32 = 518400; // ~30 days
const PERSISTENT_TTL_THRESHOLD: u32 = 17280;
const PERSISTENT_TTL_EXTEND: u32 = 518400;

pub fn extend_instance_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND);
}

fn extend_persistent_ttl(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_EXTEND);
}

// === Roles ===

pub fn get_admin(env: &Env) -> Address {
    env.storage()
        .instance()
        .get(&DataKey::Admin)
        .expect("Admin not set")
}

pub fn set_admin(env: &Env, admin: &Address) {
    env.storage().instance().set(&DataKey::Admin, admin);
}

pub fn get_pool_manager(env: &Env) -> Address {
    env.storage()
        .instance()
        .get(&DataKey::PoolManager)
        .expect("Pool manager not set")
}

pub fn set_pool_manager(env: &Env, pool_manager: &Address) {
    env.storage()
        .instance()
        .set(&DataKey::PoolManager, pool_manager);
}

// === Config / State ===

pub fn has_state(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::State)
}

pub fn get_config(env: &Env) -> Option<AuctionConfig> {
    extend_instance_ttl(env);
    env.storage().instance().get(&DataKey::Config)
}

pub fn set_config(env: &Env, config: &AuctionConfig) {
    env.storage().instance().set(&DataKey::Config, config);
}

pub fn get_state(env: &Env) -> Option<AuctionState> {
    env.storage().instance().get(&DataKey::State)
}

pub fn set_state(env: &Env, state: &AuctionState) {
    env.storage().instance().set(&DataKey::State, state);
    extend_instance_ttl(env);
}

// === Ticks ===

pub fn get_tick_time(env: &Env, tick: i32) -> Option<TickTimeState> {
    let key = DataKey::TickTime(tick);
    let state: Option<TickTimeState> = env.storage().persistent().get(&key);
    if state.is_some() {
        extend_persistent_ttl(env, &key);
    }
    state
}

pub fn set_tick_time(env: &Env, tick: i32, state: &TickTimeState) {
    let key = DataKey::TickTime(tick);
    env.storage().persistent().set(&key, state);
    extend_persistent_ttl(env, &key);
}

pub fn get_tick_bitmap_word(env: &Env, word_pos: i32) -> u128 {
    env.storage()
        .persistent()
        .get(&DataKey::TickBitmap(word_pos))
        .unwrap_or(0u128)
}

pub fn set_tick_bitmap_word(env: &Env, word_pos: i32, bitmap: u128) {
    let key = DataKey::TickBitmap(word_pos);
    if bitmap == 0 {
        env.storage().persistent().remove(&key);
    } else {
        env.storage().persistent().set(&key, &bitmap);
        extend_persistent_ttl(env, &key);
    }
}

// === Positions ===

pub fn get_position(env: &Env, id: &BytesN<32>) -> Option<AuctionPosition> {
    let key = DataKey::Position(id.clone());
    let position: Option<AuctionPosition> = env.storage().persistent().get(&key);
    if position.is_some() {
        extend_persistent_ttl(env, &key);
    }
    position
}

/// Store a position, removing it once nothing is left to withdraw or harvest
pub fn set_position(env: &Env, id: &BytesN<32>, position: &AuctionPosition) {
    let key = DataKey::Position(id.clone());
    if position.is_empty() {
        env.storage().persistent().remove(&key);
    } else {
        env.storage().persistent().set(&key, position);
        extend_persistent_ttl(env, &key);
    }
}
