use launch_types::PoolState;
use soroban_sdk::{contracttype, Address, Env};

// ============================================================================
// SOROBAN RESOURCE LIMITS
// ============================================================================
// - Ledger entry size: 128 KiB max
// - Write entries per tx: 50 entries / 132 KB
//
// One PoolState entry per asset holds every seeded position, so the number
// of positions across all curves is capped below to keep the entry and the
// mint/burn session within a single transaction.
// ============================================================================

/// Maximum positions seeded for one asset, across all curves
pub const MAX_POSITIONS: u32 = 24;

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    /// Issuer allowed to seed and exit pools (Instance)
    Admin,
    /// Pool manager hosting the pools (Instance)
    PoolManager,
    /// Asset -> PoolState (Persistent)
    Pool(Address),
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

pub fn has_pool(env: &Env, asset: &Address) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::Pool(asset.clone()))
}

pub fn get_pool(env: &Env, asset: &Address) -> Option<PoolState> {
    let key = DataKey::Pool(asset.clone());
    let state: Option<PoolState> = env.storage().persistent().get(&key);
    if state.is_some() {
        env.storage()
            .persistent()
            .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_EXTEND);
    }
    state
}

pub fn set_pool(env: &Env, asset: &Address, state: &PoolState) {
    let key = DataKey::Pool(asset.clone());
    env.storage().persistent().set(&key, state);
    env.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_EXTEND);
    extend_instance_ttl(env);
}
