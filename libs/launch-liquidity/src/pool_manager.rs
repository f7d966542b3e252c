//! Calls into the external concentrated-liquidity pool manager.
//!
//! The pool manager keeps per-locker currency deltas while an unlock
//! session is open and refuses to lock again until every delta is zero.
//! Any failure on its side aborts the whole invocation.

use launch_types::{BalanceDelta, ModifyLiquidityParams, PoolKey, Slot0, SwapParams};
use soroban_sdk::{Address, Env, IntoVal, Symbol};

/// Create the pool at the given price, returns the starting tick
pub fn initialize(env: &Env, pool_manager: &Address, key: &PoolKey, sqrt_price_x96: u128) -> i32 {
    env.invoke_contract(
        pool_manager,
        &Symbol::new(env, "initialize"),
        (key.clone(), sqrt_price_x96).into_val(env),
    )
}

pub fn get_slot0(env: &Env, pool_manager: &Address, key: &PoolKey) -> Slot0 {
    env.invoke_contract(
        pool_manager,
        &Symbol::new(env, "get_slot0"),
        (key.clone(),).into_val(env),
    )
}

/// Open an unlock session for `locker`
pub fn unlock(env: &Env, pool_manager: &Address, locker: &Address) {
    let _: () = env.invoke_contract(
        pool_manager,
        &Symbol::new(env, "unlock"),
        (locker.clone(),).into_val(env),
    );
}

/// Close the session; fails while any delta is outstanding
pub fn lock(env: &Env, pool_manager: &Address, locker: &Address) {
    let _: () = env.invoke_contract(
        pool_manager,
        &Symbol::new(env, "lock"),
        (locker.clone(),).into_val(env),
    );
}

pub fn is_unlocked(env: &Env, pool_manager: &Address, locker: &Address) -> bool {
    env.invoke_contract(
        pool_manager,
        &Symbol::new(env, "is_unlocked"),
        (locker.clone(),).into_val(env),
    )
}

/// Returns (caller delta including fees, fees accrued)
pub fn modify_liquidity(
    env: &Env,
    pool_manager: &Address,
    locker: &Address,
    key: &PoolKey,
    params: ModifyLiquidityParams,
) -> (BalanceDelta, BalanceDelta) {
    env.invoke_contract(
        pool_manager,
        &Symbol::new(env, "modify_liquidity"),
        (locker.clone(), key.clone(), params).into_val(env),
    )
}

/// Sell into the pool's liquidity, returns the caller delta
pub fn swap(
    env: &Env,
    pool_manager: &Address,
    locker: &Address,
    key: &PoolKey,
    params: SwapParams,
) -> BalanceDelta {
    env.invoke_contract(
        pool_manager,
        &Symbol::new(env, "swap"),
        (locker.clone(), key.clone(), params).into_val(env),
    )
}

/// Withdraw a positive delta of `currency` to `to`
pub fn take(
    env: &Env,
    pool_manager: &Address,
    locker: &Address,
    currency: &Address,
    to: &Address,
    amount: i128,
) {
    let _: () = env.invoke_contract(
        pool_manager,
        &Symbol::new(env, "take"),
        (locker.clone(), currency.clone(), to.clone(), amount).into_val(env),
    );
}

/// Snapshot the pool manager's balance of `currency` ahead of a payment
pub fn sync(env: &Env, pool_manager: &Address, currency: &Address) {
    let _: () = env.invoke_contract(
        pool_manager,
        &Symbol::new(env, "sync"),
        (currency.clone(),).into_val(env),
    );
}

/// Credit whatever was paid since the last sync, returns the amount credited
pub fn settle(env: &Env, pool_manager: &Address, locker: &Address) -> i128 {
    env.invoke_contract(
        pool_manager,
        &Symbol::new(env, "settle"),
        (locker.clone(),).into_val(env),
    )
}
