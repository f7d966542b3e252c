//! In-ledger pool manager for tests.
//!
//! Implements the calls in [`crate::pool_manager`] with flash accounting:
//! every modify, take and settle moves a per-locker currency delta, and
//! `lock` panics while any delta is non-zero. Amounts owed to the pool are
//! rounded up, amounts paid out are rounded down. Swaps are exact input,
//! charge no fee and walk the listed positions range by range. Tests that
//! need the price somewhere without trading use `set_tick` /
//! `set_sqrt_price` and fund the manager directly.

use launch_math::{
    add_delta, get_amount0_delta, get_amount1_delta, get_amounts_for_liquidity,
    get_sqrt_ratio_at_tick, get_tick_at_sqrt_ratio, mul_div,
};
use launch_types::{
    BalanceDelta, ModifyLiquidityParams, PoolKey, Slot0, SwapParams, MAX_SQRT_RATIO,
    MIN_SQRT_RATIO, Q96,
};
use soroban_sdk::{contract, contractimpl, contracttype, token, Address, BytesN, Env, Vec, U256};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MockPositionKey {
    pub owner: Address,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub salt: BytesN<32>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MockPosition {
    pub liquidity: u128,
    pub owed0: i128,
    pub owed1: i128,
}

#[contracttype]
#[derive(Clone)]
pub struct SyncedReserve {
    pub currency: Address,
    pub reserve: i128,
}

#[contracttype]
#[derive(Clone)]
pub enum MockKey {
    Slot0(PoolKey),
    Position(PoolKey, MockPositionKey),
    PoolPositions(PoolKey),
    Unlocked(Address),
    Delta(Address, Address),
    Touched(Address),
    Synced,
}

#[contract]
pub struct MockPoolManager;

#[contractimpl]
impl MockPoolManager {
    pub fn initialize(env: Env, key: PoolKey, sqrt_price_x96: u128) -> i32 {
        if env.storage().persistent().has(&MockKey::Slot0(key.clone())) {
            panic!("Pool already initialized");
        }
        if key.currency0 >= key.currency1 {
            panic!("Currencies out of order");
        }
        let tick = get_tick_at_sqrt_ratio(&env, sqrt_price_x96);
        env.storage().persistent().set(
            &MockKey::Slot0(key),
            &Slot0 {
                sqrt_price_x96,
                tick,
            },
        );
        tick
    }

    pub fn get_slot0(env: Env, key: PoolKey) -> Slot0 {
        env.storage()
            .persistent()
            .get(&MockKey::Slot0(key))
            .expect("Pool not initialized")
    }

    /// Test hook: move the price without a swap
    pub fn set_sqrt_price(env: Env, key: PoolKey, sqrt_price_x96: u128) {
        let tick = get_tick_at_sqrt_ratio(&env, sqrt_price_x96);
        Self::write_slot0(&env, key, sqrt_price_x96, tick);
    }

    /// Test hook: move the price to exactly `tick`
    pub fn set_tick(env: Env, key: PoolKey, tick: i32) {
        let sqrt_price_x96 = get_sqrt_ratio_at_tick(&env, tick);
        Self::write_slot0(&env, key, sqrt_price_x96, tick);
    }

    pub fn unlock(env: Env, locker: Address) {
        locker.require_auth();
        let key = MockKey::Unlocked(locker);
        if env.storage().temporary().has(&key) {
            panic!("Already unlocked");
        }
        env.storage().temporary().set(&key, &true);
    }

    pub fn is_unlocked(env: Env, locker: Address) -> bool {
        env.storage().temporary().has(&MockKey::Unlocked(locker))
    }

    pub fn lock(env: Env, locker: Address) {
        Self::require_unlocked(&env, &locker);
        let touched: Vec<Address> = env
            .storage()
            .temporary()
            .get(&MockKey::Touched(locker.clone()))
            .unwrap_or(Vec::new(&env));
        for currency in touched.iter() {
            let key = MockKey::Delta(locker.clone(), currency);
            let delta: i128 = env.storage().temporary().get(&key).unwrap_or(0);
            if delta != 0 {
                panic!("Currency not settled");
            }
            env.storage().temporary().remove(&key);
        }
        env.storage().temporary().remove(&MockKey::Touched(locker.clone()));
        env.storage().temporary().remove(&MockKey::Unlocked(locker));
    }

    pub fn modify_liquidity(
        env: Env,
        locker: Address,
        key: PoolKey,
        params: ModifyLiquidityParams,
    ) -> (BalanceDelta, BalanceDelta) {
        locker.require_auth();
        Self::require_unlocked(&env, &locker);

        if params.tick_lower >= params.tick_upper
            || params.tick_lower % key.tick_spacing != 0
            || params.tick_upper % key.tick_spacing != 0
        {
            panic!("Invalid ticks");
        }

        let slot0 = Self::get_slot0(env.clone(), key.clone());
        let position_key = MockPositionKey {
            owner: locker.clone(),
            tick_lower: params.tick_lower,
            tick_upper: params.tick_upper,
            salt: params.salt.clone(),
        };
        let storage_key = MockKey::Position(key.clone(), position_key.clone());
        let existing: Option<MockPosition> = env.storage().persistent().get(&storage_key);
        let is_new = existing.is_none();
        let mut position = existing.unwrap_or(MockPosition {
            liquidity: 0,
            owed0: 0,
            owed1: 0,
        });

        let sqrt_lower = get_sqrt_ratio_at_tick(&env, params.tick_lower);
        let sqrt_upper = get_sqrt_ratio_at_tick(&env, params.tick_upper);
        let principal = if params.liquidity_delta > 0 {
            let (a0, a1) = get_amounts_for_liquidity(
                &env,
                slot0.sqrt_price_x96,
                sqrt_lower,
                sqrt_upper,
                params.liquidity_delta as u128,
                true,
            );
            BalanceDelta::new(-(a0 as i128), -(a1 as i128))
        } else if params.liquidity_delta < 0 {
            let (a0, a1) = get_amounts_for_liquidity(
                &env,
                slot0.sqrt_price_x96,
                sqrt_lower,
                sqrt_upper,
                params.liquidity_delta.unsigned_abs(),
                false,
            );
            BalanceDelta::new(a0 as i128, a1 as i128)
        } else {
            BalanceDelta::zero()
        };

        position.liquidity = add_delta(position.liquidity, params.liquidity_delta);
        let fees = BalanceDelta::new(position.owed0, position.owed1);
        position.owed0 = 0;
        position.owed1 = 0;

        let caller_delta = principal.add(&fees);
        Self::account(&env, &locker, &key.currency0, caller_delta.amount0);
        Self::account(&env, &locker, &key.currency1, caller_delta.amount1);

        let list_key = MockKey::PoolPositions(key.clone());
        let mut listed: Vec<MockPositionKey> = env
            .storage()
            .persistent()
            .get(&list_key)
            .unwrap_or(Vec::new(&env));
        if position.liquidity == 0 {
            env.storage().persistent().remove(&storage_key);
            if let Some(index) = listed.first_index_of(&position_key) {
                listed.remove(index);
            }
        } else {
            env.storage().persistent().set(&storage_key, &position);
            if is_new {
                listed.push_back(position_key);
            }
        }
        env.storage().persistent().set(&list_key, &listed);

        (caller_delta, fees)
    }

    pub fn swap(env: Env, locker: Address, key: PoolKey, params: SwapParams) -> BalanceDelta {
        locker.require_auth();
        Self::require_unlocked(&env, &locker);
        if params.amount_in <= 0 {
            panic!("Invalid amount");
        }

        let slot0 = Self::get_slot0(env.clone(), key.clone());
        let limit = params.sqrt_price_limit_x96;
        let limit_ok = if params.zero_for_one {
            limit < slot0.sqrt_price_x96 && limit >= MIN_SQRT_RATIO
        } else {
            limit > slot0.sqrt_price_x96 && limit < MAX_SQRT_RATIO
        };
        if !limit_ok {
            panic!("Invalid price limit");
        }

        let ranges = Self::ranges(&env, &key);
        let mut sqrt_price = slot0.sqrt_price_x96;
        let mut remaining = params.amount_in as u128;
        let mut amount_out: u128 = 0;

        while remaining > 0 && sqrt_price != limit {
            // Next range boundary in the direction of travel, or the limit
            let mut target = limit;
            for (lower, upper, _) in ranges.iter() {
                for bound in [lower, upper] {
                    let closer = if params.zero_for_one {
                        bound < sqrt_price && bound > target
                    } else {
                        bound > sqrt_price && bound < target
                    };
                    if closer {
                        target = bound;
                    }
                }
            }

            let (low, high) = if params.zero_for_one {
                (target, sqrt_price)
            } else {
                (sqrt_price, target)
            };
            let mut liquidity: u128 = 0;
            for (lower, upper, position_liquidity) in ranges.iter() {
                if lower <= low && upper >= high {
                    liquidity += position_liquidity;
                }
            }
            if liquidity == 0 {
                sqrt_price = target;
                continue;
            }

            let max_in = if params.zero_for_one {
                get_amount0_delta(&env, low, high, liquidity, true)
            } else {
                get_amount1_delta(&env, low, high, liquidity, true)
            };
            let next = if remaining >= max_in {
                remaining -= max_in;
                target
            } else {
                let partial = if params.zero_for_one {
                    Self::sqrt_price_after_amount0_in(&env, sqrt_price, liquidity, remaining)
                } else {
                    sqrt_price + mul_div(&env, remaining, Q96, liquidity)
                };
                remaining = 0;
                partial
            };

            amount_out += if params.zero_for_one {
                get_amount1_delta(&env, next, sqrt_price, liquidity, false)
            } else {
                get_amount0_delta(&env, sqrt_price, next, liquidity, false)
            };
            sqrt_price = next;
        }

        let sold = params.amount_in - remaining as i128;
        let delta = if params.zero_for_one {
            BalanceDelta::new(-sold, amount_out as i128)
        } else {
            BalanceDelta::new(amount_out as i128, -sold)
        };
        Self::account(&env, &locker, &key.currency0, delta.amount0);
        Self::account(&env, &locker, &key.currency1, delta.amount1);

        let tick = get_tick_at_sqrt_ratio(&env, sqrt_price);
        Self::write_slot0(&env, key, sqrt_price, tick);
        delta
    }

    pub fn get_position(env: Env, key: PoolKey, position: MockPositionKey) -> Option<MockPosition> {
        env.storage()
            .persistent()
            .get(&MockKey::Position(key, position))
    }

    pub fn take(env: Env, locker: Address, currency: Address, to: Address, amount: i128) {
        locker.require_auth();
        Self::require_unlocked(&env, &locker);
        if amount <= 0 {
            panic!("Invalid amount");
        }
        token::Client::new(&env, &currency).transfer(&env.current_contract_address(), &to, &amount);
        Self::account(&env, &locker, &currency, -amount);
    }

    pub fn sync(env: Env, currency: Address) {
        let reserve = token::Client::new(&env, &currency).balance(&env.current_contract_address());
        env.storage()
            .temporary()
            .set(&MockKey::Synced, &SyncedReserve { currency, reserve });
    }

    pub fn settle(env: Env, locker: Address) -> i128 {
        Self::require_unlocked(&env, &locker);
        let synced: SyncedReserve = env
            .storage()
            .temporary()
            .get(&MockKey::Synced)
            .expect("Nothing synced");
        env.storage().temporary().remove(&MockKey::Synced);

        let balance =
            token::Client::new(&env, &synced.currency).balance(&env.current_contract_address());
        let paid = balance - synced.reserve;
        Self::account(&env, &locker, &synced.currency, paid);
        paid
    }

    /// Test hook: pay fees into the pool, credited to every live position
    /// pro rata by liquidity
    pub fn donate(env: Env, from: Address, key: PoolKey, amount0: i128, amount1: i128) {
        from.require_auth();
        let this = env.current_contract_address();
        if amount0 > 0 {
            token::Client::new(&env, &key.currency0).transfer(&from, &this, &amount0);
        }
        if amount1 > 0 {
            token::Client::new(&env, &key.currency1).transfer(&from, &this, &amount1);
        }

        let listed: Vec<MockPositionKey> = env
            .storage()
            .persistent()
            .get(&MockKey::PoolPositions(key.clone()))
            .unwrap_or(Vec::new(&env));
        let mut total: u128 = 0;
        for position_key in listed.iter() {
            let position: MockPosition = env
                .storage()
                .persistent()
                .get(&MockKey::Position(key.clone(), position_key))
                .expect("Listed position missing");
            total += position.liquidity;
        }
        if total == 0 {
            panic!("No liquidity");
        }

        for position_key in listed.iter() {
            let storage_key = MockKey::Position(key.clone(), position_key);
            let mut position: MockPosition = env
                .storage()
                .persistent()
                .get(&storage_key)
                .expect("Listed position missing");
            position.owed0 += (amount0 as u128 * position.liquidity / total) as i128;
            position.owed1 += (amount1 as u128 * position.liquidity / total) as i128;
            env.storage().persistent().set(&storage_key, &position);
        }
    }
}

impl MockPoolManager {
    fn write_slot0(env: &Env, key: PoolKey, sqrt_price_x96: u128, tick: i32) {
        env.storage().persistent().set(
            &MockKey::Slot0(key),
            &Slot0 {
                sqrt_price_x96,
                tick,
            },
        );
    }

    /// (sqrt lower, sqrt upper, liquidity) of every live position
    fn ranges(env: &Env, key: &PoolKey) -> Vec<(u128, u128, u128)> {
        let listed: Vec<MockPositionKey> = env
            .storage()
            .persistent()
            .get(&MockKey::PoolPositions(key.clone()))
            .unwrap_or(Vec::new(env));
        let mut ranges = Vec::new(env);
        for position_key in listed.iter() {
            let position: MockPosition = env
                .storage()
                .persistent()
                .get(&MockKey::Position(key.clone(), position_key.clone()))
                .expect("Listed position missing");
            ranges.push_back((
                get_sqrt_ratio_at_tick(env, position_key.tick_lower),
                get_sqrt_ratio_at_tick(env, position_key.tick_upper),
                position.liquidity,
            ));
        }
        ranges
    }

    /// ceil(L * Q96 * P / (L * Q96 + amount * P))
    fn sqrt_price_after_amount0_in(
        env: &Env,
        sqrt_price: u128,
        liquidity: u128,
        amount: u128,
    ) -> u128 {
        let numerator = U256::from_u128(env, liquidity)
            .mul(&U256::from_u128(env, Q96))
            .mul(&U256::from_u128(env, sqrt_price));
        let denominator = U256::from_u128(env, liquidity)
            .mul(&U256::from_u128(env, Q96))
            .add(&U256::from_u128(env, amount).mul(&U256::from_u128(env, sqrt_price)));
        let quotient = numerator.div(&denominator);
        let rounded = if numerator.rem_euclid(&denominator) > U256::from_u32(env, 0) {
            quotient.add(&U256::from_u32(env, 1))
        } else {
            quotient
        };
        rounded.to_u128().expect("sqrt price overflow")
    }

    fn require_unlocked(env: &Env, locker: &Address) {
        if !env
            .storage()
            .temporary()
            .has(&MockKey::Unlocked(locker.clone()))
        {
            panic!("Manager locked");
        }
    }

    fn account(env: &Env, locker: &Address, currency: &Address, amount: i128) {
        if amount == 0 {
            return;
        }
        let key = MockKey::Delta(locker.clone(), currency.clone());
        let current: i128 = env.storage().temporary().get(&key).unwrap_or(0);
        env.storage().temporary().set(&key, &(current + amount));

        let touched_key = MockKey::Touched(locker.clone());
        let mut touched: Vec<Address> = env
            .storage()
            .temporary()
            .get(&touched_key)
            .unwrap_or(Vec::new(&env));
        if !touched.contains(currency) {
            touched.push_back(currency.clone());
            env.storage().temporary().set(&touched_key, &touched);
        }
    }
}
