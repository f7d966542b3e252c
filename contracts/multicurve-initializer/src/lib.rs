#![no_std]

mod error;
mod storage;

pub use error::InitializerError;

use launch_liquidity::{
    adjust_curves, compute_positions, execute, pool_manager, CallbackData, BURN, COLLECT, MINT,
};
use launch_math::get_sqrt_ratio_at_tick;
use launch_types::{
    sort_currencies, BeneficiaryShare, ExitResult, InitData, PoolKey, PoolState, PoolStatus, WAD,
};
use soroban_fixed_point_math::FixedPoint;
use soroban_sdk::{contract, contractimpl, log, token, Address, BytesN, Env, Symbol, Vec};
use storage::MAX_POSITIONS;

#[contract]
pub struct MulticurveInitializer;

#[contractimpl]
impl MulticurveInitializer {
    pub fn __constructor(env: Env, admin: Address, pool_manager: Address) {
        storage::set_admin(&env, &admin);
        storage::set_pool_manager(&env, &pool_manager);
        storage::extend_instance_ttl(&env);
    }

    /// Create the asset's pool and seed it with the issuer's curves.
    ///
    /// Pulls `total_amount` of the asset from the admin and mints every
    /// position in one pool-manager session. Rounding dust goes back to the
    /// admin. Supplying beneficiaries locks the liquidity permanently.
    pub fn initialize(
        env: Env,
        asset: Address,
        numeraire: Address,
        total_amount: i128,
        salt: BytesN<32>,
        init_data: InitData,
    ) -> Result<PoolKey, InitializerError> {
        let admin = storage::get_admin(&env);
        admin.require_auth();

        if storage::has_pool(&env, &asset) {
            return Err(InitializerError::AlreadyInitialized);
        }
        if asset == numeraire {
            return Err(InitializerError::InvalidCurrencies);
        }
        if total_amount <= 0 {
            return Err(InitializerError::InvalidAmount);
        }
        let locked = !init_data.beneficiaries.is_empty();
        if locked {
            validate_beneficiaries(&init_data.beneficiaries)?;
        }

        let is_token0 = asset < numeraire;
        let adjusted = adjust_curves(
            &env,
            &init_data.curves,
            init_data.reference_tick,
            init_data.tick_spacing,
            is_token0,
        )?;
        let positions = compute_positions(
            &env,
            &adjusted,
            total_amount,
            init_data.tick_spacing,
            is_token0,
            &salt,
        )?;
        if positions.is_empty() || positions.len() > MAX_POSITIONS {
            return Err(InitializerError::InvalidCurveCount);
        }

        let (currency0, currency1) = sort_currencies(asset.clone(), numeraire.clone());
        let pool_key = PoolKey {
            currency0,
            currency1,
            fee: init_data.fee,
            tick_spacing: init_data.tick_spacing,
        };
        let pool_manager = storage::get_pool_manager(&env);
        let this = env.current_contract_address();
        let asset_token = token::Client::new(&env, &asset);

        asset_token.transfer(&admin, &this, &total_amount);

        let start_tick = adjusted.start_tick(is_token0);
        pool_manager::initialize(
            &env,
            &pool_manager,
            &pool_key,
            get_sqrt_ratio_at_tick(&env, start_tick),
        );

        let minted = execute(
            &env,
            &pool_manager,
            CallbackData {
                pool_key: pool_key.clone(),
                positions: positions.clone(),
                action: MINT,
                payer: this.clone(),
                recipient: this.clone(),
            },
        )?;

        let paid = if is_token0 {
            -minted.delta.amount0
        } else {
            -minted.delta.amount1
        };
        let dust = total_amount - paid;
        if dust > 0 {
            asset_token.transfer(&this, &admin, &dust);
        }
        log!(&env, "seeded positions", positions.len(), paid, dust);

        let status = advance(
            PoolStatus::Uninitialized,
            if locked {
                PoolStatus::Locked
            } else {
                PoolStatus::Initialized
            },
        )?;
        let state = PoolState {
            asset: asset.clone(),
            numeraire,
            is_token0,
            pool_key: pool_key.clone(),
            beneficiaries: init_data.beneficiaries,
            positions,
            status,
            far_tick: adjusted.far_tick(is_token0),
            total_amount: paid,
        };
        storage::set_pool(&env, &asset, &state);

        env.events().publish(
            (Symbol::new(&env, "pool_initialized"), asset),
            (start_tick, state.far_tick, paid, status as u32),
        );

        Ok(pool_key)
    }

    /// Burn every seeded position and send the proceeds to the admin.
    /// Only once the pool price has moved past the far tick.
    pub fn exit_liquidity(env: Env, asset: Address) -> Result<ExitResult, InitializerError> {
        let admin = storage::get_admin(&env);
        admin.require_auth();

        let mut state = storage::get_pool(&env, &asset).ok_or(InitializerError::PoolNotInitialized)?;
        let exited = advance(state.status, PoolStatus::Exited)?;

        let pool_manager = storage::get_pool_manager(&env);
        let slot0 = pool_manager::get_slot0(&env, &pool_manager, &state.pool_key);
        let crossed = if state.is_token0 {
            slot0.tick >= state.far_tick
        } else {
            slot0.tick <= state.far_tick
        };
        if !crossed {
            return Err(InitializerError::InsufficientTick);
        }

        let burned = execute(
            &env,
            &pool_manager,
            CallbackData {
                pool_key: state.pool_key.clone(),
                positions: state.positions.clone(),
                action: BURN,
                payer: env.current_contract_address(),
                recipient: admin,
            },
        )?;

        state.status = exited;
        storage::set_pool(&env, &asset, &state);

        let result = ExitResult {
            sqrt_price_x96: slot0.sqrt_price_x96,
            currency0: state.pool_key.currency0.clone(),
            currency1: state.pool_key.currency1.clone(),
            amount0: burned.delta.amount0,
            amount1: burned.delta.amount1,
            fees0: burned.fees.amount0,
            fees1: burned.fees.amount1,
        };

        env.events().publish(
            (Symbol::new(&env, "liquidity_exited"), asset),
            (slot0.tick, result.amount0, result.amount1),
        );

        Ok(result)
    }

    /// Collect fees of a locked pool and split them across its beneficiaries
    pub fn collect_fees(env: Env, asset: Address) -> Result<(i128, i128), InitializerError> {
        let state = storage::get_pool(&env, &asset).ok_or(InitializerError::PoolNotInitialized)?;
        if state.status != PoolStatus::Locked {
            return Err(InitializerError::PoolNotLocked);
        }

        let this = env.current_contract_address();
        let collected = execute(
            &env,
            &storage::get_pool_manager(&env),
            CallbackData {
                pool_key: state.pool_key.clone(),
                positions: state.positions.clone(),
                action: COLLECT,
                payer: this.clone(),
                recipient: this.clone(),
            },
        )?;

        let fees0 = collected.delta.amount0;
        let fees1 = collected.delta.amount1;
        distribute(&env, &state.pool_key.currency0, fees0, &state.beneficiaries)?;
        distribute(&env, &state.pool_key.currency1, fees1, &state.beneficiaries)?;

        env.events().publish(
            (Symbol::new(&env, "fees_collected"), asset),
            (fees0, fees1),
        );

        Ok((fees0, fees1))
    }

    // === View Functions ===

    pub fn get_state(env: Env, asset: Address) -> Option<PoolState> {
        storage::get_pool(&env, &asset)
    }

    pub fn get_status(env: Env, asset: Address) -> PoolStatus {
        storage::get_pool(&env, &asset)
            .map(|state| state.status)
            .unwrap_or(PoolStatus::Uninitialized)
    }

    pub fn get_admin(env: Env) -> Address {
        storage::get_admin(&env)
    }

    pub fn get_pool_manager(env: Env) -> Address {
        storage::get_pool_manager(&env)
    }
}

/// Next status if the lifecycle allows the step from `current`
fn advance(current: PoolStatus, next: PoolStatus) -> Result<PoolStatus, InitializerError> {
    if !current.can_transition_to(next) {
        return Err(match current {
            PoolStatus::Uninitialized => InitializerError::PoolNotInitialized,
            PoolStatus::Initialized => InitializerError::AlreadyInitialized,
            PoolStatus::Locked => InitializerError::PoolLocked,
            PoolStatus::Exited => InitializerError::AlreadyExited,
        });
    }
    Ok(next)
}

fn validate_beneficiaries(beneficiaries: &Vec<BeneficiaryShare>) -> Result<(), InitializerError> {
    let mut total: i128 = 0;
    for share in beneficiaries.iter() {
        if share.shares <= 0 {
            return Err(InitializerError::InvalidBeneficiaries);
        }
        total = total
            .checked_add(share.shares)
            .ok_or(InitializerError::InvalidBeneficiaries)?;
    }
    if total != WAD {
        return Err(InitializerError::InvalidBeneficiaries);
    }
    Ok(())
}

/// Pay `amount` of `currency` out by share; the first beneficiary gets the remainder
fn distribute(
    env: &Env,
    currency: &Address,
    amount: i128,
    beneficiaries: &Vec<BeneficiaryShare>,
) -> Result<(), InitializerError> {
    if amount <= 0 {
        return Ok(());
    }
    let client = token::Client::new(env, currency);
    let this = env.current_contract_address();

    let mut paid: i128 = 0;
    for (i, share) in beneficiaries.iter().enumerate() {
        if i == 0 {
            continue;
        }
        let cut = amount
            .fixed_mul_floor(share.shares, WAD)
            .ok_or(InitializerError::ArithmeticOverflow)?;
        if cut > 0 {
            client.transfer(&this, &share.beneficiary, &cut);
            paid += cut;
        }
    }

    let first = beneficiaries
        .first()
        .ok_or(InitializerError::InvalidBeneficiaries)?;
    let remainder = amount - paid;
    if remainder > 0 {
        client.transfer(&this, &first.beneficiary, &remainder);
    }
    Ok(())
}
