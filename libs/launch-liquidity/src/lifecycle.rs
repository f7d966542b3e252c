//! Atomic mint, burn, fee collection and sales against the pool manager.
//!
//! A request opens an unlock session, applies one `modify_liquidity` per
//! position inside it, then settles the net delta of each currency exactly
//! once before locking again. The pool manager refuses to lock while any
//! delta is outstanding, so a request either moves every position and every
//! token or none of them.

use crate::error::LiquidityError;
use crate::pool_manager;
use launch_types::{BalanceDelta, ModifyLiquidityParams, PoolKey, Position, SwapParams};
use soroban_sdk::{contracttype, token, Address, Env, Vec};

pub const MINT: u32 = 1;
pub const BURN: u32 = 2;
pub const COLLECT: u32 = 3;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Action {
    Mint,
    Burn,
    Collect,
}

impl Action {
    pub fn from_code(code: u32) -> Result<Self, LiquidityError> {
        match code {
            MINT => Ok(Action::Mint),
            BURN => Ok(Action::Burn),
            COLLECT => Ok(Action::Collect),
            _ => Err(LiquidityError::UnknownAction),
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            Action::Mint => MINT,
            Action::Burn => BURN,
            Action::Collect => COLLECT,
        }
    }

    /// Signed liquidity change the action applies to a position
    fn liquidity_delta(&self, liquidity: u128) -> Result<i128, LiquidityError> {
        let amount = i128::try_from(liquidity).map_err(|_| LiquidityError::ArithmeticOverflow)?;
        Ok(match self {
            Action::Mint => amount,
            Action::Burn => -amount,
            Action::Collect => 0,
        })
    }
}

/// Request carried through an unlock session
#[contracttype]
#[derive(Clone, Debug)]
pub struct CallbackData {
    pub pool_key: PoolKey,
    /// Positions to act on; for BURN the liquidity to remove from each
    pub positions: Vec<Position>,
    /// MINT, BURN or COLLECT
    pub action: u32,
    /// Pays negative deltas
    pub payer: Address,
    /// Receives positive deltas
    pub recipient: Address,
}

/// Outcome of a settled request, from the venue's point of view
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ModifyResult {
    /// Net amounts settled, fees included
    pub delta: BalanceDelta,
    /// Fees included in `delta`
    pub fees: BalanceDelta,
    /// Caller delta of each position, in request order
    pub position_deltas: Vec<BalanceDelta>,
}

/// Deltas pending inside one unlock session
pub struct UnlockContext<'a> {
    env: &'a Env,
    pool_manager: Address,
    locker: Address,
    pool_key: PoolKey,
    delta: BalanceDelta,
    fees: BalanceDelta,
    position_deltas: Vec<BalanceDelta>,
}

impl<'a> UnlockContext<'a> {
    pub fn new(env: &'a Env, pool_manager: Address, locker: Address, pool_key: PoolKey) -> Self {
        Self {
            env,
            pool_manager,
            locker,
            pool_key,
            delta: BalanceDelta::zero(),
            fees: BalanceDelta::zero(),
            position_deltas: Vec::new(env),
        }
    }

    /// Apply `action` to one position and record its delta
    pub fn modify(&mut self, position: &Position, action: Action) -> Result<(), LiquidityError> {
        let params = ModifyLiquidityParams {
            tick_lower: position.tick_lower,
            tick_upper: position.tick_upper,
            liquidity_delta: action.liquidity_delta(position.liquidity)?,
            salt: position.salt.clone(),
        };
        let (caller_delta, fees) = pool_manager::modify_liquidity(
            self.env,
            &self.pool_manager,
            &self.locker,
            &self.pool_key,
            params,
        );

        self.delta = checked_sum(&self.delta, &caller_delta)?;
        self.fees = checked_sum(&self.fees, &fees)?;
        self.position_deltas.push_back(caller_delta);
        Ok(())
    }

    /// Sell through the pool and record the swap delta
    pub fn swap(&mut self, params: SwapParams) -> Result<BalanceDelta, LiquidityError> {
        if params.amount_in <= 0 {
            return Err(LiquidityError::InvalidAmount);
        }
        let swap_delta = pool_manager::swap(
            self.env,
            &self.pool_manager,
            &self.locker,
            &self.pool_key,
            params,
        );
        self.delta = checked_sum(&self.delta, &swap_delta)?;
        Ok(swap_delta)
    }

    /// Settle each currency's net delta once
    pub fn settle(self, payer: &Address, recipient: &Address) -> ModifyResult {
        self.settle_currency(&self.pool_key.currency0, self.delta.amount0, payer, recipient);
        self.settle_currency(&self.pool_key.currency1, self.delta.amount1, payer, recipient);
        ModifyResult {
            delta: self.delta,
            fees: self.fees,
            position_deltas: self.position_deltas,
        }
    }

    fn settle_currency(&self, currency: &Address, amount: i128, payer: &Address, recipient: &Address) {
        if amount < 0 {
            pool_manager::sync(self.env, &self.pool_manager, currency);
            token::Client::new(self.env, currency).transfer(payer, &self.pool_manager, &(-amount));
            pool_manager::settle(self.env, &self.pool_manager, &self.locker);
        } else if amount > 0 {
            pool_manager::take(
                self.env,
                &self.pool_manager,
                &self.locker,
                currency,
                recipient,
                amount,
            );
        }
    }
}

/// Run a request against the pool manager on behalf of the current contract
pub fn execute(
    env: &Env,
    pool_manager: &Address,
    data: CallbackData,
) -> Result<ModifyResult, LiquidityError> {
    let locker = env.current_contract_address();
    pool_manager::unlock(env, pool_manager, &locker);
    let result = handle_unlocked(env, pool_manager, &data)?;
    pool_manager::lock(env, pool_manager, &locker);
    Ok(result)
}

/// Sell `params.amount_in` in one session. The payer funds the input side
/// and the recipient takes the output; unsold input never leaves the payer.
pub fn execute_swap(
    env: &Env,
    pool_manager: &Address,
    pool_key: PoolKey,
    params: SwapParams,
    payer: &Address,
    recipient: &Address,
) -> Result<BalanceDelta, LiquidityError> {
    let locker = env.current_contract_address();
    pool_manager::unlock(env, pool_manager, &locker);
    let mut ctx = UnlockContext::new(env, pool_manager.clone(), locker.clone(), pool_key);
    ctx.swap(params)?;
    let result = ctx.settle(payer, recipient);
    pool_manager::lock(env, pool_manager, &locker);
    Ok(result.delta)
}

/// Completion half of the session: only valid while the pool manager holds
/// an open session for this contract
pub fn handle_unlocked(
    env: &Env,
    pool_manager: &Address,
    data: &CallbackData,
) -> Result<ModifyResult, LiquidityError> {
    let locker = env.current_contract_address();
    if !pool_manager::is_unlocked(env, pool_manager, &locker) {
        return Err(LiquidityError::OnlyPoolManager);
    }
    let action = Action::from_code(data.action)?;

    let mut ctx = UnlockContext::new(env, pool_manager.clone(), locker, data.pool_key.clone());
    for position in data.positions.iter() {
        ctx.modify(&position, action)?;
    }
    Ok(ctx.settle(&data.payer, &data.recipient))
}

fn checked_sum(a: &BalanceDelta, b: &BalanceDelta) -> Result<BalanceDelta, LiquidityError> {
    Ok(BalanceDelta::new(
        a.amount0
            .checked_add(b.amount0)
            .ok_or(LiquidityError::ArithmeticOverflow)?,
        a.amount1
            .checked_add(b.amount1)
            .ok_or(LiquidityError::ArithmeticOverflow)?,
    ))
}
