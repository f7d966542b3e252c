//! Translation of issuer curves into concrete, aligned liquidity positions.
//!
//! Curves are written in asset-is-token0 orientation relative to a reference
//! tick. When the asset sorts as token1 every range is mirrored around zero
//! so the same curve describes the same asset prices.

use crate::error::LiquidityError;
use launch_math::{get_liquidity_for_amount0, get_liquidity_for_amount1, get_sqrt_ratio_at_tick, is_aligned};
use launch_types::{
    max_usable_tick, min_usable_tick, AdjustedCurves, Curve, Position, MAX_TICK_SPACING, WAD,
};
use soroban_fixed_point_math::FixedPoint;
use soroban_sdk::{Bytes, BytesN, Env, Vec};

/// Offset, orient and validate issuer curves for a pool
pub fn adjust_curves(
    env: &Env,
    curves: &Vec<Curve>,
    reference_tick: i32,
    tick_spacing: i32,
    is_token0: bool,
) -> Result<AdjustedCurves, LiquidityError> {
    if tick_spacing <= 0 || tick_spacing > MAX_TICK_SPACING {
        return Err(LiquidityError::InvalidTickSpacing);
    }
    if curves.is_empty() {
        return Err(LiquidityError::InvalidCurveCount);
    }

    let min_usable = min_usable_tick(tick_spacing);
    let max_usable = max_usable_tick(tick_spacing);

    let mut total_shares: i128 = 0;
    let mut adjusted: Vec<Curve> = Vec::new(env);

    for curve in curves.iter() {
        if curve.shares <= 0 {
            return Err(LiquidityError::InvalidShares);
        }
        total_shares = total_shares
            .checked_add(curve.shares)
            .ok_or(LiquidityError::ArithmeticOverflow)?;

        let lower = curve
            .tick_lower
            .checked_add(reference_tick)
            .ok_or(LiquidityError::InvalidTickRange)?;
        let upper = curve
            .tick_upper
            .checked_add(reference_tick)
            .ok_or(LiquidityError::InvalidTickRange)?;
        let (tick_lower, tick_upper) = if is_token0 { (lower, upper) } else { (-upper, -lower) };

        if !is_aligned(tick_lower, tick_spacing) || !is_aligned(tick_upper, tick_spacing) {
            return Err(LiquidityError::UnalignedTick);
        }
        if tick_lower >= tick_upper || tick_lower < min_usable || tick_upper > max_usable {
            return Err(LiquidityError::InvalidTickRange);
        }

        // Every position needs at least one spacing of width
        let spacings = ((tick_upper - tick_lower) / tick_spacing) as u32;
        if curve.num_positions == 0 || curve.num_positions > spacings {
            return Err(LiquidityError::InvalidCurveCount);
        }

        insert_sorted(
            &mut adjusted,
            Curve {
                tick_lower,
                tick_upper,
                num_positions: curve.num_positions,
                shares: curve.shares,
            },
        );
    }

    if total_shares != WAD {
        return Err(LiquidityError::InvalidShares);
    }

    for i in 1..adjusted.len() {
        let prev = adjusted.get_unchecked(i - 1);
        let next = adjusted.get_unchecked(i);
        if prev.tick_upper > next.tick_lower {
            return Err(LiquidityError::OverlappingCurves);
        }
    }

    let min_tick = adjusted.get_unchecked(0).tick_lower;
    let max_tick = adjusted
        .iter()
        .map(|c| c.tick_upper)
        .max()
        .unwrap_or(min_tick);

    Ok(AdjustedCurves {
        curves: adjusted,
        min_tick,
        max_tick,
    })
}

/// Split `total_amount` of the asset across the adjusted curves and build
/// the positions that hold it.
///
/// Every position of a curve ends at the curve's far bound; near bounds step
/// toward it so liquidity deepens as the price walks through the curve.
/// Liquidity is rounded down, so the amounts the pool asks for never exceed
/// `total_amount`. Positions too small to carry liquidity are skipped.
pub fn compute_positions(
    env: &Env,
    adjusted: &AdjustedCurves,
    total_amount: i128,
    tick_spacing: i32,
    is_token0: bool,
    salt: &BytesN<32>,
) -> Result<Vec<Position>, LiquidityError> {
    if total_amount <= 0 {
        return Err(LiquidityError::InvalidAmount);
    }

    let mut positions: Vec<Position> = Vec::new(env);
    let mut allocated: i128 = 0;
    let mut index: u32 = 0;
    let curve_count = adjusted.curves.len();

    for (i, curve) in adjusted.curves.iter().enumerate() {
        // Last curve takes the rounding remainder
        let curve_amount = if i as u32 == curve_count - 1 {
            total_amount - allocated
        } else {
            total_amount
                .fixed_mul_floor(curve.shares, WAD)
                .ok_or(LiquidityError::ArithmeticOverflow)?
        };
        allocated += curve_amount;

        let n = curve.num_positions as i128;
        let per_position = curve_amount / n;
        let spacings = (curve.tick_upper - curve.tick_lower) / tick_spacing;
        let step = (spacings / curve.num_positions as i32) * tick_spacing;

        for j in 0..curve.num_positions {
            let amount = if j == curve.num_positions - 1 {
                curve_amount - per_position * (n - 1)
            } else {
                per_position
            };

            let offset = j as i32 * step;
            let (tick_lower, tick_upper) = if is_token0 {
                (curve.tick_lower + offset, curve.tick_upper)
            } else {
                (curve.tick_lower, curve.tick_upper - offset)
            };

            let liquidity = single_sided_liquidity(env, tick_lower, tick_upper, amount, is_token0);
            let position_salt = derive_salt(env, salt, index);
            index += 1;

            if liquidity == 0 {
                continue;
            }
            positions.push_back(Position {
                tick_lower,
                tick_upper,
                liquidity,
                salt: position_salt,
            });
        }
    }

    Ok(positions)
}

/// Liquidity supplied by `amount` of the asset alone over the range
pub fn single_sided_liquidity(
    env: &Env,
    tick_lower: i32,
    tick_upper: i32,
    amount: i128,
    is_token0: bool,
) -> u128 {
    if amount <= 0 {
        return 0;
    }
    let sqrt_lower = get_sqrt_ratio_at_tick(env, tick_lower);
    let sqrt_upper = get_sqrt_ratio_at_tick(env, tick_upper);
    if is_token0 {
        get_liquidity_for_amount0(env, sqrt_lower, sqrt_upper, amount as u128)
    } else {
        get_liquidity_for_amount1(env, sqrt_lower, sqrt_upper, amount as u128)
    }
}

/// sha256(salt || index)
pub fn derive_salt(env: &Env, salt: &BytesN<32>, index: u32) -> BytesN<32> {
    let mut data = Bytes::from_array(env, &salt.to_array());
    data.extend_from_array(&index.to_be_bytes());
    env.crypto().sha256(&data).to_bytes()
}

fn insert_sorted(curves: &mut Vec<Curve>, curve: Curve) {
    let mut at = curves.len();
    for (i, existing) in curves.iter().enumerate() {
        if curve.tick_lower < existing.tick_lower {
            at = i as u32;
            break;
        }
    }
    curves.insert(at, curve);
}
