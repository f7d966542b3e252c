//! Bid book and clearing tick estimation.
//!
//! Every bid spans exactly one tick spacing and is keyed by its lower tick.
//! A bitmap of 128-tick words marks the lower ticks that currently hold bid
//! liquidity. The estimate replays the settlement sale from the pool's live
//! price: it walks the marked ticks away from the price and stops at the
//! first one where the asset sold so far covers the supply.

use crate::accumulator::set_in_range;
use crate::storage::{get_tick_bitmap_word, get_tick_time, set_tick_bitmap_word, set_tick_time};
use launch_math::{align_tick_down, get_amount0_delta, get_amount1_delta, get_sqrt_ratio_at_tick};
use launch_types::{AuctionConfig, Slot0};
use soroban_sdk::Env;

/// Toggle the bitmap bit of an aligned tick
pub fn flip_tick(env: &Env, tick: i32, tick_spacing: i32) {
    if tick % tick_spacing != 0 {
        panic!("Tick not on spacing");
    }

    let compressed = tick / tick_spacing;
    let word_pos = compressed >> 7;
    let bit_pos = compressed.rem_euclid(128) as u32;

    let word = get_tick_bitmap_word(env, word_pos);
    set_tick_bitmap_word(env, word_pos, word ^ (1u128 << bit_pos));
}

/// Next marked tick within the word of `tick`: at or below it when `lte`,
/// strictly above it otherwise. Returns the word boundary when none is set.
pub fn next_initialized_tick_within_one_word(
    env: &Env,
    tick: i32,
    tick_spacing: i32,
    lte: bool,
) -> (i32, bool) {
    let compressed = tick.div_euclid(tick_spacing);

    if lte {
        let word_pos = compressed >> 7;
        let bit_pos = compressed.rem_euclid(128) as u32;
        let mask = if bit_pos == 127 {
            u128::MAX
        } else {
            (1u128 << (bit_pos + 1)) - 1
        };
        let masked = get_tick_bitmap_word(env, word_pos) & mask;

        if masked != 0 {
            let msb = 127 - masked.leading_zeros() as i32;
            ((word_pos * 128 + msb) * tick_spacing, true)
        } else {
            (word_pos * 128 * tick_spacing, false)
        }
    } else {
        let next = compressed + 1;
        let word_pos = next >> 7;
        let bit_pos = next.rem_euclid(128) as u32;
        let mask = !((1u128 << bit_pos) - 1);
        let masked = get_tick_bitmap_word(env, word_pos) & mask;

        if masked != 0 {
            let lsb = masked.trailing_zeros() as i32;
            ((word_pos * 128 + lsb) * tick_spacing, true)
        } else {
            ((word_pos * 128 + 127) * tick_spacing, false)
        }
    }
}

/// Asset `liquidity` takes in over one full tick
pub fn tick_capacity(
    env: &Env,
    tick: i32,
    tick_spacing: i32,
    liquidity: u128,
    is_token0: bool,
) -> u128 {
    let sqrt_lower = get_sqrt_ratio_at_tick(env, tick);
    let sqrt_upper = get_sqrt_ratio_at_tick(env, tick + tick_spacing);
    if is_token0 {
        get_amount0_delta(env, sqrt_lower, sqrt_upper, liquidity, false)
    } else {
        get_amount1_delta(env, sqrt_lower, sqrt_upper, liquidity, false)
    }
}

/// Asset a tick still takes in when a sale starts at `sqrt_price`.
/// The part the price already moved through is gone.
fn remaining_capacity(
    env: &Env,
    tick: i32,
    tick_spacing: i32,
    liquidity: u128,
    sqrt_price: u128,
    is_token0: bool,
) -> u128 {
    let sqrt_lower = get_sqrt_ratio_at_tick(env, tick);
    let sqrt_upper = get_sqrt_ratio_at_tick(env, tick + tick_spacing);
    if is_token0 {
        let top = sqrt_upper.min(sqrt_price);
        if top <= sqrt_lower {
            return 0;
        }
        get_amount0_delta(env, sqrt_lower, top, liquidity, false)
    } else {
        let bottom = sqrt_lower.max(sqrt_price);
        if bottom >= sqrt_upper {
            return 0;
        }
        get_amount1_delta(env, bottom, sqrt_upper, liquidity, false)
    }
}

/// Tick at which selling `supply` from the live price would stop, or the
/// limit tick when demand falls short. Token0 assets clear at the lower
/// bound of the absorbing tick, token1 assets at its upper bound.
pub fn estimate_clearing_tick(
    env: &Env,
    config: &AuctionConfig,
    is_token0: bool,
    slot0: &Slot0,
    supply: u128,
) -> i32 {
    let spacing = config.tick_spacing;
    let live = align_tick_down(slot0.tick, spacing);
    let mut absorbed: u128 = 0;

    if is_token0 {
        // Selling token0 moves the price down through the bids
        let mut cursor = live.min(config.start_tick - spacing);
        while cursor >= config.limit_tick {
            let (next, initialized) =
                next_initialized_tick_within_one_word(env, cursor, spacing, true);
            if next < config.limit_tick {
                break;
            }
            if initialized {
                let liquidity = tick_liquidity(env, next);
                absorbed = absorbed.saturating_add(remaining_capacity(
                    env,
                    next,
                    spacing,
                    liquidity,
                    slot0.sqrt_price_x96,
                    true,
                ));
                if absorbed >= supply {
                    return next;
                }
            }
            cursor = next - spacing;
        }
    } else {
        let last = config.limit_tick - spacing;
        let mut cursor = live.max(config.start_tick) - spacing;
        loop {
            let (next, initialized) =
                next_initialized_tick_within_one_word(env, cursor, spacing, false);
            if next > last {
                break;
            }
            if initialized {
                let liquidity = tick_liquidity(env, next);
                absorbed = absorbed.saturating_add(remaining_capacity(
                    env,
                    next,
                    spacing,
                    liquidity,
                    slot0.sqrt_price_x96,
                    false,
                ));
                if absorbed >= supply {
                    return next + spacing;
                }
            }
            cursor = next;
        }
    }

    config.limit_tick
}

/// Whether a bid with this lower tick is filled at `clearing_tick`.
/// The comparison is inclusive when the asset is token0 and strict otherwise.
pub fn is_in_range(tick_lower: i32, clearing_tick: i32, is_token0: bool) -> bool {
    if is_token0 {
        tick_lower >= clearing_tick
    } else {
        tick_lower < clearing_tick
    }
}

/// Move the in-range flags from `previous` to `clearing_tick`, reconciling
/// the ticks that flip at `now`. Only ticks filled at either clearing tick
/// are visited; everything past both was and stays out of range.
pub fn refresh_in_range(
    env: &Env,
    config: &AuctionConfig,
    is_token0: bool,
    previous: i32,
    clearing_tick: i32,
    now: u64,
) {
    let spacing = config.tick_spacing;
    let mut cursor = config.start_tick - spacing;

    if is_token0 {
        let floor = previous.min(clearing_tick);
        while cursor >= floor {
            let (next, initialized) =
                next_initialized_tick_within_one_word(env, cursor, spacing, true);
            if next < floor {
                break;
            }
            if initialized {
                flag_tick(env, next, clearing_tick, true, now);
            }
            cursor = next - spacing;
        }
    } else {
        let ceiling = previous.max(clearing_tick);
        loop {
            let (next, initialized) =
                next_initialized_tick_within_one_word(env, cursor, spacing, false);
            if next >= ceiling {
                break;
            }
            if initialized {
                flag_tick(env, next, clearing_tick, false, now);
            }
            cursor = next;
        }
    }
}

fn flag_tick(env: &Env, tick: i32, clearing_tick: i32, is_token0: bool, now: u64) {
    let Some(mut state) = get_tick_time(env, tick) else {
        return;
    };
    let in_range = is_in_range(tick, clearing_tick, is_token0);
    if state.in_range != in_range {
        set_in_range(env, &mut state, in_range, now);
        set_tick_time(env, tick, &state);
    }
}

fn tick_liquidity(env: &Env, tick: i32) -> u128 {
    get_tick_time(env, tick).map(|t| t.liquidity).unwrap_or(0)
}
