use soroban_sdk::{contracttype, Vec};

/// Issuer supplied share of liquidity over a price range
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Curve {
    /// Lower tick boundary, relative to the reference tick
    pub tick_lower: i32,
    /// Upper tick boundary, relative to the reference tick
    pub tick_upper: i32,
    /// Number of positions the curve is split into
    pub num_positions: u32,
    /// Share of the total amount in WAD
    pub shares: i128,
}

/// Curves after alignment and orientation for a concrete pool
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AdjustedCurves {
    /// Sorted by lower tick, pairwise disjoint
    pub curves: Vec<Curve>,
    /// Lowest tick covered by any curve
    pub min_tick: i32,
    /// Highest tick covered by any curve
    pub max_tick: i32,
}

impl AdjustedCurves {
    /// Tick the pool starts at, on the near side of every curve
    pub fn start_tick(&self, is_token0: bool) -> i32 {
        if is_token0 {
            self.min_tick
        } else {
            self.max_tick
        }
    }

    /// Tick the price must cross before every curve has been walked
    pub fn far_tick(&self, is_token0: bool) -> i32 {
        if is_token0 {
            self.max_tick
        } else {
            self.min_tick
        }
    }
}
