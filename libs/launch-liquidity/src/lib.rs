#![no_std]

pub mod curve_adjuster;
pub mod error;
pub mod lifecycle;
pub mod pool_manager;

#[cfg(any(test, feature = "testutils"))]
pub mod testutils;

pub use curve_adjuster::*;
pub use error::LiquidityError;
pub use lifecycle::*;
