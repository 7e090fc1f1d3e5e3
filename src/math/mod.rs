//! Mathematical utilities: least squares and normal quantiles.

pub mod ols;
pub mod stats;

pub use ols::*;
pub use stats::*;
