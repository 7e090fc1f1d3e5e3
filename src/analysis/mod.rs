//! Derived metrics over a cleaned series.
//!
//! - windowing (`window`)
//! - chain-linked compounding (`cumulative`)
//! - headline indicators (`kpis`)

pub mod cumulative;
pub mod kpis;
pub mod window;

pub use cumulative::*;
pub use kpis::*;
pub use window::*;
