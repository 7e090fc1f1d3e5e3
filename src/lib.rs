//! `ipca-dashboard` library crate.
//!
//! The binary (`ipca`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the pipeline stages (fetch, clean, window, compound, forecast, present)
//!   are reusable on their own

pub mod analysis;
pub mod app;
pub mod clean;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod forecast;
pub mod io;
pub mod math;
pub mod plot;
pub mod present;
pub mod report;
pub mod tui;
