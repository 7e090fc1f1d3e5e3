//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - calendar months and monthly observations (`YearMonth`, `Observation`, `Series`)
//! - derived outputs (`CumulativeSeries`, `ForecastResult`)
//! - run configuration (`DashboardConfig`, `ForecastConfig`, `DisplayOptions`)

pub mod types;

pub use types::*;
