//! Presentation view-models shared by every output surface.
//!
//! Nothing here computes analytics: it filters to the display range, aggregates
//! for display, and lays out chart series. Inputs are only ever borrowed.

pub mod aggregate;
pub mod chart;

pub use aggregate::*;
pub use chart::*;
