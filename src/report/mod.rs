//! Formatted terminal output (summaries and tables).

pub mod format;

pub use format::*;
