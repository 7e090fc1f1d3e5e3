//! Input/output helpers.
//!
//! - local CSV/JSON ingest (`ingest`)
//! - table exports (CSV) (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
