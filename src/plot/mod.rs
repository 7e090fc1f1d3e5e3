//! Chart rendering backends.
//!
//! - ASCII grid for terminal reports (`ascii`)
//! - static SVG figures (`figure`)

pub mod ascii;
pub mod figure;

pub use ascii::*;
pub use figure::*;
