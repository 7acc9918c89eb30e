//! Dashboard types.
//!
//! - Status strip (active trips, cash deployed)
//! - Trip list rows

pub mod types;

pub use types::*;
