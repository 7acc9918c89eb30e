//! Truck registration rules.

pub mod error;
pub mod rules;
pub mod types;

pub use error::FleetError;
pub use rules::FleetRules;
pub use types::{Company, NewTruck, Truck, TruckUpdate};
