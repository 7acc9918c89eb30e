//! Entity re-exports.

pub use super::companies::Entity as Companies;
pub use super::expenses::Entity as Expenses;
pub use super::payments::Entity as Payments;
pub use super::trips::Entity as Trips;
pub use super::trucks::Entity as Trucks;
