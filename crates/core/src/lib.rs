//! Core business logic for Logisco.
//!
//! This crate contains the trip ledger rules with ZERO web or database
//! dependencies. Persistence and object storage are reached through the
//! `TripStore` and `BillStore` traits.
//!
//! # Modules
//!
//! - `trip` - Trip lifecycle, derived totals and the closing engine
//! - `fleet` - Truck registration rules
//! - `storage` - Bill documents over Apache OpenDAL
//! - `dashboard` - Status strip and trip list rows

pub mod dashboard;
pub mod fleet;
pub mod storage;
pub mod trip;
