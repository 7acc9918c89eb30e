//! Trip ledger engine.
//!
//! This module implements the trip lifecycle state machine, the closing
//! validation rules and the orchestration service that applies them to a
//! record store and a bill object store.
//!
//! # Modules
//!
//! - `types` - Trip, expense and payment domain types
//! - `error` - Ledger error types and close rejection reasons
//! - `ledger` - Derived totals and the close fingerprint
//! - `lifecycle` - Pure transition and edit-guard rules
//! - `store` - `TripStore` and `BillStore` seams
//! - `service` - Orchestration over the stores

pub mod error;
pub mod ledger;
pub mod lifecycle;
pub mod service;
pub mod store;
pub mod types;

#[cfg(test)]
mod lifecycle_props;

pub use error::{CloseRejection, LedgerError};
pub use ledger::{LedgerFingerprint, LedgerTotals, TripLedger, revenue};
pub use lifecycle::LifecycleService;
pub use service::{DEFAULT_BILL_URL_TTL_SECS, TripLedgerService};
pub use store::{BillStore, TripStore};
pub use types::{
    BillUpload, ClosingSnapshot, Expense, ExpenseCategory, ExpenseChanges, NewExpense, NewPayment,
    NewTrip, Payment, PaymentMode, PaymentType, Trip, TripAction, TripStatus, normalize_note,
};
