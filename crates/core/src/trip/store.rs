//! Persistence seams for the trip ledger.
//!
//! `TripStore` is implemented by the db crate, `BillStore` by
//! `crate::storage::StorageService`.

use std::future::Future;

use bytes::Bytes;
use logisco_shared::types::{ExpenseId, PaymentId, TripId, TruckId};
use rust_decimal::Decimal;

use crate::storage::StorageError;
use crate::trip::error::LedgerError;
use crate::trip::ledger::{LedgerFingerprint, TripLedger};
use crate::trip::types::{Expense, ExpenseChanges, Payment, Trip, TripAction};

/// Record store for trips, expenses and payments.
///
/// Every write re-reads the trip under a row lock in the same transaction
/// and fails with `LedgerError::TripClosed` if it is CLOSED, or
/// `LedgerError::NotFound` if it is gone.
pub trait TripStore: Send + Sync {
    /// Check if a truck exists.
    fn truck_exists(&self, truck_id: TruckId)
    -> impl Future<Output = Result<bool, LedgerError>> + Send;

    /// Find a trip by ID.
    fn find_trip(
        &self,
        trip_id: TripId,
    ) -> impl Future<Output = Result<Option<Trip>, LedgerError>> + Send;

    /// Load a trip with all of its expenses and payments.
    fn load_ledger(
        &self,
        trip_id: TripId,
    ) -> impl Future<Output = Result<Option<TripLedger>, LedgerError>> + Send;

    /// Insert a new trip.
    fn create_trip(&self, trip: Trip) -> impl Future<Output = Result<Trip, LedgerError>> + Send;

    /// Apply a status transition.
    ///
    /// Fails with `LedgerError::Conflict` if the trip is no longer in
    /// `action.expected_status()`, or if `fingerprint` is given and no
    /// longer matches the ledger as seen under the lock.
    fn apply_transition(
        &self,
        trip_id: TripId,
        action: TripAction,
        fingerprint: Option<LedgerFingerprint>,
    ) -> impl Future<Output = Result<Trip, LedgerError>> + Send;

    /// Set the measured quantity.
    fn set_actual_qty(
        &self,
        trip_id: TripId,
        qty: Decimal,
    ) -> impl Future<Output = Result<Trip, LedgerError>> + Send;

    /// Find an expense belonging to a trip.
    fn find_expense(
        &self,
        trip_id: TripId,
        expense_id: ExpenseId,
    ) -> impl Future<Output = Result<Option<Expense>, LedgerError>> + Send;

    /// Insert an expense.
    fn insert_expense(
        &self,
        expense: Expense,
    ) -> impl Future<Output = Result<Expense, LedgerError>> + Send;

    /// Edit category, amount or note of an expense.
    fn update_expense(
        &self,
        trip_id: TripId,
        expense_id: ExpenseId,
        changes: ExpenseChanges,
    ) -> impl Future<Output = Result<Expense, LedgerError>> + Send;

    /// Point an expense at a new bill, returning the updated expense and the
    /// reference it replaced.
    fn replace_expense_bill(
        &self,
        trip_id: TripId,
        expense_id: ExpenseId,
        bill_ref: String,
    ) -> impl Future<Output = Result<(Expense, Option<String>), LedgerError>> + Send;

    /// Delete an expense, returning the removed row.
    fn delete_expense(
        &self,
        trip_id: TripId,
        expense_id: ExpenseId,
    ) -> impl Future<Output = Result<Expense, LedgerError>> + Send;

    /// Insert a payment.
    fn insert_payment(
        &self,
        payment: Payment,
    ) -> impl Future<Output = Result<Payment, LedgerError>> + Send;

    /// Delete a payment, returning the removed row.
    fn delete_payment(
        &self,
        trip_id: TripId,
        payment_id: PaymentId,
    ) -> impl Future<Output = Result<Payment, LedgerError>> + Send;
}

/// Object store for bill documents.
pub trait BillStore: Send + Sync {
    /// Store a document under `key`, returning the reference to persist.
    fn upload(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> impl Future<Output = Result<String, StorageError>> + Send;

    /// Temporary read URL, or `None` if the provider cannot issue one.
    fn temporary_url(
        &self,
        reference: &str,
        ttl_secs: u64,
    ) -> impl Future<Output = Option<String>> + Send;

    /// Delete a stored document.
    fn remove(&self, reference: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}
