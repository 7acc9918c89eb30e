//! Trip ledger orchestration.
//!
//! `TripLedgerService` validates input, re-reads the latest persisted trip,
//! runs the lifecycle rules and hands the result to the store. Bill uploads
//! are paired with their expense writes: if one side fails the other is
//! undone.

use std::sync::Arc;

use chrono::Utc;
use logisco_shared::types::{ExpenseId, PaymentId, TripId};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::storage::bill_key;
use crate::trip::error::LedgerError;
use crate::trip::ledger::{LedgerTotals, TripLedger};
use crate::trip::lifecycle::LifecycleService;
use crate::trip::store::{BillStore, TripStore};
use crate::trip::types::{
    BillUpload, Expense, ExpenseChanges, NewExpense, NewPayment, NewTrip, Payment, Trip,
    TripStatus, normalize_note,
};

/// Default lifetime of a temporary bill URL: 10 minutes.
pub const DEFAULT_BILL_URL_TTL_SECS: u64 = 600;

/// Request-scoped trip ledger service.
pub struct TripLedgerService<S: TripStore, B: BillStore> {
    store: Arc<S>,
    bills: Arc<B>,
    bill_url_ttl_secs: u64,
}

impl<S: TripStore, B: BillStore> TripLedgerService<S, B> {
    /// Create a new trip ledger service.
    #[must_use]
    pub fn new(store: Arc<S>, bills: Arc<B>) -> Self {
        Self {
            store,
            bills,
            bill_url_ttl_secs: DEFAULT_BILL_URL_TTL_SECS,
        }
    }

    /// Set the temporary bill URL lifetime.
    #[must_use]
    pub fn with_bill_url_ttl(mut self, secs: u64) -> Self {
        self.bill_url_ttl_secs = secs;
        self
    }

    /// Plan a new trip.
    ///
    /// # Errors
    ///
    /// - `MissingField` if source or destination is blank
    /// - `InvalidQuantity` / `InvalidAmount` for non-positive estimates or rates
    /// - `NotFound` if the truck does not exist
    pub async fn create_trip(&self, input: NewTrip) -> Result<Trip, LedgerError> {
        let source = input.source.trim();
        if source.is_empty() {
            return Err(LedgerError::MissingField("source"));
        }
        let destination = input.destination.trim();
        if destination.is_empty() {
            return Err(LedgerError::MissingField("destination"));
        }
        let estimated_qty = input
            .estimated_qty
            .map(LifecycleService::validate_quantity)
            .transpose()?;
        let rate_per_unit = input
            .rate_per_unit
            .map(LifecycleService::validate_amount)
            .transpose()?;

        if !self.store.truck_exists(input.truck_id).await? {
            return Err(LedgerError::not_found("truck", input.truck_id));
        }

        let trip = Trip {
            id: TripId::new(),
            truck_id: input.truck_id,
            source: source.to_string(),
            destination: destination.to_string(),
            status: TripStatus::Planned,
            estimated_qty,
            actual_qty: None,
            rate_per_unit,
            start_date: None,
            end_date: None,
            closing: None,
            created_at: Utc::now(),
        };

        let trip = self.store.create_trip(trip).await?;
        info!(trip_id = %trip.id, truck_id = %trip.truck_id, "Trip planned");
        Ok(trip)
    }

    /// Load a trip with its expenses and payments.
    pub async fn ledger(&self, trip_id: TripId) -> Result<TripLedger, LedgerError> {
        self.store
            .load_ledger(trip_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("trip", trip_id))
    }

    /// Live totals for a trip.
    pub async fn totals(&self, trip_id: TripId) -> Result<LedgerTotals, LedgerError> {
        Ok(self.ledger(trip_id).await?.totals())
    }

    /// PLANNED → ACTIVE.
    pub async fn start_trip(&self, trip_id: TripId) -> Result<Trip, LedgerError> {
        let trip = self.fetch_trip(trip_id).await?;
        let action = LifecycleService::start(&trip)?;
        let trip = self.store.apply_transition(trip_id, action, None).await?;
        info!(trip_id = %trip_id, "Trip started");
        Ok(trip)
    }

    /// ACTIVE → CLOSED, freezing revenue, expenses and balance.
    ///
    /// The ledger fingerprint taken here is re-checked by the store under
    /// the trip lock, so a close never commits against figures other than
    /// the ones it validated.
    pub async fn close_trip(&self, trip_id: TripId, closed_by: &str) -> Result<Trip, LedgerError> {
        if closed_by.trim().is_empty() {
            return Err(LedgerError::ActorRequired);
        }

        let ledger = self.ledger(trip_id).await?;
        let action = LifecycleService::close(&ledger, closed_by).inspect_err(|e| {
            if let Some(reason) = e.reason() {
                info!(trip_id = %trip_id, reason, "Trip close rejected");
            }
        })?;

        let trip = self
            .store
            .apply_transition(trip_id, action, Some(ledger.fingerprint()))
            .await?;

        if let Some(closing) = &trip.closing {
            info!(
                trip_id = %trip_id,
                final_balance = %closing.final_balance,
                closed_by = %closing.closed_by,
                "Trip closed"
            );
        }
        Ok(trip)
    }

    /// Record the measured quantity.
    pub async fn update_actual_qty(&self, trip_id: TripId, qty: Decimal) -> Result<Trip, LedgerError> {
        LifecycleService::validate_quantity(qty)?;
        self.fetch_editable_trip(trip_id).await?;
        self.store.set_actual_qty(trip_id, qty).await
    }

    /// Record an expense, uploading its bill first if one is attached.
    ///
    /// A failed upload writes nothing. A failed expense write removes the
    /// uploaded bill.
    pub async fn add_expense(&self, trip_id: TripId, input: NewExpense) -> Result<Expense, LedgerError> {
        let amount = LifecycleService::validate_amount(input.amount)?;
        self.fetch_editable_trip(trip_id).await?;

        let bill_ref = match input.bill {
            Some(bill) => Some(self.upload_bill(trip_id, bill).await?),
            None => None,
        };

        let expense = Expense {
            id: ExpenseId::new(),
            trip_id,
            category: input.category,
            amount,
            expense_date: Utc::now(),
            note: normalize_note(input.note),
            bill_ref: bill_ref.clone(),
        };

        match self.store.insert_expense(expense).await {
            Ok(expense) => {
                info!(
                    trip_id = %trip_id,
                    expense_id = %expense.id,
                    category = %expense.category,
                    amount = %expense.amount,
                    "Expense recorded"
                );
                Ok(expense)
            }
            Err(e) => {
                if let Some(reference) = bill_ref {
                    self.discard_bill(&reference).await;
                }
                Err(e)
            }
        }
    }

    /// Edit an expense's category, amount or note.
    pub async fn update_expense(
        &self,
        trip_id: TripId,
        expense_id: ExpenseId,
        changes: ExpenseChanges,
    ) -> Result<Expense, LedgerError> {
        if let Some(amount) = changes.amount {
            LifecycleService::validate_amount(amount)?;
        }
        self.fetch_editable_trip(trip_id).await?;
        self.store.update_expense(trip_id, expense_id, changes).await
    }

    /// Attach a new bill to an expense and remove the one it replaces.
    pub async fn replace_expense_bill(
        &self,
        trip_id: TripId,
        expense_id: ExpenseId,
        bill: BillUpload,
    ) -> Result<Expense, LedgerError> {
        self.fetch_editable_trip(trip_id).await?;
        if self.store.find_expense(trip_id, expense_id).await?.is_none() {
            return Err(LedgerError::not_found("expense", expense_id));
        }

        let reference = self.upload_bill(trip_id, bill).await?;
        match self
            .store
            .replace_expense_bill(trip_id, expense_id, reference.clone())
            .await
        {
            Ok((expense, previous)) => {
                if let Some(previous) = previous {
                    self.discard_bill(&previous).await;
                }
                info!(trip_id = %trip_id, expense_id = %expense_id, "Expense bill replaced");
                Ok(expense)
            }
            Err(e) => {
                self.discard_bill(&reference).await;
                Err(e)
            }
        }
    }

    /// Delete an expense and its bill.
    pub async fn delete_expense(&self, trip_id: TripId, expense_id: ExpenseId) -> Result<(), LedgerError> {
        self.fetch_editable_trip(trip_id).await?;
        let removed = self.store.delete_expense(trip_id, expense_id).await?;
        if let Some(reference) = removed.bill_ref {
            self.discard_bill(&reference).await;
        }
        info!(trip_id = %trip_id, expense_id = %expense_id, "Expense deleted");
        Ok(())
    }

    /// Record a payment received against a trip.
    pub async fn add_payment(&self, trip_id: TripId, input: NewPayment) -> Result<Payment, LedgerError> {
        let amount = LifecycleService::validate_amount(input.amount)?;
        self.fetch_editable_trip(trip_id).await?;

        let payment = Payment {
            id: PaymentId::new(),
            trip_id,
            amount,
            payment_type: input.payment_type,
            mode: input.mode,
            payment_date: Utc::now(),
            note: normalize_note(input.note),
        };

        let payment = self.store.insert_payment(payment).await?;
        info!(
            trip_id = %trip_id,
            payment_id = %payment.id,
            amount = %payment.amount,
            "Payment recorded"
        );
        Ok(payment)
    }

    /// Delete a payment.
    pub async fn delete_payment(&self, trip_id: TripId, payment_id: PaymentId) -> Result<(), LedgerError> {
        self.fetch_editable_trip(trip_id).await?;
        self.store.delete_payment(trip_id, payment_id).await?;
        info!(trip_id = %trip_id, payment_id = %payment_id, "Payment deleted");
        Ok(())
    }

    /// Temporary URL for an expense's bill.
    ///
    /// `Ok(None)` means the bill exists but the provider cannot presign.
    pub async fn bill_url(
        &self,
        trip_id: TripId,
        expense_id: ExpenseId,
    ) -> Result<Option<String>, LedgerError> {
        let expense = self
            .store
            .find_expense(trip_id, expense_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("expense", expense_id))?;
        let reference = expense
            .bill_ref
            .ok_or_else(|| LedgerError::not_found("bill", expense_id))?;
        Ok(self
            .bills
            .temporary_url(&reference, self.bill_url_ttl_secs)
            .await)
    }

    /// Temporary URL for an already loaded expense, if it has a bill.
    pub async fn expense_bill_url(&self, expense: &Expense) -> Option<String> {
        match &expense.bill_ref {
            Some(reference) => self.bills.temporary_url(reference, self.bill_url_ttl_secs).await,
            None => None,
        }
    }

    async fn fetch_trip(&self, trip_id: TripId) -> Result<Trip, LedgerError> {
        self.store
            .find_trip(trip_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("trip", trip_id))
    }

    async fn fetch_editable_trip(&self, trip_id: TripId) -> Result<Trip, LedgerError> {
        let trip = self.fetch_trip(trip_id).await?;
        LifecycleService::ensure_editable(&trip)?;
        Ok(trip)
    }

    async fn upload_bill(&self, trip_id: TripId, bill: BillUpload) -> Result<String, LedgerError> {
        let key = bill_key(trip_id, &bill.filename);
        self.bills
            .upload(&key, bill.bytes, &bill.content_type)
            .await
            .map_err(|e| {
                warn!(trip_id = %trip_id, key = %key, error = %e, "Bill upload failed");
                if e.is_rejected_bill() {
                    LedgerError::InvalidBill(e.to_string())
                } else {
                    LedgerError::UploadFailed(e.to_string())
                }
            })
    }

    async fn discard_bill(&self, reference: &str) {
        if let Err(e) = self.bills.remove(reference).await {
            warn!(reference = %reference, error = %e, "Failed to remove bill object");
        }
    }
}
