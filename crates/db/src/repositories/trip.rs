//! Trip repository, the Postgres implementation of `TripStore`.
//!
//! Every write runs in one transaction that first locks the trip row with
//! `SELECT ... FOR UPDATE`. Writes to one trip are therefore serialized, and
//! the status read under the lock is the one the write is checked against.

use chrono::Utc;
use logisco_core::dashboard::TripSummary;
use logisco_core::trip::{
    ClosingSnapshot, Expense, ExpenseCategory, ExpenseChanges, LedgerError, LedgerFingerprint,
    LifecycleService, Payment, PaymentMode, PaymentType, Trip, TripAction, TripLedger, TripStatus,
    TripStore,
};
use logisco_shared::types::{ExpenseId, PageRequest, PaymentId, TripId, TruckId};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use crate::entities::{expenses, payments, sea_orm_active_enums as db_enums, trips, trucks};

/// Trip, expense and payment persistence.
#[derive(Debug, Clone)]
pub struct TripRepository {
    db: DatabaseConnection,
}

impl TripRepository {
    /// Creates a new trip repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Trip list rows, newest first, optionally filtered by status.
    ///
    /// Returns the page and the total number of matching trips.
    pub async fn list_summaries(
        &self,
        status: Option<TripStatus>,
        page: &PageRequest,
    ) -> Result<(Vec<TripSummary>, u64), DbErr> {
        let mut query = trips::Entity::find();
        if let Some(status) = status {
            query = query.filter(trips::Column::Status.eq(status_to_db(status)));
        }

        let total = query.clone().count(&self.db).await?;
        let rows = query
            .find_also_related(trucks::Entity)
            .order_by_desc(trips::Column::CreatedAt)
            .order_by_desc(trips::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        let summaries = rows
            .into_iter()
            .map(|(trip, truck)| {
                TripSummary::new(
                    TripId::from_uuid(trip.id),
                    truck.map(|t| t.number_plate).unwrap_or_default(),
                    trip.source,
                    trip.destination,
                    status_to_core(trip.status),
                    trip.start_date.map(|d| d.with_timezone(&Utc)),
                    trip.final_balance,
                )
            })
            .collect();

        Ok((summaries, total))
    }

    /// Locks the trip row for the rest of the transaction.
    async fn lock_trip(txn: &DatabaseTransaction, trip_id: TripId) -> Result<Trip, LedgerError> {
        let model = trips::Entity::find_by_id(trip_id.into_inner())
            .lock_exclusive()
            .one(txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| LedgerError::not_found("trip", trip_id))?;
        Ok(trip_from_model(model))
    }

    /// Locks the trip row and refuses if it is CLOSED.
    async fn lock_editable(txn: &DatabaseTransaction, trip_id: TripId) -> Result<Trip, LedgerError> {
        let trip = Self::lock_trip(txn, trip_id).await?;
        LifecycleService::ensure_editable(&trip)?;
        Ok(trip)
    }

    async fn find_expense_in<C: ConnectionTrait>(
        conn: &C,
        trip_id: TripId,
        expense_id: ExpenseId,
    ) -> Result<Option<expenses::Model>, DbErr> {
        expenses::Entity::find_by_id(expense_id.into_inner())
            .filter(expenses::Column::TripId.eq(trip_id.into_inner()))
            .one(conn)
            .await
    }
}

impl TripStore for TripRepository {
    async fn truck_exists(&self, truck_id: TruckId) -> Result<bool, LedgerError> {
        let truck = trucks::Entity::find_by_id(truck_id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(truck.is_some())
    }

    async fn find_trip(&self, trip_id: TripId) -> Result<Option<Trip>, LedgerError> {
        let model = trips::Entity::find_by_id(trip_id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(trip_from_model))
    }

    async fn load_ledger(&self, trip_id: TripId) -> Result<Option<TripLedger>, LedgerError> {
        let Some(trip) = self.find_trip(trip_id).await? else {
            return Ok(None);
        };
        let (expenses, payments) = load_children(&self.db, trip_id).await.map_err(db_err)?;
        Ok(Some(TripLedger {
            trip,
            expenses,
            payments,
        }))
    }

    async fn create_trip(&self, trip: Trip) -> Result<Trip, LedgerError> {
        let now = Utc::now();
        let model = trips::ActiveModel {
            id: Set(trip.id.into_inner()),
            truck_id: Set(trip.truck_id.into_inner()),
            source: Set(trip.source),
            destination: Set(trip.destination),
            status: Set(status_to_db(trip.status)),
            estimated_qty: Set(trip.estimated_qty),
            actual_qty: Set(trip.actual_qty),
            rate_per_unit: Set(trip.rate_per_unit),
            start_date: Set(trip.start_date.map(Into::into)),
            end_date: Set(None),
            final_revenue: Set(None),
            final_expenses: Set(None),
            final_balance: Set(None),
            closed_at: Set(None),
            closed_by: Set(None),
            created_at: Set(trip.created_at.into()),
            updated_at: Set(now.into()),
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;

        Ok(trip_from_model(model))
    }

    async fn apply_transition(
        &self,
        trip_id: TripId,
        action: TripAction,
        fingerprint: Option<LedgerFingerprint>,
    ) -> Result<Trip, LedgerError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let current = Self::lock_trip(&txn, trip_id).await?;
        if current.status != action.expected_status() {
            debug!(
                trip_id = %trip_id,
                status = %current.status,
                expected = %action.expected_status(),
                "Transition lost to a concurrent change"
            );
            return Err(LedgerError::Conflict(trip_id));
        }

        if let Some(expected) = fingerprint {
            let (expenses, payments) = load_children(&txn, trip_id).await.map_err(db_err)?;
            if LedgerFingerprint::compute(&current, &expenses, &payments) != expected {
                debug!(trip_id = %trip_id, "Ledger changed since close was validated");
                return Err(LedgerError::Conflict(trip_id));
            }
        }

        let mut update = trips::ActiveModel {
            status: Set(status_to_db(action.new_status())),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };
        match &action {
            TripAction::Start { started_at, .. } => {
                update.start_date = Set(Some((*started_at).into()));
            }
            TripAction::Close { snapshot, .. } => {
                update.end_date = Set(Some(snapshot.closed_at.into()));
                update.final_revenue = Set(Some(snapshot.final_revenue));
                update.final_expenses = Set(Some(snapshot.final_expenses));
                update.final_balance = Set(Some(snapshot.final_balance));
                update.closed_at = Set(Some(snapshot.closed_at.into()));
                update.closed_by = Set(Some(snapshot.closed_by.clone()));
            }
        }

        let result = trips::Entity::update_many()
            .set(update)
            .filter(trips::Column::Id.eq(trip_id.into_inner()))
            .filter(trips::Column::Status.eq(status_to_db(action.expected_status())))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(LedgerError::Conflict(trip_id));
        }

        let updated = trips::Entity::find_by_id(trip_id.into_inner())
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| LedgerError::not_found("trip", trip_id))?;

        txn.commit().await.map_err(db_err)?;
        Ok(trip_from_model(updated))
    }

    async fn set_actual_qty(&self, trip_id: TripId, qty: Decimal) -> Result<Trip, LedgerError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        Self::lock_editable(&txn, trip_id).await?;

        let model = trips::ActiveModel {
            id: Set(trip_id.into_inner()),
            actual_qty: Set(Some(qty)),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .update(&txn)
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(trip_from_model(model))
    }

    async fn find_expense(
        &self,
        trip_id: TripId,
        expense_id: ExpenseId,
    ) -> Result<Option<Expense>, LedgerError> {
        let model = Self::find_expense_in(&self.db, trip_id, expense_id)
            .await
            .map_err(db_err)?;
        Ok(model.map(expense_from_model))
    }

    async fn insert_expense(&self, expense: Expense) -> Result<Expense, LedgerError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        Self::lock_editable(&txn, expense.trip_id).await?;

        let model = expenses::ActiveModel {
            id: Set(expense.id.into_inner()),
            trip_id: Set(expense.trip_id.into_inner()),
            category: Set(category_to_db(expense.category)),
            amount: Set(expense.amount),
            expense_date: Set(expense.expense_date.into()),
            note: Set(expense.note),
            bill_path: Set(expense.bill_ref),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(expense_from_model(model))
    }

    async fn update_expense(
        &self,
        trip_id: TripId,
        expense_id: ExpenseId,
        changes: ExpenseChanges,
    ) -> Result<Expense, LedgerError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        Self::lock_editable(&txn, trip_id).await?;

        let existing = Self::find_expense_in(&txn, trip_id, expense_id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| LedgerError::not_found("expense", expense_id))?;

        let mut expense = expense_from_model(existing.clone());
        changes.apply_to(&mut expense);

        let mut active: expenses::ActiveModel = existing.into();
        active.category = Set(category_to_db(expense.category));
        active.amount = Set(expense.amount);
        active.note = Set(expense.note);
        let model = active.update(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(expense_from_model(model))
    }

    async fn replace_expense_bill(
        &self,
        trip_id: TripId,
        expense_id: ExpenseId,
        bill_ref: String,
    ) -> Result<(Expense, Option<String>), LedgerError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        Self::lock_editable(&txn, trip_id).await?;

        let existing = Self::find_expense_in(&txn, trip_id, expense_id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| LedgerError::not_found("expense", expense_id))?;
        let previous = existing.bill_path.clone();

        let mut active: expenses::ActiveModel = existing.into();
        active.bill_path = Set(Some(bill_ref));
        let model = active.update(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok((expense_from_model(model), previous))
    }

    async fn delete_expense(
        &self,
        trip_id: TripId,
        expense_id: ExpenseId,
    ) -> Result<Expense, LedgerError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        Self::lock_editable(&txn, trip_id).await?;

        let existing = Self::find_expense_in(&txn, trip_id, expense_id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| LedgerError::not_found("expense", expense_id))?;

        expenses::Entity::delete_by_id(existing.id)
            .exec(&txn)
            .await
            .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(expense_from_model(existing))
    }

    async fn insert_payment(&self, payment: Payment) -> Result<Payment, LedgerError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        Self::lock_editable(&txn, payment.trip_id).await?;

        let model = payments::ActiveModel {
            id: Set(payment.id.into_inner()),
            trip_id: Set(payment.trip_id.into_inner()),
            amount: Set(payment.amount),
            payment_type: Set(payment_type_to_db(payment.payment_type)),
            mode: Set(payment_mode_to_db(payment.mode)),
            payment_date: Set(payment.payment_date.into()),
            note: Set(payment.note),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(payment_from_model(model))
    }

    async fn delete_payment(
        &self,
        trip_id: TripId,
        payment_id: PaymentId,
    ) -> Result<Payment, LedgerError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        Self::lock_editable(&txn, trip_id).await?;

        let existing = payments::Entity::find_by_id(payment_id.into_inner())
            .filter(payments::Column::TripId.eq(trip_id.into_inner()))
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| LedgerError::not_found("payment", payment_id))?;

        let result = payments::Entity::delete_by_id(existing.id)
            .exec(&txn)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(LedgerError::not_found("payment", payment_id));
        }

        txn.commit().await.map_err(db_err)?;
        Ok(payment_from_model(existing))
    }
}

async fn load_children<C: ConnectionTrait>(
    conn: &C,
    trip_id: TripId,
) -> Result<(Vec<Expense>, Vec<Payment>), DbErr> {
    let trip_uuid: Uuid = trip_id.into_inner();

    let expenses = expenses::Entity::find()
        .filter(expenses::Column::TripId.eq(trip_uuid))
        .order_by_asc(expenses::Column::ExpenseDate)
        .order_by_asc(expenses::Column::Id)
        .all(conn)
        .await?
        .into_iter()
        .map(expense_from_model)
        .collect();

    let payments = payments::Entity::find()
        .filter(payments::Column::TripId.eq(trip_uuid))
        .order_by_asc(payments::Column::PaymentDate)
        .order_by_asc(payments::Column::Id)
        .all(conn)
        .await?
        .into_iter()
        .map(payment_from_model)
        .collect();

    Ok((expenses, payments))
}

fn db_err(e: DbErr) -> LedgerError {
    LedgerError::Repository(e.to_string())
}

fn trip_from_model(model: trips::Model) -> Trip {
    let closing = match (
        model.final_revenue,
        model.final_expenses,
        model.final_balance,
        model.closed_at,
        model.closed_by,
    ) {
        (Some(final_revenue), Some(final_expenses), Some(final_balance), Some(closed_at), Some(closed_by)) => {
            Some(ClosingSnapshot {
                final_revenue,
                final_expenses,
                final_balance,
                closed_at: closed_at.with_timezone(&Utc),
                closed_by,
            })
        }
        _ => None,
    };

    Trip {
        id: TripId::from_uuid(model.id),
        truck_id: TruckId::from_uuid(model.truck_id),
        source: model.source,
        destination: model.destination,
        status: status_to_core(model.status),
        estimated_qty: model.estimated_qty,
        actual_qty: model.actual_qty,
        rate_per_unit: model.rate_per_unit,
        start_date: model.start_date.map(|d| d.with_timezone(&Utc)),
        end_date: model.end_date.map(|d| d.with_timezone(&Utc)),
        closing,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn expense_from_model(model: expenses::Model) -> Expense {
    Expense {
        id: ExpenseId::from_uuid(model.id),
        trip_id: TripId::from_uuid(model.trip_id),
        category: category_to_core(model.category),
        amount: model.amount,
        expense_date: model.expense_date.with_timezone(&Utc),
        note: model.note,
        bill_ref: model.bill_path,
    }
}

fn payment_from_model(model: payments::Model) -> Payment {
    Payment {
        id: PaymentId::from_uuid(model.id),
        trip_id: TripId::from_uuid(model.trip_id),
        amount: model.amount,
        payment_type: payment_type_to_core(model.payment_type),
        mode: payment_mode_to_core(model.mode),
        payment_date: model.payment_date.with_timezone(&Utc),
        note: model.note,
    }
}

pub(crate) fn status_to_db(status: TripStatus) -> db_enums::TripStatus {
    match status {
        TripStatus::Planned => db_enums::TripStatus::Planned,
        TripStatus::Active => db_enums::TripStatus::Active,
        TripStatus::Closed => db_enums::TripStatus::Closed,
    }
}

fn status_to_core(status: db_enums::TripStatus) -> TripStatus {
    match status {
        db_enums::TripStatus::Planned => TripStatus::Planned,
        db_enums::TripStatus::Active => TripStatus::Active,
        db_enums::TripStatus::Closed => TripStatus::Closed,
    }
}

fn category_to_db(category: ExpenseCategory) -> db_enums::ExpenseCategory {
    match category {
        ExpenseCategory::Fuel => db_enums::ExpenseCategory::Fuel,
        ExpenseCategory::Toll => db_enums::ExpenseCategory::Toll,
        ExpenseCategory::Police => db_enums::ExpenseCategory::Police,
        ExpenseCategory::Loading => db_enums::ExpenseCategory::Loading,
        ExpenseCategory::Unloading => db_enums::ExpenseCategory::Unloading,
        ExpenseCategory::Repair => db_enums::ExpenseCategory::Repair,
        ExpenseCategory::Other => db_enums::ExpenseCategory::Other,
    }
}

fn category_to_core(category: db_enums::ExpenseCategory) -> ExpenseCategory {
    match category {
        db_enums::ExpenseCategory::Fuel => ExpenseCategory::Fuel,
        db_enums::ExpenseCategory::Toll => ExpenseCategory::Toll,
        db_enums::ExpenseCategory::Police => ExpenseCategory::Police,
        db_enums::ExpenseCategory::Loading => ExpenseCategory::Loading,
        db_enums::ExpenseCategory::Unloading => ExpenseCategory::Unloading,
        db_enums::ExpenseCategory::Repair => ExpenseCategory::Repair,
        db_enums::ExpenseCategory::Other => ExpenseCategory::Other,
    }
}

fn payment_type_to_db(payment_type: PaymentType) -> db_enums::PaymentType {
    match payment_type {
        PaymentType::Advance => db_enums::PaymentType::Advance,
        PaymentType::Settlement => db_enums::PaymentType::Settlement,
    }
}

fn payment_type_to_core(payment_type: db_enums::PaymentType) -> PaymentType {
    match payment_type {
        db_enums::PaymentType::Advance => PaymentType::Advance,
        db_enums::PaymentType::Settlement => PaymentType::Settlement,
    }
}

fn payment_mode_to_db(mode: PaymentMode) -> db_enums::PaymentMode {
    match mode {
        PaymentMode::Cash => db_enums::PaymentMode::Cash,
        PaymentMode::Upi => db_enums::PaymentMode::Upi,
        PaymentMode::Bank => db_enums::PaymentMode::Bank,
    }
}

fn payment_mode_to_core(mode: db_enums::PaymentMode) -> PaymentMode {
    match mode {
        db_enums::PaymentMode::Cash => PaymentMode::Cash,
        db_enums::PaymentMode::Upi => PaymentMode::Upi,
        db_enums::PaymentMode::Bank => PaymentMode::Bank,
    }
}
