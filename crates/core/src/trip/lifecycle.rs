//! Trip lifecycle rules.
//!
//! Pure functions: they look at a trip (or its ledger) and either produce a
//! `TripAction` for the store to apply or refuse with a `LedgerError`.

use chrono::Utc;
use rust_decimal::Decimal;

use crate::trip::error::{CloseRejection, LedgerError};
use crate::trip::ledger::{MONEY_SCALE, QUANTITY_SCALE, TripLedger};
use crate::trip::types::{ClosingSnapshot, Trip, TripAction, TripStatus};

/// Exclusive bound of `NUMERIC(14, 2)` money columns.
const AMOUNT_LIMIT: i64 = 1_000_000_000_000;

/// Exclusive bound of `NUMERIC(14, 3)` quantity columns.
const QUANTITY_LIMIT: i64 = 100_000_000_000;

/// Positive, no finer than `scale` decimals, below `limit`.
fn is_storable(value: Decimal, scale: u32, limit: i64) -> bool {
    value > Decimal::ZERO && value < Decimal::from(limit) && value.round_dp(scale) == value
}

/// Stateless service for trip status transitions and edit guards.
pub struct LifecycleService;

impl LifecycleService {
    /// Refuses any change to a closed trip.
    ///
    /// Every mutation of a trip, its expenses or its payments goes through
    /// this check against the latest persisted trip.
    pub fn ensure_editable(trip: &Trip) -> Result<(), LedgerError> {
        if trip.status.is_editable() {
            Ok(())
        } else {
            Err(LedgerError::TripClosed(trip.id))
        }
    }

    /// Start a planned trip.
    ///
    /// # Returns
    /// * `Ok(TripAction::Start)` if the trip is PLANNED
    /// * `Err(LedgerError::TripClosed)` if the trip is CLOSED
    /// * `Err(LedgerError::InvalidTransition)` otherwise
    pub fn start(trip: &Trip) -> Result<TripAction, LedgerError> {
        Self::guard_transition(trip, TripStatus::Active)?;
        Ok(TripAction::Start {
            new_status: TripStatus::Active,
            started_at: Utc::now(),
        })
    }

    /// Close an active trip, freezing its financial outcome.
    ///
    /// Preconditions are checked in order and the first failure wins:
    /// at least one expense, positive revenue, nothing outstanding.
    ///
    /// # Returns
    /// * `Ok(TripAction::Close)` with the snapshot to persist
    /// * `Err(LedgerError::ActorRequired)` if `closed_by` is blank
    /// * `Err(LedgerError::TripClosed)` if already CLOSED
    /// * `Err(LedgerError::InvalidTransition)` if still PLANNED
    /// * `Err(LedgerError::CloseRejected)` with the first unmet precondition
    pub fn close(ledger: &TripLedger, closed_by: &str) -> Result<TripAction, LedgerError> {
        let closed_by = closed_by.trim();
        if closed_by.is_empty() {
            return Err(LedgerError::ActorRequired);
        }

        Self::guard_transition(&ledger.trip, TripStatus::Closed)?;
        Self::check_closable(ledger)?;

        let totals = ledger.totals();
        Ok(TripAction::Close {
            new_status: TripStatus::Closed,
            snapshot: ClosingSnapshot {
                final_revenue: totals.revenue,
                final_expenses: totals.total_expenses,
                final_balance: totals.revenue - totals.total_expenses,
                closed_at: Utc::now(),
                closed_by: closed_by.to_string(),
            },
        })
    }

    /// Checks the closing preconditions without looking at status.
    pub fn check_closable(ledger: &TripLedger) -> Result<(), CloseRejection> {
        if ledger.expenses.is_empty() {
            return Err(CloseRejection::NoExpenses);
        }

        let qty_ok = ledger.trip.actual_qty.is_some_and(|q| q > Decimal::ZERO);
        let totals = ledger.totals();
        if !qty_ok || totals.revenue <= Decimal::ZERO {
            return Err(CloseRejection::NoRevenue);
        }

        if totals.outstanding > Decimal::ZERO {
            return Err(CloseRejection::Outstanding {
                amount: totals.outstanding,
            });
        }

        Ok(())
    }

    /// Amounts (expenses, payments, rates) must be strictly positive, in
    /// whole paise, and below ₹10^12.
    pub fn validate_amount(amount: Decimal) -> Result<Decimal, LedgerError> {
        if is_storable(amount, MONEY_SCALE, AMOUNT_LIMIT) {
            Ok(amount)
        } else {
            Err(LedgerError::InvalidAmount(amount))
        }
    }

    /// Quantities must be strictly positive, with at most three decimals,
    /// and below 10^11.
    pub fn validate_quantity(qty: Decimal) -> Result<Decimal, LedgerError> {
        if is_storable(qty, QUANTITY_SCALE, QUANTITY_LIMIT) {
            Ok(qty)
        } else {
            Err(LedgerError::InvalidQuantity(qty))
        }
    }

    /// A closed trip reports `TripClosed`; any other move outside the
    /// transition table is `InvalidTransition`.
    fn guard_transition(trip: &Trip, to: TripStatus) -> Result<(), LedgerError> {
        if trip.status == TripStatus::Closed {
            return Err(LedgerError::TripClosed(trip.id));
        }
        if Self::is_valid_transition(trip.status, to) {
            Ok(())
        } else {
            Err(LedgerError::InvalidTransition {
                from: trip.status,
                to,
            })
        }
    }

    /// Only PLANNED → ACTIVE and ACTIVE → CLOSED are valid.
    #[must_use]
    pub fn is_valid_transition(from: TripStatus, to: TripStatus) -> bool {
        matches!(
            (from, to),
            (TripStatus::Planned, TripStatus::Active) | (TripStatus::Active, TripStatus::Closed)
        )
    }
}
