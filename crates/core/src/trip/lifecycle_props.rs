//! Property-based tests for the trip lifecycle rules.

use chrono::Utc;
use logisco_shared::types::{ExpenseId, PaymentId, TripId, TruckId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::trip::error::{CloseRejection, LedgerError};
use crate::trip::ledger::{TripLedger, revenue};
use crate::trip::lifecycle::LifecycleService;
use crate::trip::types::{
    Expense, ExpenseCategory, Payment, PaymentMode, PaymentType, Trip, TripAction, TripStatus,
};

fn arb_status() -> impl Strategy<Value = TripStatus> {
    prop_oneof![
        Just(TripStatus::Planned),
        Just(TripStatus::Active),
        Just(TripStatus::Closed),
    ]
}

/// Positive amounts in paise, up to ₹1,00,000.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..=10_000_000).prop_map(|paise| Decimal::new(paise, 2))
}

/// Quantities with up to three decimals, including zero and negatives.
fn arb_qty() -> impl Strategy<Value = Option<Decimal>> {
    prop_oneof![
        Just(None),
        (-1_000i64..=100_000).prop_map(|q| Some(Decimal::new(q, 3))),
    ]
}

fn arb_rate() -> impl Strategy<Value = Option<Decimal>> {
    prop_oneof![Just(None), arb_amount().prop_map(Some)]
}

fn build_ledger(
    status: TripStatus,
    actual_qty: Option<Decimal>,
    rate_per_unit: Option<Decimal>,
    expenses: &[Decimal],
    payments: &[Decimal],
) -> TripLedger {
    let trip = Trip {
        id: TripId::new(),
        truck_id: TruckId::new(),
        source: "Trichy".into(),
        destination: "Tuticorin".into(),
        status,
        estimated_qty: None,
        actual_qty,
        rate_per_unit,
        start_date: None,
        end_date: None,
        closing: None,
        created_at: Utc::now(),
    };
    let trip_id = trip.id;
    TripLedger {
        trip,
        expenses: expenses
            .iter()
            .map(|&amount| Expense {
                id: ExpenseId::new(),
                trip_id,
                category: ExpenseCategory::Other,
                amount,
                expense_date: Utc::now(),
                note: None,
                bill_ref: None,
            })
            .collect(),
        payments: payments
            .iter()
            .map(|&amount| Payment {
                id: PaymentId::new(),
                trip_id,
                amount,
                payment_type: PaymentType::Advance,
                mode: PaymentMode::Cash,
                payment_date: Utc::now(),
                note: None,
            })
            .collect(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Revenue is the product of both factors in whole paise, zero if
    /// either is missing.
    #[test]
    fn prop_revenue_is_qty_times_rate(qty in arb_qty(), rate in arb_rate()) {
        let earned = revenue(qty, rate);
        match (qty, rate) {
            (Some(q), Some(r)) => {
                prop_assert_eq!(earned.round_dp(2), earned);
                prop_assert!((q * r - earned).abs() <= Decimal::new(5, 3));
            }
            _ => prop_assert_eq!(earned, Decimal::ZERO),
        }
    }

    /// Computing totals twice gives the same answer and never mutates.
    #[test]
    fn prop_totals_are_idempotent(
        qty in arb_qty(),
        rate in arb_rate(),
        expenses in prop::collection::vec(arb_amount(), 0..8),
        payments in prop::collection::vec(arb_amount(), 0..8),
    ) {
        let ledger = build_ledger(TripStatus::Active, qty, rate, &expenses, &payments);
        let before = ledger.clone();
        let first = ledger.totals();
        let second = ledger.totals();
        prop_assert_eq!(first, second);
        prop_assert_eq!(&ledger, &before);
        prop_assert_eq!(first.balance, first.revenue - first.total_expenses);
        prop_assert_eq!(first.outstanding, first.revenue - first.total_payments);
    }

    /// An active trip closes iff it has expenses, positive revenue and
    /// nothing outstanding; otherwise the first unmet reason is reported.
    #[test]
    fn prop_close_decision(
        qty in arb_qty(),
        rate in arb_rate(),
        expenses in prop::collection::vec(arb_amount(), 0..5),
        payments in prop::collection::vec(arb_amount(), 0..5),
    ) {
        let ledger = build_ledger(TripStatus::Active, qty, rate, &expenses, &payments);
        let totals = ledger.totals();
        let result = LifecycleService::close(&ledger, "operator");

        let has_revenue = qty.is_some_and(|q| q > Decimal::ZERO) && totals.revenue > Decimal::ZERO;
        if expenses.is_empty() {
            let rejected = matches!(result, Err(LedgerError::CloseRejected(CloseRejection::NoExpenses)));
            prop_assert!(rejected);
        } else if !has_revenue {
            let rejected = matches!(result, Err(LedgerError::CloseRejected(CloseRejection::NoRevenue)));
            prop_assert!(rejected);
        } else if totals.outstanding > Decimal::ZERO {
            let rejected = matches!(
                result,
                Err(LedgerError::CloseRejected(CloseRejection::Outstanding { amount })) if amount == totals.outstanding
            );
            prop_assert!(rejected);
        } else {
            let Ok(TripAction::Close { snapshot, .. }) = result else {
                return Err(TestCaseError::fail("expected close to succeed"));
            };
            prop_assert_eq!(snapshot.final_revenue, totals.revenue);
            prop_assert_eq!(snapshot.final_expenses, totals.total_expenses);
            prop_assert_eq!(snapshot.final_balance, totals.revenue - totals.total_expenses);
        }
    }

    /// A closed trip refuses every transition and every edit.
    #[test]
    fn prop_closed_trip_is_frozen(
        qty in arb_qty(),
        rate in arb_rate(),
        expenses in prop::collection::vec(arb_amount(), 0..5),
        payments in prop::collection::vec(arb_amount(), 0..5),
    ) {
        let ledger = build_ledger(TripStatus::Closed, qty, rate, &expenses, &payments);
        prop_assert!(matches!(LifecycleService::ensure_editable(&ledger.trip), Err(LedgerError::TripClosed(_))));
        prop_assert!(matches!(LifecycleService::start(&ledger.trip), Err(LedgerError::TripClosed(_))));
        prop_assert!(matches!(LifecycleService::close(&ledger, "operator"), Err(LedgerError::TripClosed(_))));
    }

    /// Start succeeds exactly when PLANNED → ACTIVE is a valid transition.
    #[test]
    fn prop_start_matches_transition_table(status in arb_status()) {
        let ledger = build_ledger(status, None, None, &[], &[]);
        let result = LifecycleService::start(&ledger.trip);
        prop_assert_eq!(
            result.is_ok(),
            LifecycleService::is_valid_transition(status, TripStatus::Active)
        );
        if let Ok(action) = result {
            prop_assert_eq!(action.new_status(), TripStatus::Active);
            prop_assert_eq!(action.expected_status(), status);
        }
    }

    /// Non-positive amounts are always rejected, positive ones always pass.
    #[test]
    fn prop_amount_validation(paise in -10_000_000i64..=10_000_000) {
        let amount = Decimal::new(paise, 2);
        let result = LifecycleService::validate_amount(amount);
        prop_assert_eq!(result.is_ok(), paise > 0);
    }
}
