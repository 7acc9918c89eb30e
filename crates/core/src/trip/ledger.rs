//! Derived trip totals.
//!
//! Nothing here is cached: every figure is recomputed from the current
//! expense and payment records each time it is asked for.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::trip::types::{Expense, Payment, Trip};

/// Decimal places kept for money: whole paise.
pub const MONEY_SCALE: u32 = 2;

/// Decimal places kept for quantities.
pub const QUANTITY_SCALE: u32 = 3;

/// Revenue earned by a trip: actual quantity times rate, or zero if either
/// is unknown.
///
/// The product is rounded half away from zero to whole paise, so revenue
/// can always be settled exactly by payments.
#[must_use]
pub fn revenue(actual_qty: Option<Decimal>, rate_per_unit: Option<Decimal>) -> Decimal {
    match (actual_qty, rate_per_unit) {
        (Some(qty), Some(rate)) => {
            (qty * rate).round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
        }
        _ => Decimal::ZERO,
    }
}

/// A trip with every expense and payment recorded against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripLedger {
    /// The trip.
    pub trip: Trip,
    /// Its expenses.
    pub expenses: Vec<Expense>,
    /// Its payments.
    pub payments: Vec<Payment>,
}

/// Live figures for a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTotals {
    /// `actual_qty * rate_per_unit`.
    pub revenue: Decimal,
    /// Sum of expense amounts.
    pub total_expenses: Decimal,
    /// Sum of payment amounts.
    pub total_payments: Decimal,
    /// Revenue minus expenses (operating margin).
    pub balance: Decimal,
    /// Revenue minus payments (still to collect).
    pub outstanding: Decimal,
}

/// Everything a close decision depends on.
///
/// Captured when a close is validated and compared again under the trip
/// row lock; any difference means the ledger moved in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerFingerprint {
    /// Number of expenses.
    pub expense_count: u64,
    /// Sum of expense amounts.
    pub total_expenses: Decimal,
    /// Sum of payment amounts.
    pub total_payments: Decimal,
    /// Actual quantity.
    pub actual_qty: Option<Decimal>,
    /// Rate per unit.
    pub rate_per_unit: Option<Decimal>,
}

impl LedgerFingerprint {
    /// Builds a fingerprint from raw figures.
    #[must_use]
    pub fn compute(trip: &Trip, expenses: &[Expense], payments: &[Payment]) -> Self {
        Self {
            expense_count: expenses.len() as u64,
            total_expenses: expenses.iter().map(|e| e.amount).sum(),
            total_payments: payments.iter().map(|p| p.amount).sum(),
            actual_qty: trip.actual_qty,
            rate_per_unit: trip.rate_per_unit,
        }
    }
}

impl TripLedger {
    /// Current revenue.
    #[must_use]
    pub fn revenue(&self) -> Decimal {
        revenue(self.trip.actual_qty, self.trip.rate_per_unit)
    }

    /// Sum of expense amounts.
    #[must_use]
    pub fn total_expenses(&self) -> Decimal {
        self.expenses.iter().map(|e| e.amount).sum()
    }

    /// Sum of payment amounts.
    #[must_use]
    pub fn total_payments(&self) -> Decimal {
        self.payments.iter().map(|p| p.amount).sum()
    }

    /// All derived figures at once.
    #[must_use]
    pub fn totals(&self) -> LedgerTotals {
        let revenue = self.revenue();
        let total_expenses = self.total_expenses();
        let total_payments = self.total_payments();
        LedgerTotals {
            revenue,
            total_expenses,
            total_payments,
            balance: revenue - total_expenses,
            outstanding: revenue - total_payments,
        }
    }

    /// Fingerprint of the figures a close depends on.
    #[must_use]
    pub fn fingerprint(&self) -> LedgerFingerprint {
        LedgerFingerprint::compute(&self.trip, &self.expenses, &self.payments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trip::types::{ExpenseCategory, PaymentMode, PaymentType, TripStatus};
    use chrono::Utc;
    use logisco_shared::types::{ExpenseId, PaymentId, TripId, TruckId};
    use rust_decimal_macros::dec;

    fn trip(actual_qty: Option<Decimal>, rate: Option<Decimal>) -> Trip {
        Trip {
            id: TripId::new(),
            truck_id: TruckId::new(),
            source: "Chennai".into(),
            destination: "Madurai".into(),
            status: TripStatus::Active,
            estimated_qty: None,
            actual_qty,
            rate_per_unit: rate,
            start_date: Some(Utc::now()),
            end_date: None,
            closing: None,
            created_at: Utc::now(),
        }
    }

    fn expense(trip_id: TripId, amount: Decimal) -> Expense {
        Expense {
            id: ExpenseId::new(),
            trip_id,
            category: ExpenseCategory::Fuel,
            amount,
            expense_date: Utc::now(),
            note: None,
            bill_ref: None,
        }
    }

    fn payment(trip_id: TripId, amount: Decimal) -> Payment {
        Payment {
            id: PaymentId::new(),
            trip_id,
            amount,
            payment_type: PaymentType::Advance,
            mode: PaymentMode::Cash,
            payment_date: Utc::now(),
            note: None,
        }
    }

    #[test]
    fn test_revenue_requires_both_factors() {
        assert_eq!(revenue(Some(dec!(10)), Some(dec!(100))), dec!(1000));
        assert_eq!(revenue(None, Some(dec!(100))), Decimal::ZERO);
        assert_eq!(revenue(Some(dec!(10)), None), Decimal::ZERO);
        assert_eq!(revenue(Some(dec!(0)), Some(dec!(100))), Decimal::ZERO);
    }

    #[test]
    fn test_revenue_is_rounded_to_paise() {
        // 10.001 x 0.50 = 5.0005
        assert_eq!(revenue(Some(dec!(10.001)), Some(dec!(0.50))), dec!(5.00));
        // 1.005 x 1.00 = 1.005
        assert_eq!(revenue(Some(dec!(1.005)), Some(dec!(1.00))), dec!(1.01));
        assert_eq!(revenue(Some(dec!(12.345)), Some(dec!(3.33))), dec!(41.11));
    }

    #[test]
    fn test_totals() {
        let t = trip(Some(dec!(10)), Some(dec!(100)));
        let id = t.id;
        let ledger = TripLedger {
            trip: t,
            expenses: vec![expense(id, dec!(150)), expense(id, dec!(50))],
            payments: vec![payment(id, dec!(600))],
        };

        let totals = ledger.totals();
        assert_eq!(totals.revenue, dec!(1000));
        assert_eq!(totals.total_expenses, dec!(200));
        assert_eq!(totals.total_payments, dec!(600));
        assert_eq!(totals.balance, dec!(800));
        assert_eq!(totals.outstanding, dec!(400));
    }

    #[test]
    fn test_empty_ledger_totals_are_zero() {
        let ledger = TripLedger {
            trip: trip(None, None),
            expenses: vec![],
            payments: vec![],
        };
        let totals = ledger.totals();
        assert_eq!(totals.revenue, Decimal::ZERO);
        assert_eq!(totals.balance, Decimal::ZERO);
        assert_eq!(totals.outstanding, Decimal::ZERO);
    }

    #[test]
    fn test_fingerprint_tracks_changes() {
        let t = trip(Some(dec!(10)), Some(dec!(100)));
        let id = t.id;
        let mut ledger = TripLedger {
            trip: t,
            expenses: vec![expense(id, dec!(200))],
            payments: vec![payment(id, dec!(1000))],
        };
        let before = ledger.fingerprint();
        assert_eq!(before, ledger.fingerprint());

        ledger.expenses.push(expense(id, dec!(1)));
        assert_ne!(before, ledger.fingerprint());
    }

    #[test]
    fn test_fingerprint_ignores_decimal_scale() {
        let t = trip(Some(dec!(10)), Some(dec!(100)));
        let id = t.id;
        let a = LedgerFingerprint::compute(&t, &[expense(id, dec!(200))], &[]);
        let b = LedgerFingerprint::compute(&t, &[expense(id, dec!(200.00))], &[]);
        assert_eq!(a, b);
    }
}
