//! Rupee amounts for display.
//!
//! Never use floating point for money. Amounts wrap `rust_decimal::Decimal`.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A rupee amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money {
    /// The amount in rupees, not paise.
    pub amount: Decimal,
}

impl Money {
    /// Creates a rupee amount.
    #[must_use]
    pub const fn inr(amount: Decimal) -> Self {
        Self { amount }
    }

    /// The amount rounded half away from zero to whole paise.
    #[must_use]
    pub fn in_paise(&self) -> Decimal {
        self.amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}

/// Renders as `₹400`, `-₹400` or `₹12.50`.
///
/// The amount is rounded to paise first; whole results drop the fraction.
impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rounded = self.in_paise();
        let sign = if rounded < Decimal::ZERO { "-" } else { "" };
        let abs = rounded.abs();
        if abs.fract().is_zero() {
            write!(f, "{sign}₹{}", abs.trunc())
        } else {
            write!(f, "{sign}₹{abs:.2}")
        }
    }
}
