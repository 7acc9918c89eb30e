//! Trip domain types.
//!
//! Trips move PLANNED → ACTIVE → CLOSED. Expenses and payments hang off a
//! trip and are mutable only until it closes.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use logisco_shared::types::{ExpenseId, PaymentId, TripId, TruckId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trip status in the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TripStatus {
    /// Created, not yet on the road.
    Planned,
    /// On the road; expenses and payments are being recorded.
    Active,
    /// Financial outcome frozen (terminal).
    Closed,
}

impl TripStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planned => "PLANNED",
            Self::Active => "ACTIVE",
            Self::Closed => "CLOSED",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "PLANNED" => Some(Self::Planned),
            "ACTIVE" => Some(Self::Active),
            "CLOSED" => Some(Self::Closed),
            _ => None,
        }
    }

    /// Returns true while expenses, payments and quantities may change.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        !matches!(self, Self::Closed)
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Expense category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseCategory {
    /// Diesel and other fuel.
    Fuel,
    /// Highway tolls.
    Toll,
    /// Checkpost and police payments.
    Police,
    /// Loading charges.
    Loading,
    /// Unloading charges.
    Unloading,
    /// Breakdown repairs.
    Repair,
    /// Anything else.
    Other,
}

impl ExpenseCategory {
    /// Every category, in display order.
    pub const ALL: [Self; 7] = [
        Self::Fuel,
        Self::Toll,
        Self::Police,
        Self::Loading,
        Self::Unloading,
        Self::Repair,
        Self::Other,
    ];

    /// Returns the string representation of the category.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fuel => "FUEL",
            Self::Toll => "TOLL",
            Self::Police => "POLICE",
            Self::Loading => "LOADING",
            Self::Unloading => "UNLOADING",
            Self::Repair => "REPAIR",
            Self::Other => "OTHER",
        }
    }

    /// Parses a category, ignoring case and surrounding whitespace.
    pub fn parse(s: &str) -> Option<Self> {
        let wanted = s.trim().to_uppercase();
        Self::ALL.into_iter().find(|c| c.as_str() == wanted)
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of payment received from the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentType {
    /// Paid before or during the trip.
    Advance,
    /// Final settlement.
    Settlement,
}

impl PaymentType {
    /// Returns the string representation of the payment type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Advance => "ADVANCE",
            Self::Settlement => "SETTLEMENT",
        }
    }

    /// Parses a payment type, ignoring case and surrounding whitespace.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "ADVANCE" => Some(Self::Advance),
            "SETTLEMENT" => Some(Self::Settlement),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a payment was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMode {
    /// Cash in hand.
    Cash,
    /// UPI transfer.
    Upi,
    /// Bank transfer or cheque.
    Bank,
}

impl PaymentMode {
    /// Returns the string representation of the payment mode.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "CASH",
            Self::Upi => "UPI",
            Self::Bank => "BANK",
        }
    }

    /// Parses a payment mode, ignoring case and surrounding whitespace.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "CASH" => Some(Self::Cash),
            "UPI" => Some(Self::Upi),
            "BANK" => Some(Self::Bank),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single truck journey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    /// Trip ID.
    pub id: TripId,
    /// Truck making the journey.
    pub truck_id: TruckId,
    /// Origin.
    pub source: String,
    /// Destination.
    pub destination: String,
    /// Lifecycle status.
    pub status: TripStatus,
    /// Quantity quoted when the trip was planned.
    pub estimated_qty: Option<Decimal>,
    /// Quantity actually delivered, once measured.
    pub actual_qty: Option<Decimal>,
    /// Agreed rate per unit delivered.
    pub rate_per_unit: Option<Decimal>,
    /// Set when the trip starts.
    pub start_date: Option<DateTime<Utc>>,
    /// Set when the trip closes.
    pub end_date: Option<DateTime<Utc>>,
    /// Frozen outcome; present iff status is CLOSED.
    pub closing: Option<ClosingSnapshot>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Financial outcome written exactly once, when a trip closes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosingSnapshot {
    /// Revenue at close.
    pub final_revenue: Decimal,
    /// Total expenses at close.
    pub final_expenses: Decimal,
    /// Revenue minus expenses at close.
    pub final_balance: Decimal,
    /// When the trip was closed.
    pub closed_at: DateTime<Utc>,
    /// Who closed it.
    pub closed_by: String,
}

/// A cost incurred on a trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    /// Expense ID.
    pub id: ExpenseId,
    /// Owning trip.
    pub trip_id: TripId,
    /// Category.
    pub category: ExpenseCategory,
    /// Positive amount.
    pub amount: Decimal,
    /// When it was recorded.
    pub expense_date: DateTime<Utc>,
    /// Free-form note.
    pub note: Option<String>,
    /// Object store reference of the uploaded bill.
    pub bill_ref: Option<String>,
}

/// Money received against a trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Payment ID.
    pub id: PaymentId,
    /// Owning trip.
    pub trip_id: TripId,
    /// Positive amount.
    pub amount: Decimal,
    /// Advance or settlement.
    pub payment_type: PaymentType,
    /// Cash, UPI or bank.
    pub mode: PaymentMode,
    /// When it was received.
    pub payment_date: DateTime<Utc>,
    /// Free-form note.
    pub note: Option<String>,
}

/// Input for planning a trip.
#[derive(Debug, Clone)]
pub struct NewTrip {
    /// Truck to send.
    pub truck_id: TruckId,
    /// Origin.
    pub source: String,
    /// Destination.
    pub destination: String,
    /// Quoted quantity.
    pub estimated_qty: Option<Decimal>,
    /// Agreed rate per unit.
    pub rate_per_unit: Option<Decimal>,
}

/// An uploaded bill document.
#[derive(Debug, Clone)]
pub struct BillUpload {
    /// Original filename; only its extension is kept.
    pub filename: String,
    /// MIME type reported by the client.
    pub content_type: String,
    /// File contents.
    pub bytes: Bytes,
}

/// Input for recording an expense.
#[derive(Debug, Clone)]
pub struct NewExpense {
    /// Category.
    pub category: ExpenseCategory,
    /// Amount, must be positive.
    pub amount: Decimal,
    /// Free-form note.
    pub note: Option<String>,
    /// Optional bill to upload before the expense is written.
    pub bill: Option<BillUpload>,
}

/// Edits to an existing expense. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseChanges {
    /// New category.
    pub category: Option<ExpenseCategory>,
    /// New amount, must be positive.
    pub amount: Option<Decimal>,
    /// New note; an empty string clears it.
    pub note: Option<String>,
}

impl ExpenseChanges {
    /// Returns true if nothing would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.amount.is_none() && self.note.is_none()
    }

    /// Applies the changes to an expense in place.
    pub fn apply_to(&self, expense: &mut Expense) {
        if let Some(category) = self.category {
            expense.category = category;
        }
        if let Some(amount) = self.amount {
            expense.amount = amount;
        }
        if let Some(note) = &self.note {
            expense.note = normalize_note(Some(note.clone()));
        }
    }
}

/// Input for recording a payment.
#[derive(Debug, Clone)]
pub struct NewPayment {
    /// Amount, must be positive.
    pub amount: Decimal,
    /// Advance or settlement.
    pub payment_type: PaymentType,
    /// Cash, UPI or bank.
    pub mode: PaymentMode,
    /// Free-form note.
    pub note: Option<String>,
}

/// Trims a note and maps blank to `None`.
#[must_use]
pub fn normalize_note(note: Option<String>) -> Option<String> {
    note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

/// A validated status transition with its audit data.
///
/// Produced by `LifecycleService` and handed to the store, which applies it
/// only if the trip is still in `expected_status()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TripAction {
    /// PLANNED → ACTIVE.
    Start {
        /// The new status (ACTIVE).
        new_status: TripStatus,
        /// When the trip started.
        started_at: DateTime<Utc>,
    },
    /// ACTIVE → CLOSED.
    Close {
        /// The new status (CLOSED).
        new_status: TripStatus,
        /// Frozen outcome; `closed_at` doubles as the end date.
        snapshot: ClosingSnapshot,
    },
}

impl TripAction {
    /// Returns the new status resulting from this action.
    #[must_use]
    pub fn new_status(&self) -> TripStatus {
        match self {
            Self::Start { new_status, .. } | Self::Close { new_status, .. } => *new_status,
        }
    }

    /// Returns the status the trip must still be in for the action to apply.
    #[must_use]
    pub fn expected_status(&self) -> TripStatus {
        match self {
            Self::Start { .. } => TripStatus::Planned,
            Self::Close { .. } => TripStatus::Active,
        }
    }

    /// Applies the action to an in-memory trip.
    pub fn apply_to(&self, trip: &mut Trip) {
        trip.status = self.new_status();
        match self {
            Self::Start { started_at, .. } => trip.start_date = Some(*started_at),
            Self::Close { snapshot, .. } => {
                trip.end_date = Some(snapshot.closed_at);
                trip.closing = Some(snapshot.clone());
            }
        }
    }
}
