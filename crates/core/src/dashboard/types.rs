//! Dashboard data types.

use chrono::{DateTime, Utc};
use logisco_shared::types::{Money, TripId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::trip::types::TripStatus;

/// Summary shown at the top of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusStrip {
    /// Number of ACTIVE trips.
    pub active_trips: u64,
    /// Sum of expenses recorded on ACTIVE trips.
    pub cash_deployed: Decimal,
}

/// One row of the trip list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripSummary {
    /// Trip ID.
    pub id: TripId,
    /// Plate of the truck.
    pub truck_plate: String,
    /// Origin.
    pub source: String,
    /// Destination.
    pub destination: String,
    /// Lifecycle status.
    pub status: TripStatus,
    /// Start timestamp, if started.
    pub start_date: Option<DateTime<Utc>>,
    /// Final balance; only ever set for CLOSED trips.
    pub result: Option<Decimal>,
}

impl TripSummary {
    /// Build a row, dropping any balance on a trip that is not closed.
    #[must_use]
    pub fn new(
        id: TripId,
        truck_plate: String,
        source: String,
        destination: String,
        status: TripStatus,
        start_date: Option<DateTime<Utc>>,
        final_balance: Option<Decimal>,
    ) -> Self {
        Self {
            id,
            truck_plate,
            source,
            destination,
            status,
            start_date,
            result: final_balance.filter(|_| status == TripStatus::Closed),
        }
    }

    /// The result as shown in the list: `₹800`, `-₹150`, or nothing.
    #[must_use]
    pub fn result_label(&self) -> Option<String> {
        self.result.map(|r| Money::inr(r).to_string())
    }
}
