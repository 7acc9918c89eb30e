//! Fleet domain types.

use chrono::{DateTime, Utc};
use logisco_shared::types::{CompanyId, TruckId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The company trucks are registered under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    /// Company ID.
    pub id: CompanyId,
    /// Unique name.
    pub name: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A registered truck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Truck {
    /// Truck ID.
    pub id: TruckId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Normalized number plate (trimmed, upper-case).
    pub number_plate: String,
    /// Daily fixed cost (EMI, insurance, driver salary).
    pub daily_fixed_cost: Option<Decimal>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Input for registering a truck.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTruck {
    /// Number plate as typed.
    pub number_plate: String,
    /// Optional daily fixed cost.
    #[serde(default)]
    pub daily_fixed_cost: Option<Decimal>,
}

/// Edit to a truck. Only the fixed cost is editable.
#[derive(Debug, Clone, Deserialize)]
pub struct TruckUpdate {
    /// New daily fixed cost.
    pub daily_fixed_cost: Decimal,
}
