//! Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// `trip_status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "trip_status")]
pub enum TripStatus {
    /// Planned.
    #[sea_orm(string_value = "PLANNED")]
    Planned,
    /// Active.
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    /// Closed.
    #[sea_orm(string_value = "CLOSED")]
    Closed,
}

/// `expense_category`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "expense_category")]
pub enum ExpenseCategory {
    /// Fuel.
    #[sea_orm(string_value = "FUEL")]
    Fuel,
    /// Toll.
    #[sea_orm(string_value = "TOLL")]
    Toll,
    /// Police.
    #[sea_orm(string_value = "POLICE")]
    Police,
    /// Loading.
    #[sea_orm(string_value = "LOADING")]
    Loading,
    /// Unloading.
    #[sea_orm(string_value = "UNLOADING")]
    Unloading,
    /// Repair.
    #[sea_orm(string_value = "REPAIR")]
    Repair,
    /// Other.
    #[sea_orm(string_value = "OTHER")]
    Other,
}

/// `payment_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_type")]
pub enum PaymentType {
    /// Advance.
    #[sea_orm(string_value = "ADVANCE")]
    Advance,
    /// Settlement.
    #[sea_orm(string_value = "SETTLEMENT")]
    Settlement,
}

/// `payment_mode`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_mode")]
pub enum PaymentMode {
    /// Cash.
    #[sea_orm(string_value = "CASH")]
    Cash,
    /// UPI.
    #[sea_orm(string_value = "UPI")]
    Upi,
    /// Bank transfer.
    #[sea_orm(string_value = "BANK")]
    Bank,
}
