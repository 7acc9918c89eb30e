//! Fleet error types.

use logisco_shared::types::TruckId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur while registering or editing trucks.
#[derive(Debug, Error)]
pub enum FleetError {
    /// Number plate blank after trimming.
    #[error("truck number plate is required")]
    NumberPlateRequired,

    /// Another truck already has this plate.
    #[error("Truck with this number plate already exists")]
    DuplicateNumberPlate(String),

    /// Fixed cost not a storable positive amount.
    #[error("Daily fixed cost must be a positive amount in whole paise, got {0}")]
    InvalidFixedCost(Decimal),

    /// Truck does not exist.
    #[error("Truck {0} not found")]
    TruckNotFound(TruckId),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl FleetError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NumberPlateRequired | Self::InvalidFixedCost(_) => 400,
            Self::TruckNotFound(_) => 404,
            Self::DuplicateNumberPlate(_) => 409,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NumberPlateRequired => "NUMBER_PLATE_REQUIRED",
            Self::DuplicateNumberPlate(_) => "DUPLICATE_NUMBER_PLATE",
            Self::InvalidFixedCost(_) => "INVALID_FIXED_COST",
            Self::TruckNotFound(_) => "TRUCK_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}
