//! Trip ledger error types.

use logisco_shared::types::{Money, TripId};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::trip::types::TripStatus;

fn rupees(amount: &Decimal) -> Money {
    Money::inr(*amount)
}

/// Why a close was refused. Checked in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CloseRejection {
    /// No expense has been recorded.
    #[error("Cannot close trip without expenses")]
    NoExpenses,

    /// Actual quantity or rate missing, or revenue not positive.
    #[error("Cannot close trip without valid revenue")]
    NoRevenue,

    /// Payments do not yet cover revenue.
    #[error("Cannot close trip with {} outstanding", rupees(.amount))]
    Outstanding {
        /// Revenue minus payments.
        amount: Decimal,
    },
}

impl CloseRejection {
    /// Returns the sub-code for API responses.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoExpenses => "NO_EXPENSES",
            Self::NoRevenue => "NO_REVENUE",
            Self::Outstanding { .. } => "OUTSTANDING_BALANCE",
        }
    }
}

/// Errors that can occur during trip ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The trip is closed; nothing on it may change.
    #[error("Trip is closed and cannot be modified")]
    TripClosed(TripId),

    /// A closing precondition was not met.
    #[error("{0}")]
    CloseRejected(CloseRejection),

    /// Amount was zero or negative.
    #[error("Amount must be greater than zero, got {0}")]
    InvalidAmount(Decimal),

    /// Quantity was zero or negative.
    #[error("Quantity must be greater than zero, got {0}")]
    InvalidQuantity(Decimal),

    /// Referenced record does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of record.
        entity: &'static str,
        /// Its ID.
        id: Uuid,
    },

    /// Bill document was rejected before upload (size or type).
    #[error("Invalid bill document: {0}")]
    InvalidBill(String),

    /// Object store refused the bill.
    #[error("Bill upload failed: {0}")]
    UploadFailed(String),

    /// The trip changed between validation and write.
    #[error("Trip {0} was modified concurrently, reload and retry")]
    Conflict(TripId),

    /// Transition not allowed from the current status.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: TripStatus,
        /// Attempted status.
        to: TripStatus,
    },

    /// Close attempted without naming who closed it.
    #[error("Closing actor is required")]
    ActorRequired,

    /// Required text field was blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Record store failure.
    #[error("Repository error: {0}")]
    Repository(String),
}

impl LedgerError {
    /// Creates a not found error.
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl Into<Uuid>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::TripClosed(_)
            | Self::InvalidAmount(_)
            | Self::InvalidQuantity(_)
            | Self::InvalidBill(_)
            | Self::InvalidTransition { .. }
            | Self::ActorRequired
            | Self::MissingField(_) => 400,
            Self::NotFound { .. } => 404,
            Self::Conflict(_) => 409,
            Self::CloseRejected(_) => 422,
            Self::UploadFailed(_) => 502,
            Self::Repository(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::TripClosed(_) => "TRIP_CLOSED",
            Self::CloseRejected(_) => "TRIP_CLOSE_REJECTED",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::InvalidQuantity(_) => "INVALID_QUANTITY",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::InvalidBill(_) => "INVALID_BILL",
            Self::UploadFailed(_) => "UPLOAD_FAILED",
            Self::Conflict(_) => "CONFLICT",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::ActorRequired => "ACTOR_REQUIRED",
            Self::MissingField(_) => "MISSING_FIELD",
            Self::Repository(_) => "REPOSITORY_ERROR",
        }
    }

    /// Returns the close rejection sub-code, if any.
    #[must_use]
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            Self::CloseRejected(rejection) => Some(rejection.code()),
            _ => None,
        }
    }
}

impl From<CloseRejection> for LedgerError {
    fn from(rejection: CloseRejection) -> Self {
        Self::CloseRejected(rejection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rejection_messages() {
        assert_eq!(
            CloseRejection::NoExpenses.to_string(),
            "Cannot close trip without expenses"
        );
        assert_eq!(
            CloseRejection::NoRevenue.to_string(),
            "Cannot close trip without valid revenue"
        );
        assert_eq!(
            CloseRejection::Outstanding { amount: dec!(400) }.to_string(),
            "Cannot close trip with ₹400 outstanding"
        );
    }

    #[test]
    fn test_close_rejected_carries_reason() {
        let err: LedgerError = CloseRejection::Outstanding { amount: dec!(12.5) }.into();
        assert_eq!(err.status_code(), 422);
        assert_eq!(err.error_code(), "TRIP_CLOSE_REJECTED");
        assert_eq!(err.reason(), Some("OUTSTANDING_BALANCE"));
        assert_eq!(err.to_string(), "Cannot close trip with ₹12.50 outstanding");
    }

    #[rstest]
    #[case(LedgerError::TripClosed(TripId::new()), 400, "TRIP_CLOSED")]
    #[case(LedgerError::InvalidAmount(dec!(0)), 400, "INVALID_AMOUNT")]
    #[case(LedgerError::InvalidQuantity(dec!(-1)), 400, "INVALID_QUANTITY")]
    #[case(LedgerError::not_found("trip", Uuid::nil()), 404, "NOT_FOUND")]
    #[case(LedgerError::UploadFailed(String::new()), 502, "UPLOAD_FAILED")]
    #[case(LedgerError::Conflict(TripId::new()), 409, "CONFLICT")]
    #[case(LedgerError::ActorRequired, 400, "ACTOR_REQUIRED")]
    #[case(LedgerError::MissingField("source"), 400, "MISSING_FIELD")]
    #[case(LedgerError::Repository(String::new()), 500, "REPOSITORY_ERROR")]
    fn test_error_mapping(#[case] err: LedgerError, #[case] status: u16, #[case] code: &str) {
        assert_eq!(err.status_code(), status);
        assert_eq!(err.error_code(), code);
        assert_eq!(err.reason(), None);
    }

    #[test]
    fn test_not_found_display() {
        let err = LedgerError::not_found("expense", Uuid::nil());
        assert_eq!(
            err.to_string(),
            "expense 00000000-0000-0000-0000-000000000000 not found"
        );
    }
}
