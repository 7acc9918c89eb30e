//! JSON error responses.
//!
//! Every failure leaves the API as
//! `{ "error": CODE, "message": text, "reason"?: sub-code }`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use logisco_core::fleet::FleetError;
use logisco_core::trip::LedgerError;
use logisco_shared::AppError;
use sea_orm::DbErr;
use serde_json::json;
use tracing::{error, warn};

const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// An error ready to be rendered as a response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    reason: Option<&'static str>,
}

impl ApiError {
    fn new(status: u16, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            code,
            message: message.into(),
            reason: None,
        }
    }

    /// 400 with `VALIDATION_ERROR`.
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::validation(message).into()
    }

    /// 404 with `NOT_FOUND`.
    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::not_found(message).into()
    }

    /// HTTP status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Server-side failures keep their detail in the log, not the body.
    fn internal(status: u16, code: &'static str, detail: &dyn std::fmt::Display) -> Self {
        error!(code, error = %detail, "Request failed");
        Self::new(status, code, INTERNAL_MESSAGE)
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        if err.status_code() >= 500 {
            return Self::internal(err.status_code(), err.error_code(), &err);
        }
        let message = match &err {
            AppError::NotFound(m) | AppError::Validation(m) => m.clone(),
            AppError::Configuration(_) => err.to_string(),
        };
        Self::new(err.status_code(), err.error_code(), message)
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Repository(_) => {
                Self::internal(err.status_code(), err.error_code(), &err)
            }
            LedgerError::UploadFailed(_) => {
                warn!(error = %err, "Bill upload failed");
                Self::new(err.status_code(), err.error_code(), err.to_string())
            }
            _ => {
                let mut api = Self::new(err.status_code(), err.error_code(), err.to_string());
                api.reason = err.reason();
                api
            }
        }
    }
}

impl From<FleetError> for ApiError {
    fn from(err: FleetError) -> Self {
        match err {
            FleetError::Database(_) => Self::internal(err.status_code(), err.error_code(), &err),
            _ => Self::new(err.status_code(), err.error_code(), err.to_string()),
        }
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        Self::internal(500, "DATABASE_ERROR", &err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.reason {
            Some(reason) => json!({
                "error": self.code,
                "message": self.message,
                "reason": reason,
            }),
            None => json!({
                "error": self.code,
                "message": self.message,
            }),
        };
        (self.status, Json(body)).into_response()
    }
}
