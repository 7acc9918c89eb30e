//! Payment routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, post},
};
use logisco_core::trip::{NewPayment, PaymentMode, PaymentType};
use logisco_shared::types::{PaymentId, TripId};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;

/// Creates the payment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/trips/{trip_id}/payments", post(add_payment))
        .route("/trips/{trip_id}/payments/{payment_id}", delete(delete_payment))
}

/// Request body for recording a payment.
#[derive(Debug, Deserialize)]
pub struct CreatePaymentRequest {
    /// Amount received.
    pub amount: Decimal,
    /// ADVANCE or SETTLEMENT.
    pub payment_type: String,
    /// CASH, UPI or BANK.
    pub mode: String,
    /// Free-text note.
    #[serde(default)]
    pub note: Option<String>,
}

fn parse_payment_type(raw: &str) -> Result<PaymentType, ApiError> {
    PaymentType::parse(raw)
        .ok_or_else(|| ApiError::validation(format!("Unknown payment type '{}'", raw.trim())))
}

fn parse_payment_mode(raw: &str) -> Result<PaymentMode, ApiError> {
    PaymentMode::parse(raw)
        .ok_or_else(|| ApiError::validation(format!("Unknown payment mode '{}'", raw.trim())))
}

/// POST `/trips/{trip_id}/payments` - Record a payment received.
async fn add_payment(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
    Json(payload): Json<CreatePaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = NewPayment {
        amount: payload.amount,
        payment_type: parse_payment_type(&payload.payment_type)?,
        mode: parse_payment_mode(&payload.mode)?,
        note: payload.note,
    };
    let payment = state
        .ledger()
        .add_payment(TripId::from_uuid(trip_id), input)
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// DELETE `/trips/{trip_id}/payments/{payment_id}` - Remove a payment.
async fn delete_payment(
    State(state): State<AppState>,
    Path((trip_id, payment_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .ledger()
        .delete_payment(TripId::from_uuid(trip_id), PaymentId::from_uuid(payment_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
