//! Expense routes, including bill uploads.
//!
//! Expenses are created and their bills replaced with `multipart/form-data`
//! so the bill photo travels with the record it belongs to.

use std::str::FromStr;

use axum::{
    Json, Router,
    extract::{Multipart, Path, State, multipart::Field},
    http::StatusCode,
    response::IntoResponse,
    routing::{patch, post, put},
};
use chrono::{DateTime, Utc};
use logisco_core::trip::{BillUpload, Expense, ExpenseCategory, ExpenseChanges, NewExpense};
use logisco_shared::types::{ExpenseId, TripId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;

/// Creates the expense routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/trips/{trip_id}/expenses", post(add_expense))
        .route(
            "/trips/{trip_id}/expenses/{expense_id}",
            patch(update_expense).delete(delete_expense),
        )
        .route(
            "/trips/{trip_id}/expenses/{expense_id}/bill",
            put(replace_bill).get(get_bill),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// An expense as returned by the API.
///
/// The storage reference stays server-side; clients get a temporary URL.
#[derive(Debug, Serialize)]
pub struct ExpenseResponse {
    /// Expense ID.
    pub id: ExpenseId,
    /// Owning trip.
    pub trip_id: TripId,
    /// Category.
    pub category: ExpenseCategory,
    /// Amount.
    pub amount: Decimal,
    /// When the expense was recorded.
    pub expense_date: DateTime<Utc>,
    /// Free-text note.
    pub note: Option<String>,
    /// Whether a bill is attached.
    pub has_bill: bool,
    /// Temporary bill URL, when the provider can issue one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bill_url: Option<String>,
}

impl ExpenseResponse {
    /// Builds a response, attaching `bill_url` if one was issued.
    pub fn new(expense: Expense, bill_url: Option<String>) -> Self {
        Self {
            id: expense.id,
            trip_id: expense.trip_id,
            category: expense.category,
            amount: expense.amount,
            expense_date: expense.expense_date,
            note: expense.note,
            has_bill: expense.bill_ref.is_some(),
            bill_url,
        }
    }
}

/// Request body for editing an expense. Omitted fields stay unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateExpenseRequest {
    /// New category.
    pub category: Option<String>,
    /// New amount.
    pub amount: Option<Decimal>,
    /// New note.
    pub note: Option<String>,
}

/// Fields collected from an expense form.
#[derive(Debug, Default)]
struct ExpenseForm {
    category: Option<String>,
    amount: Option<String>,
    note: Option<String>,
    bill: Option<BillUpload>,
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Parses a category, rejecting unknown values.
fn parse_category(raw: &str) -> Result<ExpenseCategory, ApiError> {
    ExpenseCategory::parse(raw)
        .ok_or_else(|| ApiError::validation(format!("Unknown expense category '{}'", raw.trim())))
}

fn parse_amount(raw: &str) -> Result<Decimal, ApiError> {
    Decimal::from_str(raw.trim())
        .map_err(|_| ApiError::validation(format!("Invalid amount '{}'", raw.trim())))
}

async fn field_text(field: Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::validation(e.body_text()))
}

async fn read_form(mut multipart: Multipart) -> Result<ExpenseForm, ApiError> {
    let mut form = ExpenseForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "category" => form.category = Some(field_text(field).await?),
            "amount" => form.amount = Some(field_text(field).await?),
            "note" => form.note = Some(field_text(field).await?),
            "bill" => {
                let filename = field.file_name().unwrap_or("bill").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::validation(e.body_text()))?;
                // Browsers send an empty part when no file was picked.
                if !bytes.is_empty() {
                    form.bill = Some(BillUpload {
                        filename,
                        content_type,
                        bytes,
                    });
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST `/trips/{trip_id}/expenses` - Record an expense with an optional bill.
async fn add_expense(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_form(multipart).await?;
    let category = parse_category(
        form.category
            .as_deref()
            .ok_or_else(|| ApiError::validation("category is required"))?,
    )?;
    let amount = parse_amount(
        form.amount
            .as_deref()
            .ok_or_else(|| ApiError::validation("amount is required"))?,
    )?;

    let service = state.ledger();
    let expense = service
        .add_expense(
            TripId::from_uuid(trip_id),
            NewExpense {
                category,
                amount,
                note: form.note,
                bill: form.bill,
            },
        )
        .await?;
    let bill_url = service.expense_bill_url(&expense).await;

    Ok((
        StatusCode::CREATED,
        Json(ExpenseResponse::new(expense, bill_url)),
    ))
}

/// PATCH `/trips/{trip_id}/expenses/{expense_id}` - Edit category, amount or note.
async fn update_expense(
    State(state): State<AppState>,
    Path((trip_id, expense_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateExpenseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let changes = ExpenseChanges {
        category: payload.category.as_deref().map(parse_category).transpose()?,
        amount: payload.amount,
        note: payload.note,
    };
    if changes.is_empty() {
        return Err(ApiError::validation("Nothing to update"));
    }

    let expense = state
        .ledger()
        .update_expense(
            TripId::from_uuid(trip_id),
            ExpenseId::from_uuid(expense_id),
            changes,
        )
        .await?;
    Ok(Json(ExpenseResponse::new(expense, None)))
}

/// DELETE `/trips/{trip_id}/expenses/{expense_id}` - Remove an expense and its bill.
async fn delete_expense(
    State(state): State<AppState>,
    Path((trip_id, expense_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .ledger()
        .delete_expense(TripId::from_uuid(trip_id), ExpenseId::from_uuid(expense_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT `/trips/{trip_id}/expenses/{expense_id}/bill` - Attach or replace the bill.
async fn replace_bill(
    State(state): State<AppState>,
    Path((trip_id, expense_id)): Path<(Uuid, Uuid)>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let bill = read_form(multipart)
        .await?
        .bill
        .ok_or_else(|| ApiError::validation("bill file is required"))?;

    let service = state.ledger();
    let expense = service
        .replace_expense_bill(
            TripId::from_uuid(trip_id),
            ExpenseId::from_uuid(expense_id),
            bill,
        )
        .await?;
    let bill_url = service.expense_bill_url(&expense).await;
    Ok(Json(ExpenseResponse::new(expense, bill_url)))
}

/// GET `/trips/{trip_id}/expenses/{expense_id}/bill` - Temporary bill URL.
///
/// `url` is null when the storage provider cannot presign.
async fn get_bill(
    State(state): State<AppState>,
    Path((trip_id, expense_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let url = state
        .ledger()
        .bill_url(TripId::from_uuid(trip_id), ExpenseId::from_uuid(expense_id))
        .await?;
    let expires_in_secs = url.as_ref().map(|_| state.bill_url_ttl_secs);
    Ok(Json(json!({
        "expense_id": expense_id,
        "url": url,
        "expires_in_secs": expires_in_secs,
    })))
}
