//! Trip routes: planning, lifecycle and the ledger view.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use logisco_core::dashboard::TripSummary;
use logisco_core::trip::{LedgerTotals, NewTrip, Payment, Trip, TripStatus};
use logisco_db::TripRepository;
use logisco_shared::types::{Money, PageRequest, PageResponse, TripId, TruckId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::routes::expenses::ExpenseResponse;
use crate::{AppState, LedgerService};

/// Creates the trip routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/trips", get(list_trips).post(create_trip))
        .route("/trips/{trip_id}", get(get_trip))
        .route("/trips/{trip_id}/start", post(start_trip))
        .route("/trips/{trip_id}/close", post(close_trip))
        .route("/trips/{trip_id}/actual-quantity", put(update_actual_quantity))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for the trip list.
#[derive(Debug, Default, Deserialize)]
pub struct ListTripsQuery {
    /// Status filter (PLANNED, ACTIVE, CLOSED).
    pub status: Option<String>,
    /// Page number, 1-indexed.
    pub page: Option<u32>,
    /// Page size, at most 100.
    pub per_page: Option<u32>,
}

impl ListTripsQuery {
    fn page_request(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
        .normalized()
    }
}

/// Request body for planning a trip.
#[derive(Debug, Deserialize)]
pub struct CreateTripRequest {
    /// Truck assigned to the trip.
    pub truck_id: Uuid,
    /// Origin.
    pub source: String,
    /// Destination.
    pub destination: String,
    /// Planned quantity.
    #[serde(default)]
    pub estimated_qty: Option<Decimal>,
    /// Agreed rate per unit.
    #[serde(default)]
    pub rate_per_unit: Option<Decimal>,
}

/// Request body for closing a trip.
#[derive(Debug, Deserialize)]
pub struct CloseTripRequest {
    /// Who is closing the trip.
    #[serde(default)]
    pub closed_by: String,
}

/// Request body for recording the measured quantity.
#[derive(Debug, Deserialize)]
pub struct ActualQuantityRequest {
    /// Measured quantity; must be positive.
    pub actual_qty: Decimal,
}

/// One row of the trip list.
#[derive(Debug, Serialize)]
pub struct TripSummaryResponse {
    /// The row.
    #[serde(flatten)]
    pub summary: TripSummary,
    /// `result` formatted as rupees, closed trips only.
    pub result_label: Option<String>,
}

impl From<TripSummary> for TripSummaryResponse {
    fn from(summary: TripSummary) -> Self {
        let result_label = summary.result_label();
        Self {
            summary,
            result_label,
        }
    }
}

/// Derived figures with display labels.
#[derive(Debug, Serialize)]
pub struct TotalsResponse {
    /// The raw figures.
    #[serde(flatten)]
    pub totals: LedgerTotals,
    /// Balance formatted as rupees.
    pub balance_label: String,
    /// Outstanding amount formatted as rupees.
    pub outstanding_label: String,
}

impl From<LedgerTotals> for TotalsResponse {
    fn from(totals: LedgerTotals) -> Self {
        Self {
            balance_label: Money::inr(totals.balance).to_string(),
            outstanding_label: Money::inr(totals.outstanding).to_string(),
            totals,
        }
    }
}

/// Full ledger view of one trip.
#[derive(Debug, Serialize)]
pub struct TripDetailResponse {
    /// The trip, including its closing snapshot once CLOSED.
    pub trip: Trip,
    /// Live totals.
    pub totals: TotalsResponse,
    /// Expenses with temporary bill URLs.
    pub expenses: Vec<ExpenseResponse>,
    /// Payments received.
    pub payments: Vec<Payment>,
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Parses a status filter, rejecting unknown values.
fn parse_status(raw: &str) -> Result<TripStatus, ApiError> {
    TripStatus::parse(raw)
        .ok_or_else(|| ApiError::validation(format!("Unknown trip status '{}'", raw.trim())))
}

/// Builds the ledger view, attaching bill URLs.
async fn trip_detail(
    service: &LedgerService,
    trip_id: TripId,
) -> Result<TripDetailResponse, ApiError> {
    let ledger = service.ledger(trip_id).await?;
    let totals = ledger.totals();

    let mut expenses = Vec::with_capacity(ledger.expenses.len());
    for expense in &ledger.expenses {
        let bill_url = service.expense_bill_url(expense).await;
        expenses.push(ExpenseResponse::new(expense.clone(), bill_url));
    }

    Ok(TripDetailResponse {
        trip: ledger.trip,
        totals: totals.into(),
        expenses,
        payments: ledger.payments,
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// GET `/trips` - Trip list, newest first.
async fn list_trips(
    State(state): State<AppState>,
    Query(query): Query<ListTripsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let status = query.status.as_deref().map(parse_status).transpose()?;
    let page = query.page_request();

    let (rows, total) = TripRepository::new((*state.db).clone())
        .list_summaries(status, &page)
        .await?;
    let rows: Vec<TripSummaryResponse> = rows.into_iter().map(Into::into).collect();

    Ok(Json(PageResponse::new(rows, page.page, page.per_page, total)))
}

/// POST `/trips` - Plan a trip.
async fn create_trip(
    State(state): State<AppState>,
    Json(payload): Json<CreateTripRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let trip = state
        .ledger()
        .create_trip(NewTrip {
            truck_id: TruckId::from_uuid(payload.truck_id),
            source: payload.source,
            destination: payload.destination,
            estimated_qty: payload.estimated_qty,
            rate_per_unit: payload.rate_per_unit,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(trip)))
}

/// GET `/trips/{trip_id}` - Ledger, live totals and closing snapshot.
async fn get_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = trip_detail(&state.ledger(), TripId::from_uuid(trip_id)).await?;
    Ok(Json(detail))
}

/// POST `/trips/{trip_id}/start` - PLANNED to ACTIVE.
async fn start_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let trip = state.ledger().start_trip(TripId::from_uuid(trip_id)).await?;
    Ok(Json(trip))
}

/// POST `/trips/{trip_id}/close` - ACTIVE to CLOSED, freezing the outcome.
async fn close_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
    Json(payload): Json<CloseTripRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let trip_id = TripId::from_uuid(trip_id);
    let trip = state.ledger().close_trip(trip_id, &payload.closed_by).await?;
    info!(trip_id = %trip_id, "Trip closed via API");
    Ok(Json(trip))
}

/// PUT `/trips/{trip_id}/actual-quantity` - Record the measured quantity.
async fn update_actual_quantity(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
    Json(payload): Json<ActualQuantityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let trip = state
        .ledger()
        .update_actual_qty(TripId::from_uuid(trip_id), payload.actual_qty)
        .await?;
    Ok(Json(trip))
}
