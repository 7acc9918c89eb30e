//! Truck routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, Utc};
use logisco_core::fleet::{NewTruck, Truck, TruckUpdate};
use logisco_db::TruckRepository;
use logisco_shared::types::TruckId;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;

/// Creates the truck routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/trucks", get(list_trucks).post(create_truck))
        .route("/trucks/{truck_id}", get(get_truck).patch(update_truck))
}

/// A truck as returned by the API.
#[derive(Debug, Serialize)]
pub struct TruckResponse {
    /// Truck ID.
    pub id: TruckId,
    /// Normalized plate.
    pub number_plate: String,
    /// Daily fixed cost, if set.
    pub daily_fixed_cost: Option<Decimal>,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

impl From<Truck> for TruckResponse {
    fn from(truck: Truck) -> Self {
        Self {
            id: truck.id,
            number_plate: truck.number_plate,
            daily_fixed_cost: truck.daily_fixed_cost,
            created_at: truck.created_at,
        }
    }
}

/// GET `/trucks` - All trucks, newest first.
async fn list_trucks(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let trucks = TruckRepository::new((*state.db).clone()).list().await?;
    let trucks: Vec<TruckResponse> = trucks.into_iter().map(Into::into).collect();
    Ok(Json(json!({ "trucks": trucks })))
}

/// POST `/trucks` - Register a truck.
async fn create_truck(
    State(state): State<AppState>,
    Json(payload): Json<NewTruck>,
) -> Result<impl IntoResponse, ApiError> {
    let truck = TruckRepository::new((*state.db).clone())
        .create(&state.company_name, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(TruckResponse::from(truck))))
}

/// GET `/trucks/{truck_id}` - Truck detail.
async fn get_truck(
    State(state): State<AppState>,
    Path(truck_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let truck_id = TruckId::from_uuid(truck_id);
    let truck = TruckRepository::new((*state.db).clone())
        .find(truck_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Truck {truck_id} not found")))?;
    Ok(Json(TruckResponse::from(truck)))
}

/// PATCH `/trucks/{truck_id}` - Set the daily fixed cost.
async fn update_truck(
    State(state): State<AppState>,
    Path(truck_id): Path<Uuid>,
    Json(payload): Json<TruckUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let truck = TruckRepository::new((*state.db).clone())
        .update(TruckId::from_uuid(truck_id), payload)
        .await?;
    Ok(Json(TruckResponse::from(truck)))
}
