//! Dashboard route: status strip and the latest trips.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use logisco_core::dashboard::StatusStrip;
use logisco_db::{DashboardRepository, TripRepository};
use logisco_shared::types::{Money, PageRequest};
use serde::Serialize;

use crate::AppState;
use crate::error::ApiError;
use crate::routes::trips::TripSummaryResponse;

/// Trips shown under the status strip.
const RECENT_TRIPS: u32 = 20;

/// Creates the dashboard routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(get_dashboard))
}

/// Dashboard payload.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    /// Active trip count and cash deployed.
    #[serde(flatten)]
    pub strip: StatusStrip,
    /// Cash deployed formatted as rupees.
    pub cash_deployed_label: String,
    /// Latest trips, newest first.
    pub trips: Vec<TripSummaryResponse>,
}

/// GET `/dashboard`
async fn get_dashboard(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let db = (*state.db).clone();
    let strip = DashboardRepository::new(db.clone()).status_strip().await?;
    let page = PageRequest {
        page: 1,
        per_page: RECENT_TRIPS,
    };
    let (trips, _) = TripRepository::new(db).list_summaries(None, &page).await?;

    Ok(Json(DashboardResponse {
        cash_deployed_label: Money::inr(strip.cash_deployed).to_string(),
        strip,
        trips: trips.into_iter().map(Into::into).collect(),
    }))
}
