//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod dashboard;
pub mod expenses;
pub mod health;
pub mod payments;
pub mod trips;
pub mod trucks;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(trucks::routes())
        .merge(trips::routes())
        .merge(expenses::routes())
        .merge(payments::routes())
        .merge(dashboard::routes())
}
