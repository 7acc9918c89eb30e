//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes for trucks, trips, expenses, payments and the dashboard
//! - JSON error responses
//! - Shared application state

pub mod error;
pub mod routes;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use logisco_core::storage::StorageService;
use logisco_core::trip::{DEFAULT_BILL_URL_TTL_SECS, TripLedgerService};
use logisco_db::TripRepository;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Headroom on top of the bill size limit for the other multipart fields.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Trip ledger service as wired for HTTP handlers.
pub type LedgerService = TripLedgerService<TripRepository, StorageService>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Bill object storage.
    pub storage: Arc<StorageService>,
    /// Company new trucks are registered under.
    pub company_name: Arc<str>,
    /// Lifetime of temporary bill URLs.
    pub bill_url_ttl_secs: u64,
}

impl AppState {
    /// Creates state with the default bill URL lifetime.
    pub fn new(
        db: DatabaseConnection,
        storage: StorageService,
        company_name: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            db: Arc::new(db),
            storage: Arc::new(storage),
            company_name: company_name.into(),
            bill_url_ttl_secs: DEFAULT_BILL_URL_TTL_SECS,
        }
    }

    /// Sets the temporary bill URL lifetime.
    #[must_use]
    pub fn with_bill_url_ttl(mut self, secs: u64) -> Self {
        self.bill_url_ttl_secs = secs;
        self
    }

    /// Request-scoped trip ledger service.
    pub fn ledger(&self) -> LedgerService {
        TripLedgerService::new(
            Arc::new(TripRepository::new((*self.db).clone())),
            Arc::clone(&self.storage),
        )
        .with_bill_url_ttl(self.bill_url_ttl_secs)
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    let body_limit = usize::try_from(state.storage.config().max_file_size)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
