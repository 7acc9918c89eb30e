//! Database migration runner for Logisco.
//!
//! Usage:
//!   migrator up      - Apply pending migrations (tables, enums, closed-trip triggers)
//!   migrator down    - Roll back the last migration
//!   migrator status  - Show migration status
//!   migrator fresh   - Drop everything and re-apply

use logisco_db::migration::Migrator;
use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Reads DATABASE_URL and sets up its own tracing.
    cli::run_cli(Migrator).await;
}
