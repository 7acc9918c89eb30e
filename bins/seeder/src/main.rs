//! Database seeder for Logisco development and testing.
//!
//! Seeds the default company and one demo truck. Safe to run repeatedly.
//!
//! Usage: cargo run --bin seeder

use logisco_core::fleet::NewTruck;
use logisco_db::{CompanyRepository, TruckRepository};
use logisco_shared::AppConfig;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;

/// Plate of the demo truck, already in normalized form.
const DEMO_PLATE: &str = "TN09AB1234";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    println!("Connecting to database...");
    let db = logisco_db::connect(&config.database).await?;

    let company_name = config.company.default_name.as_str();
    println!("Seeding company '{company_name}'...");
    CompanyRepository::new(db.clone())
        .find_or_create(company_name)
        .await?;

    println!("Seeding demo truck...");
    seed_demo_truck(db, company_name).await?;

    println!("Seeding complete!");
    Ok(())
}

async fn seed_demo_truck(db: DatabaseConnection, company_name: &str) -> anyhow::Result<()> {
    let trucks = TruckRepository::new(db);
    if trucks.find_by_plate(DEMO_PLATE).await?.is_some() {
        println!("  Demo truck already exists, skipping...");
        return Ok(());
    }

    let truck = trucks
        .create(
            company_name,
            NewTruck {
                number_plate: DEMO_PLATE.to_string(),
                daily_fixed_cost: Some(Decimal::new(1500, 0)),
            },
        )
        .await?;
    println!("  Created truck {} ({})", truck.number_plate, truck.id);
    Ok(())
}
