//! Truck repository.
//!
//! Plates are normalized before they reach the database, so the unique
//! index on `number_plate` is case- and whitespace-insensitive in effect.

use chrono::Utc;
use logisco_core::fleet::{FleetError, FleetRules, NewTruck, Truck, TruckUpdate};
use logisco_shared::types::{CompanyId, TruckId};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, SqlErr,
};
use tracing::info;

use super::company::CompanyRepository;
use crate::entities::trucks;

/// Truck registration and lookup.
#[derive(Debug, Clone)]
pub struct TruckRepository {
    db: DatabaseConnection,
}

impl TruckRepository {
    /// Creates a new truck repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Registers a truck under the company called `company_name`.
    ///
    /// # Errors
    ///
    /// - `NumberPlateRequired` for a blank plate
    /// - `InvalidFixedCost` for a non-positive daily cost
    /// - `DuplicateNumberPlate` if the normalized plate is taken
    pub async fn create(&self, company_name: &str, input: NewTruck) -> Result<Truck, FleetError> {
        let number_plate = FleetRules::normalize_plate(&input.number_plate)?;
        let daily_fixed_cost = input
            .daily_fixed_cost
            .map(FleetRules::validate_fixed_cost)
            .transpose()?;

        if self.find_by_plate(&number_plate).await?.is_some() {
            return Err(FleetError::DuplicateNumberPlate(number_plate));
        }

        let company = CompanyRepository::new(self.db.clone())
            .find_or_create(company_name)
            .await
            .map_err(db_err)?;

        let now = Utc::now();
        let model = trucks::ActiveModel {
            id: Set(TruckId::new().into_inner()),
            company_id: Set(company.id.into_inner()),
            number_plate: Set(number_plate.clone()),
            daily_fixed_cost: Set(daily_fixed_cost),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&self.db)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                FleetError::DuplicateNumberPlate(number_plate.clone())
            }
            _ => db_err(e),
        })?;

        info!(truck_id = %model.id, plate = %model.number_plate, "Truck registered");
        Ok(truck_from_model(model))
    }

    /// All trucks, newest first.
    pub async fn list(&self) -> Result<Vec<Truck>, FleetError> {
        let models = trucks::Entity::find()
            .order_by_desc(trucks::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(truck_from_model).collect())
    }

    /// All trucks ordered by plate, for pickers.
    pub async fn list_by_plate(&self) -> Result<Vec<Truck>, FleetError> {
        let models = trucks::Entity::find()
            .order_by_asc(trucks::Column::NumberPlate)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(truck_from_model).collect())
    }

    /// Finds a truck by ID.
    pub async fn find(&self, truck_id: TruckId) -> Result<Option<Truck>, FleetError> {
        let model = trucks::Entity::find_by_id(truck_id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(truck_from_model))
    }

    /// Finds a truck by its normalized plate.
    pub async fn find_by_plate(&self, number_plate: &str) -> Result<Option<Truck>, FleetError> {
        let model = trucks::Entity::find()
            .filter(trucks::Column::NumberPlate.eq(number_plate))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(truck_from_model))
    }

    /// Sets a truck's daily fixed cost.
    ///
    /// # Errors
    ///
    /// - `InvalidFixedCost` for a non-positive cost
    /// - `TruckNotFound` if the truck does not exist
    pub async fn update(&self, truck_id: TruckId, update: TruckUpdate) -> Result<Truck, FleetError> {
        let cost = FleetRules::validate_fixed_cost(update.daily_fixed_cost)?;

        let existing = trucks::Entity::find_by_id(truck_id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(FleetError::TruckNotFound(truck_id))?;

        let mut active: trucks::ActiveModel = existing.into();
        active.daily_fixed_cost = Set(Some(cost));
        active.updated_at = Set(Utc::now().into());
        let model = active.update(&self.db).await.map_err(db_err)?;

        info!(truck_id = %truck_id, daily_fixed_cost = %cost, "Truck updated");
        Ok(truck_from_model(model))
    }
}

fn db_err(e: DbErr) -> FleetError {
    FleetError::Database(e.to_string())
}

fn truck_from_model(model: trucks::Model) -> Truck {
    Truck {
        id: TruckId::from_uuid(model.id),
        company_id: CompanyId::from_uuid(model.company_id),
        number_plate: model.number_plate,
        daily_fixed_cost: model.daily_fixed_cost,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
