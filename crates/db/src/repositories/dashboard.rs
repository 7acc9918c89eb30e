//! Dashboard repository for the status strip.

use logisco_core::dashboard::StatusStrip;
use logisco_core::trip::TripStatus;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect,
    RelationTrait,
    sea_query::{Expr, JoinType},
};

use super::trip::status_to_db;
use crate::entities::{expenses, trips};

/// Aggregate queries for the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardRepository {
    db: DatabaseConnection,
}

impl DashboardRepository {
    /// Creates a new dashboard repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Active trip count and the expenses spent on them so far.
    pub async fn status_strip(&self) -> Result<StatusStrip, DbErr> {
        let active = status_to_db(TripStatus::Active);

        let active_trips = trips::Entity::find()
            .filter(trips::Column::Status.eq(active))
            .count(&self.db)
            .await?;

        let cash_deployed: Option<Decimal> = expenses::Entity::find()
            .select_only()
            .column_as(Expr::col((expenses::Entity, expenses::Column::Amount)).sum(), "total")
            .join(JoinType::InnerJoin, expenses::Relation::Trips.def())
            .filter(trips::Column::Status.eq(active))
            .into_tuple::<Option<Decimal>>()
            .one(&self.db)
            .await?
            .flatten();

        Ok(StatusStrip {
            active_trips,
            cash_deployed: cash_deployed.unwrap_or(Decimal::ZERO),
        })
    }
}
