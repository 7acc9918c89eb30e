//! `SeaORM` entity for `trips`.
//!
//! The `final_*`, `closed_at` and `closed_by` columns are the closing
//! snapshot. They are either all NULL or all set, and set exactly when
//! `status` is CLOSED.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::TripStatus;

#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "trips")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub truck_id: Uuid,
    pub source: String,
    pub destination: String,
    pub status: TripStatus,
    #[sea_orm(column_type = "Decimal(Some((14, 3)))", nullable)]
    pub estimated_qty: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((14, 3)))", nullable)]
    pub actual_qty: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))", nullable)]
    pub rate_per_unit: Option<Decimal>,
    pub start_date: Option<DateTimeWithTimeZone>,
    pub end_date: Option<DateTimeWithTimeZone>,
    #[sea_orm(column_type = "Decimal(Some((28, 2)))", nullable)]
    pub final_revenue: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((28, 2)))", nullable)]
    pub final_expenses: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((28, 2)))", nullable)]
    pub final_balance: Option<Decimal>,
    pub closed_at: Option<DateTimeWithTimeZone>,
    pub closed_by: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[allow(missing_docs)]
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::trucks::Entity",
        from = "Column::TruckId",
        to = "super::trucks::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Trucks,
    #[sea_orm(has_many = "super::expenses::Entity")]
    Expenses,
    #[sea_orm(has_many = "super::payments::Entity")]
    Payments,
}

impl Related<super::trucks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trucks.def()
    }
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
