//! `SeaORM` entities, one module per table.

pub mod prelude;

pub mod companies;
pub mod expenses;
pub mod payments;
pub mod sea_orm_active_enums;
pub mod trips;
pub mod trucks;
