//! Company repository.

use chrono::Utc;
use logisco_core::fleet::Company;
use logisco_shared::types::CompanyId;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    sea_query::OnConflict,
};
use tracing::info;

use crate::entities::companies;

/// Company lookups.
#[derive(Debug, Clone)]
pub struct CompanyRepository {
    db: DatabaseConnection,
}

impl CompanyRepository {
    /// Creates a new company repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a company by its exact name.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Company>, DbErr> {
        let model = companies::Entity::find()
            .filter(companies::Column::Name.eq(name))
            .one(&self.db)
            .await?;
        Ok(model.map(company_from_model))
    }

    /// Returns the company called `name`, creating it on first use.
    ///
    /// Concurrent callers race on the unique name; the loser reads the
    /// winner's row.
    pub async fn find_or_create(&self, name: &str) -> Result<Company, DbErr> {
        if let Some(company) = self.find_by_name(name).await? {
            return Ok(company);
        }

        let model = companies::ActiveModel {
            id: Set(CompanyId::new().into_inner()),
            name: Set(name.to_string()),
            created_at: Set(Utc::now().into()),
        };
        let inserted = companies::Entity::insert(model)
            .on_conflict(
                OnConflict::column(companies::Column::Name)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        if inserted > 0 {
            info!(company = %name, "Company created");
        }

        self.find_by_name(name)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("company '{name}'")))
    }
}

fn company_from_model(model: companies::Model) -> Company {
    Company {
        id: CompanyId::from_uuid(model.id),
        name: model.name,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
