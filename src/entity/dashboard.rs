//! Dashboard entity
//!
//! Table: dashboard. A dashboard lives in exactly one category and its name
//! is unique within that category (enforced by an index built in `db.rs`).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::stamp_timestamps;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "dashboard")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owning category
    #[sea_orm(column_type = "String(Some(64))")]
    pub category_name: String,

    #[sea_orm(column_type = "String(Some(128))")]
    pub name: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    #[serde(skip)]
    pub created_at: i64,

    #[serde(skip)]
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryName",
        to = "super::category::Column::Name",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Category,
    #[sea_orm(has_many = "super::template::Entity")]
    Templates,
    #[sea_orm(has_many = "super::record::Entity")]
    Records,
    #[sea_orm(has_many = "super::author_dashboard::Entity")]
    AuthorDashboards,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::template::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Templates.def()
    }
}

impl Related<super::record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Records.def()
    }
}

impl Related<super::author::Entity> for Entity {
    fn to() -> RelationDef {
        super::author_dashboard::Relation::Author.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::author_dashboard::Relation::Dashboard.def().rev())
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        stamp_timestamps(&mut self.created_at, &mut self.updated_at, insert);
        Ok(self)
    }
}
