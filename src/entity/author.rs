//! Author entity
//!
//! Table: author. Authors are keyed by e-mail, which is what the upstream
//! identity header carries.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::stamp_timestamps;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "author")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "String(Some(128))")]
    pub email: String,

    #[sea_orm(column_type = "String(Some(64))", nullable)]
    pub nickname: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    #[serde(skip)]
    pub created_at: i64,

    #[serde(skip)]
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::author_dashboard::Entity")]
    AuthorDashboards,
    #[sea_orm(has_many = "super::record::Entity")]
    Records,
}

impl Related<super::record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Records.def()
    }
}

impl Related<super::dashboard::Entity> for Entity {
    fn to() -> RelationDef {
        super::author_dashboard::Relation::Dashboard.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::author_dashboard::Relation::Author.def().rev())
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
