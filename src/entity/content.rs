//! Content entity - the data an element displays
//!
//! Table: content

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::stamp_timestamps;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "content")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub element_id: Uuid,

    /// Business date the content refers to
    pub date: Date,

    #[sea_orm(column_type = "String(Some(256))")]
    pub title: String,

    #[sea_orm(column_type = "Json")]
    pub data: Json,

    #[sea_orm(column_type = "Json", nullable)]
    pub config: Option<Json>,

    #[serde(skip)]
    pub created_at: i64,

    #[serde(skip)]
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::element::Entity",
        from = "Column::ElementId",
        to = "super::element::Column::Id",
        on_delete = "Cascade"
    )]
    Element,
}

impl Related<super::element::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Element.def()
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
