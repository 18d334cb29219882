//! Element entity - a widget placed on a template grid
//!
//! Table: element

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::stamp_timestamps;

/// Kinds of widget an element can render
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementType {
    EmbedLink,
    Text,
    Image,
    Table,
    Lines,
    Bar,
    Pie,
    Scatter,
}

impl ElementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::EmbedLink => "embedLink",
            ElementType::Text => "text",
            ElementType::Image => "image",
            ElementType::Table => "table",
            ElementType::Lines => "lines",
            ElementType::Bar => "bar",
            ElementType::Pie => "pie",
            ElementType::Scatter => "scatter",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "embedLink" => Some(ElementType::EmbedLink),
            "text" => Some(ElementType::Text),
            "image" => Some(ElementType::Image),
            "table" => Some(ElementType::Table),
            "lines" => Some(ElementType::Lines),
            "bar" => Some(ElementType::Bar),
            "pie" => Some(ElementType::Pie),
            "scatter" => Some(ElementType::Scatter),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "element")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub template_id: Uuid,

    #[sea_orm(column_type = "String(Some(128))")]
    pub name: String,

    /// Widget kind, see [`ElementType`]
    #[serde(rename = "type")]
    #[sea_orm(column_name = "type", column_type = "String(Some(32))")]
    pub element_type: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// Whether contents are addressed by date
    pub timeseries: bool,

    // grid position
    pub x: i32,
    pub y: i32,
    pub h: i32,
    pub w: i32,

    #[serde(skip)]
    pub created_at: i64,

    #[serde(skip)]
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::template::Entity",
        from = "Column::TemplateId",
        to = "super::template::Column::Id",
        on_delete = "Cascade"
    )]
    Template,
    #[sea_orm(has_many = "super::content::Entity")]
    Contents,
    #[sea_orm(has_many = "super::record::Entity")]
    Records,
}

impl Related<super::template::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Template.def()
    }
}

impl Related<super::content::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contents.def()
    }
}

impl Related<super::record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Records.def()
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_type_names() {
        assert_eq!(ElementType::EmbedLink.as_str(), "embedLink");
        assert_eq!(ElementType::parse("pie"), Some(ElementType::Pie));
        assert_eq!(ElementType::parse("Pie"), None);
    }
}
