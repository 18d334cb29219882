//! Element service

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::entity::element::ElementType;
use crate::entity::{content, element, template};
use crate::error::{AppError, AppResult, OptionExt};
use crate::service::view::ElementView;
use crate::service::{require_name, Affected};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementInput {
    pub id: Option<Uuid>,
    pub template_id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub element_type: String,
    pub description: Option<String>,
    #[serde(default)]
    pub timeseries: bool,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    #[serde(default)]
    pub h: i32,
    #[serde(default)]
    pub w: i32,
}

pub struct ElementService {
    db: DatabaseConnection,
}

impl ElementService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get_elements_by_template(&self, template_id: Uuid) -> AppResult<Vec<element::Model>> {
        Ok(element::Entity::find()
            .filter(element::Column::TemplateId.eq(template_id))
            .order_by_asc(element::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Element with its contents, newest first
    pub async fn get_element_by_id(&self, id: Uuid) -> AppResult<ElementView> {
        let found = element::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found(format!("Element {} not found", id))?;
        let contents = content::Entity::find()
            .filter(content::Column::ElementId.eq(found.id))
            .order_by_desc(content::Column::Date)
            .all(&self.db)
            .await?;
        Ok(ElementView {
            element: found,
            contents: Some(contents),
        })
    }

    pub async fn save_element(&self, input: ElementInput) -> AppResult<element::Model> {
        let name = require_name(&input.name, "Element")?;
        let kind = ElementType::parse(&input.element_type)
            .ok_or_else(|| AppError::Validation(format!("Unknown element type: {}", input.element_type)))?;
        if input.h < 0 || input.w < 0 {
            return Err(AppError::Validation("Element size must not be negative".to_string()));
        }

        if template::Entity::find_by_id(input.template_id)
            .one(&self.db)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound(format!("Template {} not found", input.template_id)));
        }

        let existing = match input.id {
            Some(id) => element::Entity::find_by_id(id).one(&self.db).await?,
            None => None,
        };

        let mut active: element::ActiveModel = match existing {
            Some(model) => model.into(),
            None => element::ActiveModel {
                id: Set(input.id.unwrap_or_else(Uuid::new_v4)),
                ..Default::default()
            },
        };
        let is_new = active.created_at.is_not_set();
        active.template_id = Set(input.template_id);
        active.name = Set(name);
        active.element_type = Set(kind.as_str().to_string());
        active.description = Set(input.description);
        active.timeseries = Set(input.timeseries);
        active.x = Set(input.x);
        active.y = Set(input.y);
        active.h = Set(input.h);
        active.w = Set(input.w);

        let saved = if is_new {
            active.insert(&self.db).await?
        } else {
            active.update(&self.db).await?
        };
        Ok(saved)
    }

    pub async fn delete_element(&self, id: Uuid) -> AppResult<Affected> {
        Ok(element::Entity::delete_by_id(id).exec(&self.db).await?.into())
    }
}
