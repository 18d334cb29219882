//! Template service

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::entity::{dashboard, template};
use crate::error::{AppError, AppResult, OptionExt};
use crate::service::view::{load_elements, TemplateView};
use crate::service::{require_name, Affected};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateInput {
    pub id: Option<Uuid>,
    pub dashboard_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub index: i32,
    pub description: Option<String>,
}

pub struct TemplateService {
    db: DatabaseConnection,
}

impl TemplateService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get_templates_by_dashboard(&self, dashboard_id: Uuid) -> AppResult<Vec<template::Model>> {
        Ok(template::Entity::find()
            .filter(template::Column::DashboardId.eq(dashboard_id))
            .order_by_asc(template::Column::Index)
            .all(&self.db)
            .await?)
    }

    /// Template with its elements (and their contents)
    pub async fn get_template_by_id(&self, id: Uuid) -> AppResult<TemplateView> {
        let found = template::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found(format!("Template {} not found", id))?;
        let mut elements = load_elements(&self.db, vec![found.id], true).await?;
        Ok(TemplateView {
            elements: Some(elements.remove(&found.id).unwrap_or_default()),
            template: found,
        })
    }

    pub async fn save_template(&self, input: TemplateInput) -> AppResult<template::Model> {
        let name = require_name(&input.name, "Template")?;

        if dashboard::Entity::find_by_id(input.dashboard_id)
            .one(&self.db)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound(format!("Dashboard {} not found", input.dashboard_id)));
        }

        let existing = match input.id {
            Some(id) => template::Entity::find_by_id(id).one(&self.db).await?,
            None => None,
        };

        let saved = match existing {
            Some(model) => {
                let mut active: template::ActiveModel = model.into();
                active.dashboard_id = Set(input.dashboard_id);
                active.name = Set(name);
                active.index = Set(input.index);
                active.description = Set(input.description);
                active.update(&self.db).await?
            }
            None => {
                template::ActiveModel {
                    id: Set(input.id.unwrap_or_else(Uuid::new_v4)),
                    dashboard_id: Set(input.dashboard_id),
                    name: Set(name),
                    index: Set(input.index),
                    description: Set(input.description),
                    ..Default::default()
                }
                .insert(&self.db)
                .await?
            }
        };
        Ok(saved)
    }

    pub async fn delete_template(&self, id: Uuid) -> AppResult<Affected> {
        Ok(template::Entity::delete_by_id(id).exec(&self.db).await?.into())
    }
}
