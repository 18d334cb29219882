//! Category service

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;

use crate::entity::{category, dashboard};
use crate::error::{AppResult, OptionExt};
use crate::service::view::CategoryView;
use crate::service::{require_name, Affected};

/// Create/update payload; the name doubles as the key
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub name: String,
    pub description: Option<String>,
}

pub struct CategoryService {
    db: DatabaseConnection,
}

impl CategoryService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get_all_categories(&self) -> AppResult<Vec<category::Model>> {
        Ok(category::Entity::find()
            .order_by_asc(category::Column::Name)
            .all(&self.db)
            .await?)
    }

    pub async fn get_category_by_name(&self, name: &str) -> AppResult<category::Model> {
        category::Entity::find_by_id(name.to_string())
            .one(&self.db)
            .await?
            .ok_or_not_found(format!("Category {} not found", name))
    }

    /// Category together with the dashboards it holds
    pub async fn get_category_with_dashboards(&self, name: &str) -> AppResult<CategoryView> {
        let category = self.get_category_by_name(name).await?;
        let dashboards = dashboard::Entity::find()
            .filter(dashboard::Column::CategoryName.eq(category.name.as_str()))
            .order_by_asc(dashboard::Column::Name)
            .all(&self.db)
            .await?;
        Ok(CategoryView {
            category,
            dashboards,
        })
    }

    /// Insert, or overwrite the description of an existing category
    pub async fn save_category(&self, input: CategoryInput) -> AppResult<category::Model> {
        let name = require_name(&input.name, "Category")?;

        let existing = category::Entity::find_by_id(name.clone()).one(&self.db).await?;
        let saved = match existing {
            Some(model) => {
                let mut active: category::ActiveModel = model.into();
                active.description = Set(input.description);
                active.update(&self.db).await?
            }
            None => {
                category::ActiveModel {
                    name: Set(name),
                    description: Set(input.description),
                    ..Default::default()
                }
                .insert(&self.db)
                .await?
            }
        };

        tracing::info!("Saved category {}", saved.name);
        Ok(saved)
    }

    /// Delete a category; its dashboards go with it
    pub async fn delete_category(&self, name: &str) -> AppResult<Affected> {
        let res = category::Entity::delete_by_id(name.to_string())
            .exec(&self.db)
            .await?;
        if res.rows_affected > 0 {
            tracing::info!("Deleted category {}", name);
        }
        Ok(res.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;
    use crate::error::AppError;
    use crate::service::fixtures;

    #[tokio::test]
    async fn test_save_category_upserts_by_name() {
        let db = test_database().await;
        let service = CategoryService::new(db.clone());

        service
            .save_category(CategoryInput {
                name: "Macro".to_string(),
                description: None,
            })
            .await
            .unwrap();
        let updated = service
            .save_category(CategoryInput {
                name: " Macro ".to_string(),
                description: Some("rates and FX".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(updated.description.as_deref(), Some("rates and FX"));
        assert_eq!(service.get_all_categories().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_category_is_not_found() {
        let db = test_database().await;
        let service = CategoryService::new(db);
        let err = service.get_category_by_name("nope").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_category_cascades_dashboards() {
        let db = test_database().await;
        fixtures::category(&db, "Macro").await;
        fixtures::dashboard(&db, "Macro", "Rates").await;
        fixtures::dashboard(&db, "Macro", "FX").await;

        let service = CategoryService::new(db.clone());
        let view = service.get_category_with_dashboards("Macro").await.unwrap();
        let names: Vec<_> = view.dashboards.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["FX", "Rates"]);

        assert_eq!(service.delete_category("Macro").await.unwrap().affected, 1);
        assert!(dashboard::Entity::find().all(&db).await.unwrap().is_empty());
    }
}
