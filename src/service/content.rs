//! Content service

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::entity::{content, element};
use crate::error::{AppError, AppResult, OptionExt};
use crate::service::Affected;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentInput {
    pub id: Option<Uuid>,
    pub element_id: Uuid,
    pub date: NaiveDate,
    pub title: String,
    pub data: serde_json::Value,
    pub config: Option<serde_json::Value>,
}

pub struct ContentService {
    db: DatabaseConnection,
}

impl ContentService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get_contents_by_element(&self, element_id: Uuid) -> AppResult<Vec<content::Model>> {
        Ok(content::Entity::find()
            .filter(content::Column::ElementId.eq(element_id))
            .order_by_desc(content::Column::Date)
            .all(&self.db)
            .await?)
    }

    pub async fn get_content_by_id(&self, id: Uuid) -> AppResult<content::Model> {
        content::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found(format!("Content {} not found", id))
    }

    pub async fn save_content(&self, input: ContentInput) -> AppResult<content::Model> {
        if input.title.trim().is_empty() {
            return Err(AppError::Validation("Content title must not be empty".to_string()));
        }
        if element::Entity::find_by_id(input.element_id)
            .one(&self.db)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound(format!("Element {} not found", input.element_id)));
        }

        let existing = match input.id {
            Some(id) => content::Entity::find_by_id(id).one(&self.db).await?,
            None => None,
        };

        let saved = match existing {
            Some(model) => {
                let mut active: content::ActiveModel = model.into();
                active.element_id = Set(input.element_id);
                active.date = Set(input.date);
                active.title = Set(input.title);
                active.data = Set(input.data);
                active.config = Set(input.config);
                active.update(&self.db).await?
            }
            None => {
                content::ActiveModel {
                    id: Set(input.id.unwrap_or_else(Uuid::new_v4)),
                    element_id: Set(input.element_id),
                    date: Set(input.date),
                    title: Set(input.title),
                    data: Set(input.data),
                    config: Set(input.config),
                    ..Default::default()
                }
                .insert(&self.db)
                .await?
            }
        };
        Ok(saved)
    }

    pub async fn delete_content(&self, id: Uuid) -> AppResult<Affected> {
        Ok(content::Entity::delete_by_id(id).exec(&self.db).await?.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;
    use crate::service::fixtures;
    use serde_json::json;

    fn input(element_id: Uuid, date: &str, title: &str) -> ContentInput {
        ContentInput {
            id: None,
            element_id,
            date: date.parse().unwrap(),
            title: title.to_string(),
            data: json!({"rows": [[1, 2], [3, 4]]}),
            config: None,
        }
    }

    #[tokio::test]
    async fn test_contents_newest_first() {
        let db = test_database().await;
        fixtures::category(&db, "Macro").await;
        let dashboard = fixtures::dashboard(&db, "Macro", "Rates").await;
        let template = fixtures::template(&db, dashboard, "Overview", 0).await;
        let element = fixtures::element(&db, template, "Summary").await;
        let service = ContentService::new(db);

        service.save_content(input(element, "2021-01-04", "Monday")).await.unwrap();
        service.save_content(input(element, "2021-01-06", "Wednesday")).await.unwrap();
        service.save_content(input(element, "2021-01-05", "Tuesday")).await.unwrap();

        let titles: Vec<String> = service
            .get_contents_by_element(element)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.title)
            .collect();
        assert_eq!(titles, vec!["Wednesday", "Tuesday", "Monday"]);
    }

    #[tokio::test]
    async fn test_update_content_keeps_id() {
        let db = test_database().await;
        fixtures::category(&db, "Macro").await;
        let dashboard = fixtures::dashboard(&db, "Macro", "Rates").await;
        let template = fixtures::template(&db, dashboard, "Overview", 0).await;
        let element = fixtures::element(&db, template, "Summary").await;
        let service = ContentService::new(db);

        let created = service.save_content(input(element, "2021-01-04", "Draft")).await.unwrap();
        let mut change = input(element, "2021-01-04", "Final");
        change.id = Some(created.id);
        change.config = Some(json!({"precision": 2}));
        service.save_content(change).await.unwrap();

        let stored = service.get_content_by_id(created.id).await.unwrap();
        assert_eq!(stored.title, "Final");
        assert_eq!(stored.config, Some(json!({"precision": 2})));
    }

    #[tokio::test]
    async fn test_content_needs_element() {
        let db = test_database().await;
        let service = ContentService::new(db);
        let err = service
            .save_content(input(Uuid::new_v4(), "2021-01-04", "Orphan"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
