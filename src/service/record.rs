//! Record service
//!
//! A record pins an author's note to one element. The element, its template
//! and the dashboard must form a chain; the author always comes from the
//! caller's identity, never from the payload.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::entity::{element, record, template};
use crate::error::{AppError, AppResult, OptionExt};
use crate::service::author::normalize_email;
use crate::service::Affected;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordInput {
    pub dashboard_id: Uuid,
    pub template_id: Uuid,
    pub element_id: Uuid,
    pub note: Option<String>,
}

pub struct RecordService {
    db: DatabaseConnection,
}

impl RecordService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get_records_by_dashboard(&self, dashboard_id: Uuid) -> AppResult<Vec<record::Model>> {
        Ok(record::Entity::find()
            .filter(record::Column::DashboardId.eq(dashboard_id))
            .order_by_desc(record::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    pub async fn get_records_by_author(&self, email: &str) -> AppResult<Vec<record::Model>> {
        let email = normalize_email(email)?;
        Ok(record::Entity::find()
            .filter(record::Column::AuthorEmail.eq(email))
            .order_by_desc(record::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    pub async fn get_record_by_id(&self, id: Uuid) -> AppResult<record::Model> {
        record::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found(format!("Record {} not found", id))
    }

    pub async fn create_record(&self, author_email: &str, input: RecordInput) -> AppResult<record::Model> {
        let element = element::Entity::find_by_id(input.element_id)
            .one(&self.db)
            .await?
            .ok_or_not_found(format!("Element {} not found", input.element_id))?;
        if element.template_id != input.template_id {
            return Err(AppError::BadRequest(format!(
                "Element {} does not belong to template {}",
                element.id, input.template_id
            )));
        }

        let template = template::Entity::find_by_id(input.template_id)
            .one(&self.db)
            .await?
            .ok_or_not_found(format!("Template {} not found", input.template_id))?;
        if template.dashboard_id != input.dashboard_id {
            return Err(AppError::BadRequest(format!(
                "Template {} does not belong to dashboard {}",
                template.id, input.dashboard_id
            )));
        }

        let created = record::ActiveModel {
            id: Set(Uuid::new_v4()),
            author_email: Set(author_email.to_string()),
            dashboard_id: Set(input.dashboard_id),
            template_id: Set(input.template_id),
            element_id: Set(input.element_id),
            note: Set(input.note),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        tracing::debug!("Author {} recorded on element {}", author_email, created.element_id);
        Ok(created)
    }

    pub async fn delete_record(&self, id: Uuid) -> AppResult<Affected> {
        Ok(record::Entity::delete_by_id(id).exec(&self.db).await?.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;
    use crate::service::{fixtures, AuthorService, DashboardService};

    #[tokio::test]
    async fn test_create_and_list_records() {
        let db = test_database().await;
        fixtures::category(&db, "Macro").await;
        let dashboard = fixtures::dashboard(&db, "Macro", "Rates").await;
        let template = fixtures::template(&db, dashboard, "Overview", 0).await;
        let element = fixtures::element(&db, template, "Summary").await;
        AuthorService::new(db.clone()).ensure_author("jacob@example.com").await.unwrap();

        let service = RecordService::new(db.clone());
        let created = service
            .create_record(
                "jacob@example.com",
                RecordInput {
                    dashboard_id: dashboard,
                    template_id: template,
                    element_id: element,
                    note: Some("spread widened".to_string()),
                },
            )
            .await
            .unwrap();
        assert!(created.created_at > 0);

        assert_eq!(service.get_records_by_dashboard(dashboard).await.unwrap().len(), 1);
        assert_eq!(service.get_records_by_author("jacob@example.com").await.unwrap().len(), 1);

        // records follow their dashboard
        DashboardService::new(db).delete_dashboard(dashboard).await.unwrap();
        assert!(service.get_records_by_dashboard(dashboard).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_broken_chain_rejected() {
        let db = test_database().await;
        fixtures::category(&db, "Macro").await;
        let dashboard = fixtures::dashboard(&db, "Macro", "Rates").await;
        let other = fixtures::dashboard(&db, "Macro", "FX").await;
        let template = fixtures::template(&db, dashboard, "Overview", 0).await;
        let element = fixtures::element(&db, template, "Summary").await;
        AuthorService::new(db.clone()).ensure_author("jacob@example.com").await.unwrap();

        let service = RecordService::new(db);
        let err = service
            .create_record(
                "jacob@example.com",
                RecordInput {
                    dashboard_id: other,
                    template_id: template,
                    element_id: element,
                    note: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
