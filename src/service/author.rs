//! Author service
//!
//! Besides plain CRUD this owns the author/dashboard binding used when an
//! authenticated user creates dashboards.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    ModelTrait, QueryFilter, QueryOrder, Set, SqlErr,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::{author, author_dashboard, dashboard};
use crate::error::{AppError, AppResult, OptionExt};
use crate::service::Affected;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorInput {
    pub email: String,
    pub nickname: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorView {
    #[serde(flatten)]
    pub author: author::Model,
    pub dashboards: Vec<dashboard::Model>,
}

pub struct AuthorService {
    db: DatabaseConnection,
}

impl AuthorService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get_all_authors(&self) -> AppResult<Vec<author::Model>> {
        Ok(author::Entity::find()
            .order_by_asc(author::Column::Email)
            .all(&self.db)
            .await?)
    }

    pub async fn get_author_by_email(&self, email: &str) -> AppResult<author::Model> {
        let email = normalize_email(email)?;
        author::Entity::find_by_id(email.clone())
            .one(&self.db)
            .await?
            .ok_or_not_found(format!("Author {} not found", email))
    }

    /// Author with the dashboards bound to them
    pub async fn get_author_with_dashboards(&self, email: &str) -> AppResult<AuthorView> {
        let author = self.get_author_by_email(email).await?;
        let dashboards = author
            .find_related(dashboard::Entity)
            .order_by_asc(dashboard::Column::Name)
            .all(&self.db)
            .await?;
        Ok(AuthorView { author, dashboards })
    }

    pub async fn save_author(&self, input: AuthorInput) -> AppResult<author::Model> {
        let email = normalize_email(&input.email)?;

        let existing = author::Entity::find_by_id(email.clone()).one(&self.db).await?;
        let saved = match existing {
            Some(model) => {
                let mut active: author::ActiveModel = model.into();
                active.nickname = Set(input.nickname);
                active.description = Set(input.description);
                active.update(&self.db).await?
            }
            None => {
                author::ActiveModel {
                    email: Set(email),
                    nickname: Set(input.nickname),
                    description: Set(input.description),
                    ..Default::default()
                }
                .insert(&self.db)
                .await?
            }
        };
        Ok(saved)
    }

    pub async fn delete_author(&self, email: &str) -> AppResult<Affected> {
        let res = author::Entity::delete_by_id(normalize_email(email)?)
            .exec(&self.db)
            .await?;
        Ok(res.into())
    }

    /// Make sure an author row exists for an identity seen at the gateway
    pub async fn ensure_author(&self, email: &str) -> AppResult<author::Model> {
        let email = normalize_email(email)?;
        if let Some(found) = author::Entity::find_by_id(email.clone()).one(&self.db).await? {
            return Ok(found);
        }

        let created = author::ActiveModel {
            email: Set(email.clone()),
            ..Default::default()
        }
        .insert(&self.db)
        .await;

        match created {
            Ok(model) => {
                tracing::info!("Registered new author {}", model.email);
                Ok(model)
            }
            // Lost a race with a concurrent first request
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                self.get_author_by_email(&email).await
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn bind_dashboards_to_author(&self, email: &str, dashboard_ids: &[Uuid]) -> AppResult<Affected> {
        let author = self.get_author_by_email(email).await?;
        let bound = bind_dashboards(&self.db, &author.email, dashboard_ids).await?;
        Ok(Affected { affected: bound })
    }

    pub async fn unbind_dashboards_from_author(&self, email: &str, dashboard_ids: &[Uuid]) -> AppResult<Affected> {
        if dashboard_ids.is_empty() {
            return Ok(Affected { affected: 0 });
        }
        let email = normalize_email(email)?;
        let res = author_dashboard::Entity::delete_many()
            .filter(author_dashboard::Column::AuthorEmail.eq(email))
            .filter(author_dashboard::Column::DashboardId.is_in(dashboard_ids.to_vec()))
            .exec(&self.db)
            .await?;
        Ok(res.into())
    }
}

/// Bind dashboards to an author, skipping unknown dashboards and existing bindings.
///
/// Generic over the connection so it can run inside a caller's transaction.
/// Returns the number of new bindings.
pub async fn bind_dashboards<C: ConnectionTrait>(
    conn: &C,
    email: &str,
    dashboard_ids: &[Uuid],
) -> Result<u64, DbErr> {
    let mut bound = 0;
    for id in dashboard_ids {
        if dashboard::Entity::find_by_id(*id).one(conn).await?.is_none() {
            continue;
        }

        let existing = author_dashboard::Entity::find_by_id((email.to_string(), *id))
            .one(conn)
            .await?;
        if existing.is_some() {
            continue;
        }

        author_dashboard::ActiveModel {
            author_email: Set(email.to_string()),
            dashboard_id: Set(*id),
        }
        .insert(conn)
        .await?;
        bound += 1;
    }
    Ok(bound)
}

/// E-mail keys are stored trimmed and lowercased
pub(crate) fn normalize_email(email: &str) -> AppResult<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Validation(format!("'{}' is not an e-mail address", email)));
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;
    use crate::service::fixtures;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email(" A@B.com ").unwrap(), "a@b.com");
        assert!(normalize_email("nobody").is_err());
    }

    #[tokio::test]
    async fn test_ensure_author_is_idempotent() {
        let db = test_database().await;
        let service = AuthorService::new(db);
        service.ensure_author("jacob@example.com").await.unwrap();
        service.ensure_author("Jacob@Example.com").await.unwrap();
        assert_eq!(service.get_all_authors().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_bind_and_unbind_dashboards() {
        let db = test_database().await;
        fixtures::category(&db, "Macro").await;
        let rates = fixtures::dashboard(&db, "Macro", "Rates").await;
        let fx = fixtures::dashboard(&db, "Macro", "FX").await;

        let service = AuthorService::new(db.clone());
        service.ensure_author("jacob@example.com").await.unwrap();

        let first = service
            .bind_dashboards_to_author("jacob@example.com", &[rates, fx, Uuid::new_v4()])
            .await
            .unwrap();
        assert_eq!(first.affected, 2);

        // binding again is a no-op
        let again = service
            .bind_dashboards_to_author("jacob@example.com", &[rates])
            .await
            .unwrap();
        assert_eq!(again.affected, 0);

        let view = service.get_author_with_dashboards("jacob@example.com").await.unwrap();
        assert_eq!(view.dashboards.len(), 2);

        service
            .unbind_dashboards_from_author("jacob@example.com", &[fx])
            .await
            .unwrap();
        let view = service.get_author_with_dashboards("jacob@example.com").await.unwrap();
        assert_eq!(view.dashboards.len(), 1);
        assert_eq!(view.dashboards[0].id, rates);
    }

    #[tokio::test]
    async fn test_bind_to_unknown_author_fails() {
        let db = test_database().await;
        let service = AuthorService::new(db);
        let err = service
            .bind_dashboards_to_author("ghost@example.com", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_email_lookups_ignore_case() {
        let db = test_database().await;
        fixtures::category(&db, "Macro").await;
        let rates = fixtures::dashboard(&db, "Macro", "Rates").await;

        let service = AuthorService::new(db);
        let saved = service
            .save_author(AuthorInput {
                email: "Bob@Example.com".to_string(),
                nickname: Some("bob".to_string()),
                description: None,
            })
            .await
            .unwrap();
        assert_eq!(saved.email, "bob@example.com");

        let found = service.get_author_by_email("Bob@Example.com").await.unwrap();
        assert_eq!(found.nickname.as_deref(), Some("bob"));

        let bound = service
            .bind_dashboards_to_author("BOB@example.com", &[rates])
            .await
            .unwrap();
        assert_eq!(bound.affected, 1);
        let view = service.get_author_with_dashboards(" bob@EXAMPLE.com").await.unwrap();
        assert_eq!(view.dashboards.len(), 1);

        let unbound = service
            .unbind_dashboards_from_author("Bob@Example.com", &[rates])
            .await
            .unwrap();
        assert_eq!(unbound.affected, 1);

        assert_eq!(service.delete_author("Bob@Example.com").await.unwrap().affected, 1);
        assert!(service.get_all_authors().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_author_drops_bindings() {
        let db = test_database().await;
        fixtures::category(&db, "Macro").await;
        let rates = fixtures::dashboard(&db, "Macro", "Rates").await;
        let fx = fixtures::dashboard(&db, "Macro", "FX").await;

        let service = AuthorService::new(db.clone());
        service.ensure_author("jacob@example.com").await.unwrap();
        service
            .bind_dashboards_to_author("jacob@example.com", &[rates, fx])
            .await
            .unwrap();
        assert_eq!(author_dashboard::Entity::find().all(&db).await.unwrap().len(), 2);

        service.delete_author("jacob@example.com").await.unwrap();
        assert!(author_dashboard::Entity::find().all(&db).await.unwrap().is_empty());
        // the dashboards themselves stay
        assert!(dashboard::Entity::find_by_id(rates).one(&db).await.unwrap().is_some());
    }
}
