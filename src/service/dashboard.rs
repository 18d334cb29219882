//! Dashboard service
//!
//! Dashboards are the unit users browse and edit. A dashboard always belongs
//! to one category and its name is unique inside that category. Reads come in
//! three depths (see [`DashboardRelations`]); writes follow create-or-update
//! semantics keyed by `id`.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use sea_orm::sea_query::{Expr, LikeExpr};
use serde::Deserialize;
use std::collections::HashSet;
use uuid::Uuid;

use crate::entity::{category, dashboard};
use crate::error::{AppError, AppResult, OptionExt};
use crate::service::author::bind_dashboards;
use crate::service::view::{attach_relations, DashboardRelations, DashboardView};
use crate::service::{require_name, txn_error, Affected};

/// Reference to a category by name, as sent by clients
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRef {
    pub name: String,
}

/// Create/update payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardInput {
    /// Present when updating; generated when absent
    pub id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<CategoryRef>,
}

pub struct DashboardService {
    db: DatabaseConnection,
}

impl DashboardService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_with(
        &self,
        filter: Option<sea_orm::Condition>,
        relations: DashboardRelations,
    ) -> AppResult<Vec<DashboardView>> {
        let mut query = dashboard::Entity::find();
        if let Some(cond) = filter {
            query = query.filter(cond);
        }
        let dashboards = query
            .order_by_asc(dashboard::Column::CategoryName)
            .order_by_asc(dashboard::Column::Name)
            .all(&self.db)
            .await?;
        Ok(attach_relations(&self.db, dashboards, relations).await?)
    }

    async fn find_one_with(&self, id: Uuid, relations: DashboardRelations) -> AppResult<DashboardView> {
        let found = dashboard::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found(format!("Dashboard {} not found", id))?;
        attach_relations(&self.db, vec![found], relations)
            .await?
            .pop()
            .ok_or_not_found(format!("Dashboard {} not found", id))
    }

    pub async fn get_all_dashboards(&self) -> AppResult<Vec<DashboardView>> {
        self.find_with(None, DashboardRelations::Full).await
    }

    pub async fn get_dashboard_by_id(&self, id: Uuid) -> AppResult<DashboardView> {
        self.find_one_with(id, DashboardRelations::Full).await
    }

    pub async fn save_dashboard(&self, input: DashboardInput) -> AppResult<dashboard::Model> {
        let category_name = input.category.as_ref().map(|c| c.name.clone());
        let saved = save_one(&self.db, input, category_name).await?;
        tracing::info!("Saved dashboard {} ({})", saved.name, saved.id);
        Ok(saved)
    }

    pub async fn delete_dashboard(&self, id: Uuid) -> AppResult<Affected> {
        let res = dashboard::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(res.into())
    }

    pub async fn get_all_dashboards_template(&self) -> AppResult<Vec<DashboardView>> {
        self.find_with(None, DashboardRelations::Template).await
    }

    pub async fn get_dashboard_category_and_template(&self, id: Uuid) -> AppResult<DashboardView> {
        self.find_one_with(id, DashboardRelations::Template).await
    }

    /// Rename/redescribe an existing dashboard; `false` when there is nothing to modify
    pub async fn modify_dashboard(&self, input: DashboardInput) -> AppResult<bool> {
        let Some(id) = input.id else {
            return Ok(false);
        };
        let Some(found) = dashboard::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(false);
        };

        let name = require_name(&input.name, "Dashboard")?;
        let mut active: dashboard::ActiveModel = found.into();
        active.name = Set(name);
        active.description = Set(input.description);
        active.update(&self.db).await?;
        Ok(true)
    }

    /// Create a dashboard inside an existing category; `false` when the category is unknown
    pub async fn new_dashboard_attach_to_category(
        &self,
        category_name: &str,
        input: DashboardInput,
    ) -> AppResult<bool> {
        if category::Entity::find_by_id(category_name.to_string())
            .one(&self.db)
            .await?
            .is_none()
        {
            return Ok(false);
        }

        save_one(&self.db, input, Some(category_name.to_string())).await?;
        Ok(true)
    }

    pub async fn delete_dashboard_in_category(
        &self,
        category_name: &str,
        dashboard_name: &str,
    ) -> AppResult<Affected> {
        let res = dashboard::Entity::delete_many()
            .filter(dashboard::Column::CategoryName.eq(category_name))
            .filter(dashboard::Column::Name.eq(dashboard_name))
            .exec(&self.db)
            .await?;
        Ok(res.into())
    }

    /// Save several dashboards atomically
    pub async fn save_dashboards(&self, inputs: Vec<DashboardInput>) -> AppResult<Vec<dashboard::Model>> {
        self.db
            .transaction::<_, Vec<dashboard::Model>, AppError>(|txn| {
                Box::pin(async move {
                    let mut saved = Vec::with_capacity(inputs.len());
                    for input in inputs {
                        let category_name = input.category.as_ref().map(|c| c.name.clone());
                        saved.push(save_one(txn, input, category_name).await?);
                    }
                    Ok(saved)
                })
            })
            .await
            .map_err(txn_error)
    }

    pub async fn delete_dashboards(&self, ids: &[Uuid]) -> AppResult<Affected> {
        if ids.is_empty() {
            return Ok(Affected { affected: 0 });
        }
        Ok(delete_many(&self.db, ids.to_vec()).await?.into())
    }

    /// Replace the dashboards of a category with `inputs`.
    ///
    /// Dashboards currently in the category and missing from `inputs` (by id)
    /// are deleted, every input is saved into the category, and all saved
    /// dashboards are bound to `author_email`. Bindings of deleted dashboards
    /// go away with them. Returns `false` when the category does not exist.
    pub async fn update_dashboards_in_category(
        &self,
        author_email: &str,
        category_name: &str,
        inputs: Vec<DashboardInput>,
    ) -> AppResult<bool> {
        let author_email = author_email.to_string();
        let category_name = category_name.to_string();

        let updated = self
            .db
            .transaction::<_, bool, AppError>(|txn| {
                Box::pin(async move {
                    let Some(cat) = category::Entity::find_by_id(category_name).one(txn).await? else {
                        return Ok(false);
                    };

                    let current = dashboard::Entity::find()
                        .filter(dashboard::Column::CategoryName.eq(cat.name.as_str()))
                        .all(txn)
                        .await?;

                    let removed = removed_ids(&current, &inputs);
                    if !removed.is_empty() {
                        let res = delete_many(txn, removed).await?;
                        tracing::debug!("Removed {} dashboards from {}", res.rows_affected, cat.name);
                    }

                    let mut saved_ids = Vec::with_capacity(inputs.len());
                    for input in inputs {
                        saved_ids.push(save_one(txn, input, Some(cat.name.clone())).await?.id);
                    }

                    bind_dashboards(txn, &author_email, &saved_ids).await?;
                    Ok(true)
                })
            })
            .await
            .map_err(txn_error)?;

        Ok(updated)
    }

    /// Dashboards whose name contains `keyword`, with their category
    pub async fn search_dashboards(&self, keyword: &str) -> AppResult<Vec<DashboardView>> {
        let pattern = LikeExpr::new(like_pattern(keyword.trim())).escape('\\');
        let cond = sea_orm::Condition::all().add(Expr::col((dashboard::Entity, dashboard::Column::Name)).like(pattern));
        self.find_with(Some(cond), DashboardRelations::Category).await
    }
}

/// `%keyword%` with the keyword's own wildcards matched literally
fn like_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Ids present in `current` but absent from `incoming`
fn removed_ids(current: &[dashboard::Model], incoming: &[DashboardInput]) -> Vec<Uuid> {
    let keep: HashSet<Uuid> = incoming.iter().filter_map(|d| d.id).collect();
    current
        .iter()
        .map(|d| d.id)
        .filter(|id| !keep.contains(id))
        .collect()
}

async fn delete_many<C: ConnectionTrait>(conn: &C, ids: Vec<Uuid>) -> Result<sea_orm::DeleteResult, DbErr> {
    dashboard::Entity::delete_many()
        .filter(dashboard::Column::Id.is_in(ids))
        .exec(conn)
        .await
}

/// Create-or-update one dashboard.
///
/// `category_name` overrides whatever the existing row has; when it is `None`
/// an existing row keeps its category and a new row is rejected.
async fn save_one<C: ConnectionTrait>(
    conn: &C,
    input: DashboardInput,
    category_name: Option<String>,
) -> AppResult<dashboard::Model> {
    let name = require_name(&input.name, "Dashboard")?;

    if let Some(cat) = &category_name {
        if category::Entity::find_by_id(cat.clone()).one(conn).await?.is_none() {
            return Err(AppError::NotFound(format!("Category {} not found", cat)));
        }
    }

    let existing = match input.id {
        Some(id) => dashboard::Entity::find_by_id(id).one(conn).await?,
        None => None,
    };

    let saved = match existing {
        Some(model) => {
            let mut active: dashboard::ActiveModel = model.into();
            active.name = Set(name);
            active.description = Set(input.description);
            if let Some(cat) = category_name {
                active.category_name = Set(cat);
            }
            active.update(conn).await?
        }
        None => {
            let category_name = category_name.ok_or_else(|| {
                AppError::Validation("A new dashboard needs a category".to_string())
            })?;
            dashboard::ActiveModel {
                id: Set(input.id.unwrap_or_else(Uuid::new_v4)),
                category_name: Set(category_name),
                name: Set(name),
                description: Set(input.description),
                ..Default::default()
            }
            .insert(conn)
            .await?
        }
    };
    Ok(saved)
}
