//! Category handlers

use axum::{extract::Query, response::Json, Extension};
use serde::Deserialize;

use crate::entity::category;
use crate::error::AppResult;
use crate::middleware::DbConn;
use crate::routes::ApiResponse;
use crate::service::category::CategoryInput;
use crate::service::view::CategoryView;
use crate::service::{Affected, CategoryService};

#[derive(Debug, Deserialize)]
pub struct NameQuery {
    pub name: String,
}

/// GET /api/categories
pub async fn get_all_categories(
    Extension(db): Extension<DbConn>,
) -> AppResult<Json<ApiResponse<Vec<category::Model>>>> {
    let categories = CategoryService::new(db.0).get_all_categories().await?;
    Ok(Json(ApiResponse::success(categories)))
}

/// GET /api/category?name=
pub async fn get_category(
    Extension(db): Extension<DbConn>,
    Query(query): Query<NameQuery>,
) -> AppResult<Json<ApiResponse<category::Model>>> {
    let category = CategoryService::new(db.0).get_category_by_name(&query.name).await?;
    Ok(Json(ApiResponse::success(category)))
}

/// GET /api/category/dashboards?name=
pub async fn get_category_dashboards(
    Extension(db): Extension<DbConn>,
    Query(query): Query<NameQuery>,
) -> AppResult<Json<ApiResponse<CategoryView>>> {
    let view = CategoryService::new(db.0)
        .get_category_with_dashboards(&query.name)
        .await?;
    Ok(Json(ApiResponse::success(view)))
}

/// POST /api/category
pub async fn save_category(
    Extension(db): Extension<DbConn>,
    Json(req): Json<CategoryInput>,
) -> AppResult<Json<ApiResponse<category::Model>>> {
    let saved = CategoryService::new(db.0).save_category(req).await?;
    Ok(Json(ApiResponse::success(saved)))
}

/// DELETE /api/category?name=
pub async fn delete_category(
    Extension(db): Extension<DbConn>,
    Query(query): Query<NameQuery>,
) -> AppResult<Json<ApiResponse<Affected>>> {
    let res = CategoryService::new(db.0).delete_category(&query.name).await?;
    Ok(Json(ApiResponse::success(res)))
}
