//! Dashboard handlers

use axum::{extract::Query, response::Json, Extension};
use serde::Deserialize;

use crate::entity::dashboard;
use crate::error::AppResult;
use crate::handlers::{IdQuery, IdsQuery};
use crate::middleware::{CurrentAuthor, DbConn};
use crate::routes::ApiResponse;
use crate::service::dashboard::DashboardInput;
use crate::service::view::DashboardView;
use crate::service::{Affected, DashboardService};

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    #[serde(rename = "categoryName")]
    pub category_name: String,
}

#[derive(Debug, Deserialize)]
pub struct CategoryDashboardQuery {
    #[serde(rename = "categoryName")]
    pub category_name: String,
    #[serde(rename = "dashboardName")]
    pub dashboard_name: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub keyword: String,
}

/// GET /api/dashboards
pub async fn get_all_dashboards(
    Extension(db): Extension<DbConn>,
) -> AppResult<Json<ApiResponse<Vec<DashboardView>>>> {
    let dashboards = DashboardService::new(db.0).get_all_dashboards().await?;
    Ok(Json(ApiResponse::success(dashboards)))
}

/// GET /api/dashboard?id=
pub async fn get_dashboard_by_id(
    Extension(db): Extension<DbConn>,
    Query(query): Query<IdQuery>,
) -> AppResult<Json<ApiResponse<DashboardView>>> {
    let dashboard = DashboardService::new(db.0).get_dashboard_by_id(query.id).await?;
    Ok(Json(ApiResponse::success(dashboard)))
}

/// POST /api/dashboard
pub async fn save_dashboard(
    Extension(db): Extension<DbConn>,
    Extension(author): Extension<CurrentAuthor>,
    Json(req): Json<DashboardInput>,
) -> AppResult<Json<ApiResponse<dashboard::Model>>> {
    let saved = DashboardService::new(db.0).save_dashboard(req).await?;
    tracing::info!("{} saved dashboard {}", author.email, saved.id);
    Ok(Json(ApiResponse::success(saved)))
}

/// DELETE /api/dashboard?id=
pub async fn delete_dashboard(
    Extension(db): Extension<DbConn>,
    Extension(author): Extension<CurrentAuthor>,
    Query(query): Query<IdQuery>,
) -> AppResult<Json<ApiResponse<Affected>>> {
    let res = DashboardService::new(db.0).delete_dashboard(query.id).await?;
    tracing::info!("{} deleted dashboard {}", author.email, query.id);
    Ok(Json(ApiResponse::success(res)))
}

/// GET /api/dashboards/templates
pub async fn get_all_dashboards_template(
    Extension(db): Extension<DbConn>,
) -> AppResult<Json<ApiResponse<Vec<DashboardView>>>> {
    let dashboards = DashboardService::new(db.0).get_all_dashboards_template().await?;
    Ok(Json(ApiResponse::success(dashboards)))
}

/// GET /api/dashboard/template?id=
pub async fn get_dashboard_category_and_template(
    Extension(db): Extension<DbConn>,
    Query(query): Query<IdQuery>,
) -> AppResult<Json<ApiResponse<DashboardView>>> {
    let dashboard = DashboardService::new(db.0)
        .get_dashboard_category_and_template(query.id)
        .await?;
    Ok(Json(ApiResponse::success(dashboard)))
}

/// POST /api/dashboard/modify
pub async fn modify_dashboard(
    Extension(db): Extension<DbConn>,
    Json(req): Json<DashboardInput>,
) -> AppResult<Json<ApiResponse<bool>>> {
    let modified = DashboardService::new(db.0).modify_dashboard(req).await?;
    Ok(Json(ApiResponse::success(modified)))
}

/// POST /api/dashboard/attach?categoryName=
pub async fn new_dashboard_attach_to_category(
    Extension(db): Extension<DbConn>,
    Query(query): Query<CategoryQuery>,
    Json(req): Json<DashboardInput>,
) -> AppResult<Json<ApiResponse<bool>>> {
    let attached = DashboardService::new(db.0)
        .new_dashboard_attach_to_category(&query.category_name, req)
        .await?;
    Ok(Json(ApiResponse::success(attached)))
}

/// DELETE /api/dashboard/in-category?categoryName=&dashboardName=
pub async fn delete_dashboard_in_category(
    Extension(db): Extension<DbConn>,
    Query(query): Query<CategoryDashboardQuery>,
) -> AppResult<Json<ApiResponse<Affected>>> {
    let res = DashboardService::new(db.0)
        .delete_dashboard_in_category(&query.category_name, &query.dashboard_name)
        .await?;
    Ok(Json(ApiResponse::success(res)))
}

/// POST /api/dashboards
pub async fn save_dashboards(
    Extension(db): Extension<DbConn>,
    Json(req): Json<Vec<DashboardInput>>,
) -> AppResult<Json<ApiResponse<Vec<dashboard::Model>>>> {
    let saved = DashboardService::new(db.0).save_dashboards(req).await?;
    Ok(Json(ApiResponse::success(saved)))
}

/// DELETE /api/dashboards?ids=
pub async fn delete_dashboards(
    Extension(db): Extension<DbConn>,
    Query(query): Query<IdsQuery>,
) -> AppResult<Json<ApiResponse<Affected>>> {
    let ids = query.parse()?;
    let res = DashboardService::new(db.0).delete_dashboards(&ids).await?;
    Ok(Json(ApiResponse::success(res)))
}

/// POST /api/dashboards/in-category?categoryName=
///
/// Replaces the category's dashboards and binds the saved ones to the caller.
pub async fn update_dashboards_in_category(
    Extension(db): Extension<DbConn>,
    Extension(author): Extension<CurrentAuthor>,
    Query(query): Query<CategoryQuery>,
    Json(req): Json<Vec<DashboardInput>>,
) -> AppResult<Json<ApiResponse<bool>>> {
    let updated = DashboardService::new(db.0)
        .update_dashboards_in_category(&author.email, &query.category_name, req)
        .await?;
    if updated {
        tracing::info!("{} updated dashboards in {}", author.email, query.category_name);
    }
    Ok(Json(ApiResponse::success(updated)))
}

/// GET /api/dashboards/search?keyword=
pub async fn search_dashboards(
    Extension(db): Extension<DbConn>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<ApiResponse<Vec<DashboardView>>>> {
    let found = DashboardService::new(db.0).search_dashboards(&query.keyword).await?;
    Ok(Json(ApiResponse::success(found)))
}
