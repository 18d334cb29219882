//! Template handlers

use axum::{extract::Query, response::Json, Extension};
use serde::Deserialize;
use uuid::Uuid;

use crate::entity::template;
use crate::error::AppResult;
use crate::handlers::IdQuery;
use crate::middleware::DbConn;
use crate::routes::ApiResponse;
use crate::service::template::TemplateInput;
use crate::service::view::TemplateView;
use crate::service::{Affected, TemplateService};

#[derive(Debug, Deserialize)]
pub struct DashboardIdQuery {
    #[serde(rename = "dashboardId")]
    pub dashboard_id: Uuid,
}

/// GET /api/templates?dashboardId=
pub async fn get_templates(
    Extension(db): Extension<DbConn>,
    Query(query): Query<DashboardIdQuery>,
) -> AppResult<Json<ApiResponse<Vec<template::Model>>>> {
    let templates = TemplateService::new(db.0)
        .get_templates_by_dashboard(query.dashboard_id)
        .await?;
    Ok(Json(ApiResponse::success(templates)))
}

/// GET /api/template?id=
pub async fn get_template(
    Extension(db): Extension<DbConn>,
    Query(query): Query<IdQuery>,
) -> AppResult<Json<ApiResponse<TemplateView>>> {
    let view = TemplateService::new(db.0).get_template_by_id(query.id).await?;
    Ok(Json(ApiResponse::success(view)))
}

/// POST /api/template
pub async fn save_template(
    Extension(db): Extension<DbConn>,
    Json(req): Json<TemplateInput>,
) -> AppResult<Json<ApiResponse<template::Model>>> {
    let saved = TemplateService::new(db.0).save_template(req).await?;
    Ok(Json(ApiResponse::success(saved)))
}

/// DELETE /api/template?id=
pub async fn delete_template(
    Extension(db): Extension<DbConn>,
    Query(query): Query<IdQuery>,
) -> AppResult<Json<ApiResponse<Affected>>> {
    let res = TemplateService::new(db.0).delete_template(query.id).await?;
    Ok(Json(ApiResponse::success(res)))
}
