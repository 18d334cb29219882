//! Element handlers

use axum::{extract::Query, response::Json, Extension};
use serde::Deserialize;
use uuid::Uuid;

use crate::entity::element;
use crate::error::AppResult;
use crate::handlers::IdQuery;
use crate::middleware::DbConn;
use crate::routes::ApiResponse;
use crate::service::element::ElementInput;
use crate::service::view::ElementView;
use crate::service::{Affected, ElementService};

#[derive(Debug, Deserialize)]
pub struct TemplateIdQuery {
    #[serde(rename = "templateId")]
    pub template_id: Uuid,
}

/// GET /api/elements?templateId=
pub async fn get_elements(
    Extension(db): Extension<DbConn>,
    Query(query): Query<TemplateIdQuery>,
) -> AppResult<Json<ApiResponse<Vec<element::Model>>>> {
    let elements = ElementService::new(db.0)
        .get_elements_by_template(query.template_id)
        .await?;
    Ok(Json(ApiResponse::success(elements)))
}

/// GET /api/element?id=
pub async fn get_element(
    Extension(db): Extension<DbConn>,
    Query(query): Query<IdQuery>,
) -> AppResult<Json<ApiResponse<ElementView>>> {
    let view = ElementService::new(db.0).get_element_by_id(query.id).await?;
    Ok(Json(ApiResponse::success(view)))
}

/// POST /api/element
pub async fn save_element(
    Extension(db): Extension<DbConn>,
    Json(req): Json<ElementInput>,
) -> AppResult<Json<ApiResponse<element::Model>>> {
    let saved = ElementService::new(db.0).save_element(req).await?;
    Ok(Json(ApiResponse::success(saved)))
}

/// DELETE /api/element?id=
pub async fn delete_element(
    Extension(db): Extension<DbConn>,
    Query(query): Query<IdQuery>,
) -> AppResult<Json<ApiResponse<Affected>>> {
    let res = ElementService::new(db.0).delete_element(query.id).await?;
    Ok(Json(ApiResponse::success(res)))
}
