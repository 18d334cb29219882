//! Content handlers

use axum::{extract::Query, response::Json, Extension};
use serde::Deserialize;
use uuid::Uuid;

use crate::entity::content;
use crate::error::AppResult;
use crate::handlers::IdQuery;
use crate::middleware::DbConn;
use crate::routes::ApiResponse;
use crate::service::content::ContentInput;
use crate::service::{Affected, ContentService};

#[derive(Debug, Deserialize)]
pub struct ElementIdQuery {
    #[serde(rename = "elementId")]
    pub element_id: Uuid,
}

/// GET /api/contents?elementId=
pub async fn get_contents(
    Extension(db): Extension<DbConn>,
    Query(query): Query<ElementIdQuery>,
) -> AppResult<Json<ApiResponse<Vec<content::Model>>>> {
    let contents = ContentService::new(db.0)
        .get_contents_by_element(query.element_id)
        .await?;
    Ok(Json(ApiResponse::success(contents)))
}

/// GET /api/content?id=
pub async fn get_content(
    Extension(db): Extension<DbConn>,
    Query(query): Query<IdQuery>,
) -> AppResult<Json<ApiResponse<content::Model>>> {
    let found = ContentService::new(db.0).get_content_by_id(query.id).await?;
    Ok(Json(ApiResponse::success(found)))
}

/// POST /api/content
pub async fn save_content(
    Extension(db): Extension<DbConn>,
    Json(req): Json<ContentInput>,
) -> AppResult<Json<ApiResponse<content::Model>>> {
    let saved = ContentService::new(db.0).save_content(req).await?;
    Ok(Json(ApiResponse::success(saved)))
}

/// DELETE /api/content?id=
pub async fn delete_content(
    Extension(db): Extension<DbConn>,
    Query(query): Query<IdQuery>,
) -> AppResult<Json<ApiResponse<Affected>>> {
    let res = ContentService::new(db.0).delete_content(query.id).await?;
    Ok(Json(ApiResponse::success(res)))
}
