//! Record handlers

use axum::{extract::Query, response::Json, Extension};
use serde::Deserialize;
use uuid::Uuid;

use crate::entity::record;
use crate::error::{AppError, AppResult};
use crate::handlers::IdQuery;
use crate::middleware::{CurrentAuthor, DbConn};
use crate::routes::ApiResponse;
use crate::service::record::RecordInput;
use crate::service::{Affected, RecordService};

/// Either `dashboardId` or `author` must be given
#[derive(Debug, Deserialize)]
pub struct RecordsQuery {
    #[serde(rename = "dashboardId")]
    pub dashboard_id: Option<Uuid>,
    pub author: Option<String>,
}

/// GET /api/records?dashboardId= | ?author=
pub async fn get_records(
    Extension(db): Extension<DbConn>,
    Query(query): Query<RecordsQuery>,
) -> AppResult<Json<ApiResponse<Vec<record::Model>>>> {
    let service = RecordService::new(db.0);
    let records = match (query.dashboard_id, query.author) {
        (Some(id), _) => service.get_records_by_dashboard(id).await?,
        (None, Some(email)) => service.get_records_by_author(&email).await?,
        (None, None) => {
            return Err(AppError::BadRequest("dashboardId or author is required".to_string()))
        }
    };
    Ok(Json(ApiResponse::success(records)))
}

/// GET /api/record?id=
pub async fn get_record(
    Extension(db): Extension<DbConn>,
    Query(query): Query<IdQuery>,
) -> AppResult<Json<ApiResponse<record::Model>>> {
    let found = RecordService::new(db.0).get_record_by_id(query.id).await?;
    Ok(Json(ApiResponse::success(found)))
}

/// POST /api/record
pub async fn create_record(
    Extension(db): Extension<DbConn>,
    Extension(author): Extension<CurrentAuthor>,
    Json(req): Json<RecordInput>,
) -> AppResult<Json<ApiResponse<record::Model>>> {
    let created = RecordService::new(db.0).create_record(&author.email, req).await?;
    Ok(Json(ApiResponse::success(created)))
}

/// DELETE /api/record?id=
pub async fn delete_record(
    Extension(db): Extension<DbConn>,
    Query(query): Query<IdQuery>,
) -> AppResult<Json<ApiResponse<Affected>>> {
    let res = RecordService::new(db.0).delete_record(query.id).await?;
    Ok(Json(ApiResponse::success(res)))
}
