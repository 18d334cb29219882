//! Author handlers

use axum::{extract::Query, response::Json, Extension};
use serde::Deserialize;
use uuid::Uuid;

use crate::entity::author;
use crate::error::AppResult;
use crate::middleware::{CurrentAuthor, DbConn};
use crate::routes::ApiResponse;
use crate::service::author::{AuthorInput, AuthorView};
use crate::service::{Affected, AuthorService};

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

/// GET /api/author/current
pub async fn current_author(
    Extension(db): Extension<DbConn>,
    Extension(author): Extension<CurrentAuthor>,
) -> AppResult<Json<ApiResponse<AuthorView>>> {
    let view = AuthorService::new(db.0)
        .get_author_with_dashboards(&author.email)
        .await?;
    Ok(Json(ApiResponse::success(view)))
}

/// GET /api/authors
pub async fn get_all_authors(
    Extension(db): Extension<DbConn>,
) -> AppResult<Json<ApiResponse<Vec<author::Model>>>> {
    let authors = AuthorService::new(db.0).get_all_authors().await?;
    Ok(Json(ApiResponse::success(authors)))
}

/// GET /api/author?email=
pub async fn get_author(
    Extension(db): Extension<DbConn>,
    Query(query): Query<EmailQuery>,
) -> AppResult<Json<ApiResponse<AuthorView>>> {
    let view = AuthorService::new(db.0)
        .get_author_with_dashboards(&query.email)
        .await?;
    Ok(Json(ApiResponse::success(view)))
}

/// POST /api/author
pub async fn save_author(
    Extension(db): Extension<DbConn>,
    Json(req): Json<AuthorInput>,
) -> AppResult<Json<ApiResponse<author::Model>>> {
    let saved = AuthorService::new(db.0).save_author(req).await?;
    Ok(Json(ApiResponse::success(saved)))
}

/// DELETE /api/author?email=
pub async fn delete_author(
    Extension(db): Extension<DbConn>,
    Query(query): Query<EmailQuery>,
) -> AppResult<Json<ApiResponse<Affected>>> {
    let res = AuthorService::new(db.0).delete_author(&query.email).await?;
    Ok(Json(ApiResponse::success(res)))
}

/// POST /api/author/dashboards?email=
pub async fn bind_dashboards(
    Extension(db): Extension<DbConn>,
    Query(query): Query<EmailQuery>,
    Json(ids): Json<Vec<Uuid>>,
) -> AppResult<Json<ApiResponse<Affected>>> {
    let res = AuthorService::new(db.0)
        .bind_dashboards_to_author(&query.email, &ids)
        .await?;
    Ok(Json(ApiResponse::success(res)))
}

/// DELETE /api/author/dashboards?email=
pub async fn unbind_dashboards(
    Extension(db): Extension<DbConn>,
    Query(query): Query<EmailQuery>,
    Json(ids): Json<Vec<Uuid>>,
) -> AppResult<Json<ApiResponse<Affected>>> {
    let res = AuthorService::new(db.0)
        .unbind_dashboards_from_author(&query.email, &ids)
        .await?;
    Ok(Json(ApiResponse::success(res)))
}
