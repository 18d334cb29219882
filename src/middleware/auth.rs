//! Identity middleware
//!
//! The gallery sits behind an SSO gateway that forwards the signed-in user's
//! e-mail in a trusted header. Every request carrying that header resolves it
//! into an author row and caches the e-mail in the session, which then stands
//! in for the header on requests that lack it.

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use sea_orm::DatabaseConnection;
use std::ops::Deref;
use tower_sessions::Session;

use crate::error::AppError;
use crate::service::AuthorService;
use crate::state::AppState;

/// Session key for storing the author's e-mail
pub const SESSION_AUTHOR_KEY: &str = "author";

/// Database connection wrapper for use in handlers via Extension
#[derive(Clone)]
pub struct DbConn(pub DatabaseConnection);

impl Deref for DbConn {
    type Target = DatabaseConnection;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Authenticated author stored in request extensions
#[derive(Clone, Debug)]
pub struct CurrentAuthor {
    pub email: String,
}

/// Paths that don't require an identity
fn is_public(method: &Method, path: &str) -> bool {
    // Only API routes are guarded
    if !path.starts_with("/api") {
        return true;
    }
    if path == "/api/health" {
        return true;
    }
    // Reads are public, except asking who the caller is
    *method == Method::GET && path != "/api/author/current"
}

/// Pull a usable e-mail out of the identity header
fn header_identity(request: &Request<Body>, header: &str) -> Option<String> {
    request
        .headers()
        .get(header)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty() && v.contains('@'))
}

/// Authentication middleware
pub async fn auth_layer(
    State(state): State<AppState>,
    session: Session,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    request.extensions_mut().insert(DbConn(state.db.clone()));

    let path = request.uri().path().to_string();
    let public = is_public(request.method(), &path);

    // The gateway header wins; the session only covers requests without it
    let cached: Option<String> = session.get(SESSION_AUTHOR_KEY).await.unwrap_or(None);
    let header = header_identity(&request, state.user_header());
    let email = match (header, cached) {
        (Some(email), cached) => {
            if cached.as_deref() != Some(email.as_str()) {
                if let Err(e) = session.insert(SESSION_AUTHOR_KEY, &email).await {
                    tracing::warn!("Failed to cache identity in session: {}", e);
                }
                tracing::debug!("Resolved identity from header: {}", email);
            }
            Some(email)
        }
        (None, cached) => cached,
    };

    // The author row may have been deleted since the identity was cached
    if let Some(email) = &email {
        if let Err(e) = AuthorService::new(state.db.clone()).ensure_author(email).await {
            tracing::error!("Failed to register author {}: {}", email, e);
            return e.into_response();
        }
    }

    match email {
        Some(email) => {
            request.extensions_mut().insert(CurrentAuthor { email });
            next.run(request).await
        }
        None if public => next.run(request).await,
        None => {
            tracing::warn!("Rejected anonymous {} {}", request.method(), path);
            AppError::Unauthorized.into_response()
        }
    }
}
