use axum::{
    http::Uri,
    middleware,
    routing::{delete, get, post},
    Router,
};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tower_sessions::{MemoryStore, SessionManagerLayer};

use crate::error::AppError;
use crate::handlers;
use crate::middleware::auth_layer;
use crate::state::AppState;

pub mod health;

/// API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub code: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: true,
            message: "success".to_string(),
            data: Some(data),
        }
    }
}

/// Create the main router
pub fn create_router(state: AppState) -> Router {
    // Session store (in-memory; only caches the resolved identity)
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_http_only(true);

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Dashboard routes
        .route(
            "/dashboards",
            get(handlers::dashboard::get_all_dashboards)
                .post(handlers::dashboard::save_dashboards)
                .delete(handlers::dashboard::delete_dashboards),
        )
        .route(
            "/dashboard",
            get(handlers::dashboard::get_dashboard_by_id)
                .post(handlers::dashboard::save_dashboard)
                .delete(handlers::dashboard::delete_dashboard),
        )
        .route("/dashboards/templates", get(handlers::dashboard::get_all_dashboards_template))
        .route("/dashboard/template", get(handlers::dashboard::get_dashboard_category_and_template))
        .route("/dashboard/modify", post(handlers::dashboard::modify_dashboard))
        .route("/dashboard/attach", post(handlers::dashboard::new_dashboard_attach_to_category))
        .route("/dashboard/in-category", delete(handlers::dashboard::delete_dashboard_in_category))
        .route("/dashboards/in-category", post(handlers::dashboard::update_dashboards_in_category))
        .route("/dashboards/search", get(handlers::dashboard::search_dashboards))
        // Category routes
        .route("/categories", get(handlers::category::get_all_categories))
        .route(
            "/category",
            get(handlers::category::get_category)
                .post(handlers::category::save_category)
                .delete(handlers::category::delete_category),
        )
        .route("/category/dashboards", get(handlers::category::get_category_dashboards))
        // Author routes
        .route("/authors", get(handlers::author::get_all_authors))
        .route("/author/current", get(handlers::author::current_author))
        .route(
            "/author",
            get(handlers::author::get_author)
                .post(handlers::author::save_author)
                .delete(handlers::author::delete_author),
        )
        .route(
            "/author/dashboards",
            post(handlers::author::bind_dashboards).delete(handlers::author::unbind_dashboards),
        )
        // Template routes
        .route("/templates", get(handlers::template::get_templates))
        .route(
            "/template",
            get(handlers::template::get_template)
                .post(handlers::template::save_template)
                .delete(handlers::template::delete_template),
        )
        // Element routes
        .route("/elements", get(handlers::element::get_elements))
        .route(
            "/element",
            get(handlers::element::get_element)
                .post(handlers::element::save_element)
                .delete(handlers::element::delete_element),
        )
        // Content routes
        .route("/contents", get(handlers::content::get_contents))
        .route(
            "/content",
            get(handlers::content::get_content)
                .post(handlers::content::save_content)
                .delete(handlers::content::delete_content),
        )
        // Record routes
        .route("/records", get(handlers::record::get_records))
        .route(
            "/record",
            get(handlers::record::get_record)
                .post(handlers::record::create_record)
                .delete(handlers::record::delete_record),
        );

    Router::new()
        .nest("/api", api_routes)
        .fallback(fallback)
        .layer(middleware::from_fn_with_state(state.clone(), auth_layer))
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Fallback handler for 404, in the same shape as every other error
pub async fn fallback(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::config::Config;
    use crate::db::test_database;

    const ME: &str = "jacob@example.com";

    async fn app() -> Router {
        let db = test_database().await;
        create_router(AppState::new(db, Config::default()))
    }

    async fn call(app: &Router, method: Method, uri: &str, user: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let (status, value, _) = send(app, method, uri, user, None, body).await;
        (status, value)
    }

    /// Like `call`, carrying a session cookie and returning the one the server set
    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        user: Option<&str>,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value, Option<String>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header("x-user-email", user);
        }
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value, set_cookie)
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let app = app().await;
        let (status, body) = call(&app, Method::GET, "/api/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "healthy");
        assert_eq!(body["data"]["database"], true);
    }

    #[tokio::test]
    async fn test_writes_need_identity() {
        let app = app().await;
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/category",
            None,
            Some(json!({"name": "Macro"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], 401);

        let (status, _) = call(&app, Method::GET, "/api/categories", None, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = app().await;
        let (status, body) = call(&app, Method::GET, "/nope", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 404);
        assert_eq!(body["details"], "No route for /nope");
    }

    #[tokio::test]
    async fn test_missing_dashboard_is_404() {
        let app = app().await;
        let uri = format!("/api/dashboard?id={}", Uuid::new_v4());
        let (status, body) = call(&app, Method::GET, &uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Not Found");
    }

    #[tokio::test]
    async fn test_update_dashboards_in_category_binds_caller() {
        let app = app().await;

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/category",
            Some(ME),
            Some(json!({"name": "Macro", "description": "rates and FX"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/dashboards/in-category?categoryName=Macro",
            Some(ME),
            Some(json!([{"name": "Rates"}, {"name": "FX", "description": "spot"}])),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], true);

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/dashboards/in-category?categoryName=Equity",
            Some(ME),
            Some(json!([])),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], false);

        let (_, body) = call(&app, Method::GET, "/api/author/current", Some(ME), None).await;
        assert_eq!(body["data"]["email"], ME);
        assert_eq!(body["data"]["dashboards"].as_array().unwrap().len(), 2);

        let (_, body) = call(&app, Method::GET, "/api/dashboards/search?keyword=Rat", None, None).await;
        let found = body["data"].as_array().unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["category"]["name"], "Macro");
    }

    #[tokio::test]
    async fn test_dashboard_crud_round() {
        let app = app().await;
        call(&app, Method::POST, "/api/category", Some(ME), Some(json!({"name": "Macro"}))).await;

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/dashboard",
            Some(ME),
            Some(json!({"name": "Rates", "category": {"name": "Macro"}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/dashboard",
            Some(ME),
            Some(json!({"name": "Rates", "category": {"name": "Macro"}})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, body) = call(
            &app,
            Method::POST,
            "/api/dashboard/modify",
            Some(ME),
            Some(json!({"id": id, "name": "Rates v2"})),
        )
        .await;
        assert_eq!(body["data"], true);

        let (_, body) = call(&app, Method::GET, &format!("/api/dashboard?id={}", id), None, None).await;
        assert_eq!(body["data"]["name"], "Rates v2");
        assert_eq!(body["data"]["templates"], json!([]));

        let (_, body) = call(&app, Method::DELETE, &format!("/api/dashboards?ids={}", id), Some(ME), None).await;
        assert_eq!(body["data"]["affected"], 1);
    }

    #[tokio::test]
    async fn test_header_overrides_session_identity() {
        let app = app().await;
        let alice = "alice@example.com";
        let bob = "bob@example.com";

        let (status, _, cookie) = send(&app, Method::GET, "/api/author/current", Some(alice), None, None).await;
        assert_eq!(status, StatusCode::OK);
        let cookie = cookie.expect("session cookie");

        // the cookie alone still identifies alice
        let (_, body, _) = send(&app, Method::GET, "/api/author/current", None, Some(&cookie), None).await;
        assert_eq!(body["data"]["email"], alice);

        // a different gateway user in the same browser takes over
        let (_, body, _) = send(&app, Method::GET, "/api/author/current", Some(bob), Some(&cookie), None).await;
        assert_eq!(body["data"]["email"], bob);

        let (_, body, _) = send(&app, Method::GET, "/api/author/current", None, Some(&cookie), None).await;
        assert_eq!(body["data"]["email"], bob);

        call(&app, Method::POST, "/api/category", Some(alice), Some(json!({"name": "Macro"}))).await;
        let (status, _, _) = send(
            &app,
            Method::POST,
            "/api/dashboards/in-category?categoryName=Macro",
            Some(bob),
            Some(&cookie),
            Some(json!([{"name": "Rates"}])),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = call(&app, Method::GET, "/api/author?email=bob@example.com", None, None).await;
        assert_eq!(body["data"]["dashboards"].as_array().unwrap().len(), 1);
        let (_, body) = call(&app, Method::GET, "/api/author?email=alice@example.com", None, None).await;
        assert_eq!(body["data"]["dashboards"], json!([]));
    }

    #[tokio::test]
    async fn test_deleted_author_is_recreated_for_cached_identity() {
        let app = app().await;
        let alice = "alice@example.com";

        let (status, _, cookie) = send(
            &app,
            Method::POST,
            "/api/category",
            Some(alice),
            None,
            Some(json!({"name": "Macro"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let cookie = cookie.expect("session cookie");

        let (status, body, _) = send(
            &app,
            Method::DELETE,
            "/api/author?email=alice@example.com",
            None,
            Some(&cookie),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["affected"], 1);

        let (status, body, _) = send(
            &app,
            Method::POST,
            "/api/dashboards/in-category?categoryName=Macro",
            None,
            Some(&cookie),
            Some(json!([{"name": "Rates"}])),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], true);

        let (_, body) = call(&app, Method::GET, "/api/author?email=alice@example.com", None, None).await;
        assert_eq!(body["data"]["dashboards"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_author_routes_ignore_email_case() {
        let app = app().await;
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/author",
            Some(ME),
            Some(json!({"email": "Bob@Example.com", "nickname": "bob"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["email"], "bob@example.com");

        let (status, body) = call(&app, Method::GET, "/api/author?email=Bob@Example.com", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["nickname"], "bob");
    }
}
