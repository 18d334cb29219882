//! Gallery - a dashboard gallery management backend
//!
//! Categories hold dashboards; dashboards hold templates, templates hold
//! elements and elements hold dated contents. Authors are bound to the
//! dashboards they create and can leave records against elements.

pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod service;
pub mod state;

// Re-export commonly used types
pub use config::Config;
pub use state::AppState;
