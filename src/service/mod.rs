//! Services - the query logic behind each group of endpoints
//!
//! Handlers stay thin: they parse the request, call one service method and
//! wrap the result. Every service owns a clone of the connection pool.

use sea_orm::TransactionError;
use serde::Serialize;

use crate::error::AppError;

pub mod author;
pub mod category;
pub mod content;
pub mod dashboard;
pub mod element;
pub mod record;
pub mod template;
pub mod view;

pub use author::AuthorService;
pub use category::CategoryService;
pub use content::ContentService;
pub use dashboard::DashboardService;
pub use element::ElementService;
pub use record::RecordService;
pub use template::TemplateService;

/// Outcome of a delete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Affected {
    pub affected: u64,
}

impl From<sea_orm::DeleteResult> for Affected {
    fn from(res: sea_orm::DeleteResult) -> Self {
        Self {
            affected: res.rows_affected,
        }
    }
}

/// Collapse a transaction failure into the error the closure produced
pub(crate) fn txn_error(err: TransactionError<AppError>) -> AppError {
    match err {
        TransactionError::Connection(e) => e.into(),
        TransactionError::Transaction(e) => e,
    }
}

/// Reject blank names before they reach the store
pub(crate) fn require_name(value: &str, what: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} name must not be empty", what)));
    }
    Ok(trimmed.to_string())
}
