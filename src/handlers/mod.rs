//! Request handlers module

use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

pub mod author;
pub mod category;
pub mod content;
pub mod dashboard;
pub mod element;
pub mod record;
pub mod template;

/// `?id=<uuid>`
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Uuid,
}

/// `?ids=<uuid>,<uuid>,...`
#[derive(Debug, Deserialize)]
pub struct IdsQuery {
    #[serde(default)]
    pub ids: String,
}

impl IdsQuery {
    /// Parse the comma-separated list, ignoring empty segments
    pub fn parse(&self) -> AppResult<Vec<Uuid>> {
        self.ids
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                Uuid::parse_str(s).map_err(|_| AppError::BadRequest(format!("Invalid id: {}", s)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ids() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let query = IdsQuery {
            ids: format!("{}, {},", a, b),
        };
        assert_eq!(query.parse().unwrap(), vec![a, b]);

        let empty = IdsQuery { ids: String::new() };
        assert!(empty.parse().unwrap().is_empty());

        let bad = IdsQuery {
            ids: "not-a-uuid".to_string(),
        };
        assert!(matches!(bad.parse(), Err(AppError::BadRequest(_))));
    }
}
