//! Entity module - SeaORM entity definitions
//!
//! One file per table. Relations are declared on the owning side and exposed
//! through `Related` so that joins and `find_related` work in both directions.

/// Current time as a Unix timestamp (seconds)
pub(crate) fn now_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Fill in `created_at`/`updated_at` on an active model before it is saved.
///
/// `created_at` is only touched on insert and only when the caller left it unset.
pub(crate) fn stamp_timestamps(
    created_at: &mut sea_orm::ActiveValue<i64>,
    updated_at: &mut sea_orm::ActiveValue<i64>,
    insert: bool,
) {
    let now = now_timestamp();
    if insert && created_at.is_not_set() {
        *created_at = sea_orm::ActiveValue::Set(now);
    }
    *updated_at = sea_orm::ActiveValue::Set(now);
}

pub mod author;
pub mod author_dashboard;
pub mod category;
pub mod content;
pub mod dashboard;
pub mod element;
pub mod record;
pub mod template;

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ActiveValue::{NotSet, Set, Unchanged};

    #[test]
    fn test_stamp_on_insert_and_update() {
        let (mut created, mut updated) = (NotSet, NotSet);
        stamp_timestamps(&mut created, &mut updated, true);
        assert!(created.is_set());
        assert!(updated.is_set());

        let (mut created, mut updated) = (Unchanged(7), Unchanged(7));
        stamp_timestamps(&mut created, &mut updated, false);
        assert_eq!(created, Unchanged(7));
        assert!(updated.is_set());

        let (mut created, mut updated) = (Set(3), NotSet);
        stamp_timestamps(&mut created, &mut updated, true);
        assert_eq!(created, Set(3));
    }
}
