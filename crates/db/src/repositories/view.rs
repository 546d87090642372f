//! View repository.
//!
//! The dedup-insert for exactly-once view counting lives here: one
//! conditional insert against the unique (video, viewer) index decides
//! whether this fetch is the viewer's first.

use std::sync::Arc;

use crate::entities::{View, view};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, TryInsertResult,
    sea_query::OnConflict,
};
use tubekit_common::{AppError, AppResult};

/// View repository for database operations.
#[derive(Clone)]
pub struct ViewRepository {
    db: Arc<DatabaseConnection>,
}

impl ViewRepository {
    /// Create a new view repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Check if a viewer has been counted for a video.
    pub async fn exists(&self, video_id: &str, viewer_id: &str) -> AppResult<bool> {
        let count = View::find()
            .filter(view::Column::VideoId.eq(video_id))
            .filter(view::Column::ViewerId.eq(viewer_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Record a (video, viewer) pair unless it is already recorded.
    ///
    /// Returns `true` if this call created the record - the caller may then
    /// bump the denormalized counter exactly once. Returns `false` when the
    /// pair was already recorded, including when a concurrent recorder won
    /// the race.
    pub async fn insert_if_absent(&self, model: view::ActiveModel) -> AppResult<bool> {
        let result = View::insert(model)
            .on_conflict(
                OnConflict::columns([view::Column::VideoId, view::Column::ViewerId])
                    .do_nothing()
                    .to_owned(),
            )
            .do_nothing()
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(matches!(result, TryInsertResult::Inserted(_)))
    }

    /// Count recorded viewers of a video.
    pub async fn count_by_video(&self, video_id: &str) -> AppResult<u64> {
        View::find()
            .filter(view::Column::VideoId.eq(video_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};

    #[tokio::test]
    async fn test_exists_false() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[btreemap! {
                    "num_items" => Into::<Value>::into(0i64),
                }]])
                .into_connection(),
        );

        let repo = ViewRepository::new(db);
        let result = repo.exists("v1", "u1").await.unwrap();

        assert!(!result);
    }

    #[tokio::test]
    async fn test_count_by_video() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[btreemap! {
                    "num_items" => Into::<Value>::into(3i64),
                }]])
                .into_connection(),
        );

        let repo = ViewRepository::new(db);
        let result = repo.count_by_video("v1").await.unwrap();

        assert_eq!(result, 3);
    }
}
