//! Watch history repository.

use std::sync::Arc;

use crate::entities::{WatchHistory, watch_history};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use tubekit_common::{AppError, AppResult};

/// Watch history repository for database operations.
#[derive(Clone)]
pub struct WatchHistoryRepository {
    db: Arc<DatabaseConnection>,
}

impl WatchHistoryRepository {
    /// Create a new watch history repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Append an entry to a user's history.
    pub async fn append(&self, model: watch_history::ActiveModel) -> AppResult<watch_history::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a video already appears in a user's history.
    pub async fn exists(&self, user_id: &str, video_id: &str) -> AppResult<bool> {
        let count = WatchHistory::find()
            .filter(watch_history::Column::UserId.eq(user_id))
            .filter(watch_history::Column::VideoId.eq(video_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Get a user's history entries, most recent first.
    pub async fn find_by_user(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<watch_history::Model>> {
        WatchHistory::find()
            .filter(watch_history::Column::UserId.eq(user_id))
            .order_by_desc(watch_history::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count a user's history entries.
    pub async fn count_by_user(&self, user_id: &str) -> AppResult<u64> {
        WatchHistory::find()
            .filter(watch_history::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};

    fn create_test_entry(id: &str, user_id: &str, video_id: &str) -> watch_history::Model {
        watch_history::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            video_id: video_id.to_string(),
            watched_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_user() {
        let e1 = create_test_entry("h2", "u1", "v2");
        let e2 = create_test_entry("h1", "u1", "v1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[e1, e2]])
                .into_connection(),
        );

        let repo = WatchHistoryRepository::new(db);
        let result = repo.find_by_user("u1", 10, 0).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].video_id, "v2");
    }

    #[tokio::test]
    async fn test_exists_true() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[btreemap! {
                    "num_items" => Into::<Value>::into(1i64),
                }]])
                .into_connection(),
        );

        let repo = WatchHistoryRepository::new(db);
        let result = repo.exists("u1", "v1").await.unwrap();

        assert!(result);
    }
}
