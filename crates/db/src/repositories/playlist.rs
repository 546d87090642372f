//! Playlist repository.

use std::sync::Arc;

use crate::entities::{Playlist, PlaylistVideo, playlist, playlist_video};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, sea_query::Expr,
};
use tubekit_common::{AppError, AppResult};

/// Playlist repository for database operations.
#[derive(Clone)]
pub struct PlaylistRepository {
    db: Arc<DatabaseConnection>,
}

impl PlaylistRepository {
    /// Create a new playlist repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a playlist by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<playlist::Model>> {
        Playlist::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a playlist by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<playlist::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PlaylistNotFound(id.to_string()))
    }

    /// Create a new playlist.
    pub async fn create(&self, model: playlist::ActiveModel) -> AppResult<playlist::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a playlist.
    pub async fn update(&self, model: playlist::ActiveModel) -> AppResult<playlist::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a playlist. Membership rows go with it (foreign key cascade).
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Playlist::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get playlists by owner (newest first).
    pub async fn find_by_owner(
        &self,
        owner_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<playlist::Model>> {
        Playlist::find()
            .filter(playlist::Column::OwnerId.eq(owner_id))
            .order_by_desc(playlist::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count playlists by owner.
    pub async fn count_by_owner(&self, owner_id: &str) -> AppResult<u64> {
        Playlist::find()
            .filter(playlist::Column::OwnerId.eq(owner_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ==================== Membership Operations ====================

    /// Get a playlist's membership rows in append order.
    pub async fn find_members(&self, playlist_id: &str) -> AppResult<Vec<playlist_video::Model>> {
        PlaylistVideo::find()
            .filter(playlist_video::Column::PlaylistId.eq(playlist_id))
            .order_by_asc(playlist_video::Column::Position)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count how many of the given video IDs are already members.
    pub async fn count_members_among(
        &self,
        playlist_id: &str,
        video_ids: &[String],
    ) -> AppResult<u64> {
        if video_ids.is_empty() {
            return Ok(0);
        }

        PlaylistVideo::find()
            .filter(playlist_video::Column::PlaylistId.eq(playlist_id))
            .filter(playlist_video::Column::VideoId.is_in(video_ids.to_vec()))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Highest position currently used in a playlist.
    pub async fn max_position(&self, playlist_id: &str) -> AppResult<Option<i32>> {
        let max: Option<Option<i32>> = PlaylistVideo::find()
            .select_only()
            .column_as(Expr::col(playlist_video::Column::Position).max(), "max_position")
            .filter(playlist_video::Column::PlaylistId.eq(playlist_id))
            .into_tuple()
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(max.flatten())
    }

    /// Insert a batch of membership rows. The caller validates the batch
    /// first; this is the final write of the all-or-nothing contract.
    pub async fn add_members(&self, models: Vec<playlist_video::ActiveModel>) -> AppResult<()> {
        if models.is_empty() {
            return Ok(());
        }

        PlaylistVideo::insert_many(models)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Remove a set of videos from a playlist, returning how many rows went.
    pub async fn remove_members(
        &self,
        playlist_id: &str,
        video_ids: &[String],
    ) -> AppResult<u64> {
        if video_ids.is_empty() {
            return Ok(0);
        }

        let result = PlaylistVideo::delete_many()
            .filter(playlist_video::Column::PlaylistId.eq(playlist_id))
            .filter(playlist_video::Column::VideoId.is_in(video_ids.to_vec()))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_playlist(id: &str, owner_id: &str, name: &str) -> playlist::Model {
        playlist::Model {
            id: id.to_string(),
            owner_id: owner_id.to_string(),
            name: name.to_string(),
            description: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_member(
        id: &str,
        playlist_id: &str,
        video_id: &str,
        position: i32,
    ) -> playlist_video::Model {
        playlist_video::Model {
            id: id.to_string(),
            playlist_id: playlist_id.to_string(),
            video_id: video_id.to_string(),
            position,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<playlist::Model>::new()])
                .into_connection(),
        );

        let repo = PlaylistRepository::new(db);
        let result = repo.get_by_id("nonexistent").await;

        match result {
            Err(AppError::PlaylistNotFound(id)) => assert_eq!(id, "nonexistent"),
            _ => panic!("Expected PlaylistNotFound error"),
        }
    }

    #[tokio::test]
    async fn test_find_members_in_position_order() {
        let m1 = create_test_member("m1", "pl1", "v1", 0);
        let m2 = create_test_member("m2", "pl1", "v2", 1);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[m1, m2]])
                .into_connection(),
        );

        let repo = PlaylistRepository::new(db);
        let result = repo.find_members("pl1").await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].video_id, "v1");
        assert_eq!(result[1].video_id, "v2");
    }

    #[tokio::test]
    async fn test_count_members_among_empty_batch() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = PlaylistRepository::new(db);
        let result = repo.count_members_among("pl1", &[]).await.unwrap();

        assert_eq!(result, 0);
    }

    #[tokio::test]
    async fn test_remove_members() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 2,
                }])
                .into_connection(),
        );

        let repo = PlaylistRepository::new(db);
        let removed = repo
            .remove_members("pl1", &["v1".to_string(), "v2".to_string()])
            .await
            .unwrap();

        assert_eq!(removed, 2);
    }

    #[tokio::test]
    async fn test_find_by_owner() {
        let p1 = create_test_playlist("pl1", "u1", "Favorites");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[p1]])
                .into_connection(),
        );

        let repo = PlaylistRepository::new(db);
        let result = repo.find_by_owner("u1", 10, 0).await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Favorites");
    }
}
