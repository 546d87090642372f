//! Playlist service - the playlist membership manager.

use sea_orm::Set;
use serde::Serialize;
use std::collections::HashSet;
use tubekit_common::{AppError, AppResult, IdGenerator, PageRequest, Paginated};
use tubekit_db::{
    entities::{playlist, playlist_video},
    repositories::{PlaylistRepository, UserRepository, VideoRepository},
};

use crate::services::video::VideoSummary;

/// A playlist joined with its member video summaries in append order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistDetail {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    pub videos: Vec<VideoSummary>,
    pub created_at: String,
}

/// Playlist service for business logic.
#[derive(Clone)]
pub struct PlaylistService {
    playlist_repo: PlaylistRepository,
    video_repo: VideoRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl PlaylistService {
    /// Create a new playlist service.
    #[must_use]
    pub const fn new(
        playlist_repo: PlaylistRepository,
        video_repo: VideoRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            playlist_repo,
            video_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a new playlist.
    pub async fn create(
        &self,
        owner_id: &str,
        name: &str,
        description: Option<String>,
    ) -> AppResult<playlist::Model> {
        let name = name.trim();
        if name.is_empty() || name.len() > 128 {
            return Err(AppError::Validation(
                "Playlist name must be between 1 and 128 characters".to_string(),
            ));
        }

        if let Some(ref desc) = description
            && desc.len() > 2048
        {
            return Err(AppError::Validation(
                "Playlist description must be at most 2048 characters".to_string(),
            ));
        }

        let model = playlist::ActiveModel {
            id: Set(self.id_gen.generate()),
            owner_id: Set(owner_id.to_string()),
            name: Set(name.to_string()),
            description: Set(description),
            ..Default::default()
        };

        self.playlist_repo.create(model).await
    }

    /// Rename a playlist or change its description. Owner only.
    pub async fn rename(
        &self,
        playlist_id: &str,
        actor_id: &str,
        name: Option<String>,
        description: Option<Option<String>>,
    ) -> AppResult<playlist::Model> {
        let playlist = self.owned_playlist(playlist_id, actor_id).await?;

        if let Some(ref n) = name
            && (n.trim().is_empty() || n.len() > 128)
        {
            return Err(AppError::Validation(
                "Playlist name must be between 1 and 128 characters".to_string(),
            ));
        }

        if let Some(Some(ref desc)) = description
            && desc.len() > 2048
        {
            return Err(AppError::Validation(
                "Playlist description must be at most 2048 characters".to_string(),
            ));
        }

        let mut model: playlist::ActiveModel = playlist.into();
        if let Some(name) = name {
            model.name = Set(name.trim().to_string());
        }
        if let Some(description) = description {
            model.description = Set(description);
        }
        model.updated_at = Set(Some(chrono::Utc::now().into()));

        self.playlist_repo.update(model).await
    }

    /// Delete a playlist. Owner only. Membership rows cascade.
    pub async fn delete(&self, playlist_id: &str, actor_id: &str) -> AppResult<()> {
        self.owned_playlist(playlist_id, actor_id).await?;
        self.playlist_repo.delete(playlist_id).await
    }

    /// Add a batch of videos to a playlist. Owner only.
    ///
    /// All-or-nothing: if any ID is unknown, repeated within the request,
    /// or already a member, the whole batch is rejected and nothing is
    /// written. Append order of the request is preserved.
    pub async fn add_videos(
        &self,
        playlist_id: &str,
        actor_id: &str,
        video_ids: &[String],
    ) -> AppResult<PlaylistDetail> {
        self.owned_playlist(playlist_id, actor_id).await?;

        if video_ids.is_empty() {
            return Err(AppError::Validation("No videos given".to_string()));
        }

        let unique: HashSet<&String> = video_ids.iter().collect();
        if unique.len() != video_ids.len() {
            return Err(AppError::Validation(
                "Duplicate videos in request".to_string(),
            ));
        }

        let existing = self.video_repo.count_existing(video_ids).await?;
        if existing != video_ids.len() as u64 {
            return Err(AppError::Validation(
                "One or more videos do not exist".to_string(),
            ));
        }

        let already_members = self
            .playlist_repo
            .count_members_among(playlist_id, video_ids)
            .await?;
        if already_members > 0 {
            return Err(AppError::Validation(
                "One or more videos are already in the playlist".to_string(),
            ));
        }

        let base = self
            .playlist_repo
            .max_position(playlist_id)
            .await?
            .map_or(0, |max| max + 1);

        let models = video_ids
            .iter()
            .enumerate()
            .map(|(i, video_id)| playlist_video::ActiveModel {
                id: Set(self.id_gen.generate()),
                playlist_id: Set(playlist_id.to_string()),
                video_id: Set(video_id.clone()),
                position: Set(base + i as i32),
                ..Default::default()
            })
            .collect();

        self.playlist_repo.add_members(models).await?;

        self.get_detail(playlist_id).await
    }

    /// Remove a set of videos from a playlist. Owner only.
    ///
    /// The playlist must currently contain every requested video, otherwise
    /// the call fails with NotFound and nothing is removed.
    pub async fn remove_videos(
        &self,
        playlist_id: &str,
        actor_id: &str,
        video_ids: &[String],
    ) -> AppResult<PlaylistDetail> {
        self.owned_playlist(playlist_id, actor_id).await?;

        if video_ids.is_empty() {
            return Err(AppError::Validation("No videos given".to_string()));
        }

        let mut requested: Vec<String> = video_ids.to_vec();
        requested.sort();
        requested.dedup();

        let members = self
            .playlist_repo
            .count_members_among(playlist_id, &requested)
            .await?;
        if members != requested.len() as u64 {
            return Err(AppError::NotFound(
                "Playlist does not contain all of the requested videos".to_string(),
            ));
        }

        self.playlist_repo
            .remove_members(playlist_id, &requested)
            .await?;

        self.get_detail(playlist_id).await
    }

    /// A playlist with its member video summaries in append order.
    pub async fn get_detail(&self, playlist_id: &str) -> AppResult<PlaylistDetail> {
        let playlist = self.playlist_repo.get_by_id(playlist_id).await?;
        let members = self.playlist_repo.find_members(playlist_id).await?;

        let video_ids: Vec<String> = members.iter().map(|m| m.video_id.clone()).collect();
        let videos = self.video_repo.find_by_ids(&video_ids).await?;

        let summaries = members
            .iter()
            .filter_map(|m| {
                let video = videos.iter().find(|v| v.id == m.video_id)?;
                Some(VideoSummary::from(video))
            })
            .collect();

        Ok(PlaylistDetail {
            id: playlist.id,
            owner_id: playlist.owner_id,
            name: playlist.name,
            description: playlist.description,
            videos: summaries,
            created_at: playlist.created_at.to_rfc3339(),
        })
    }

    /// A user's playlists, newest first.
    pub async fn list_by_owner(
        &self,
        owner_id: &str,
        page: PageRequest,
    ) -> AppResult<Paginated<playlist::Model>> {
        self.user_repo.get_by_id(owner_id).await?;

        let page = page.clamped();

        let playlists = self
            .playlist_repo
            .find_by_owner(owner_id, page.page_size, page.offset())
            .await?;
        let total = self.playlist_repo.count_by_owner(owner_id).await?;

        Ok(Paginated::new(playlists, page, total))
    }

    async fn owned_playlist(
        &self,
        playlist_id: &str,
        actor_id: &str,
    ) -> AppResult<playlist::Model> {
        // Existence before ownership
        let playlist = self.playlist_repo.get_by_id(playlist_id).await?;

        if playlist.owner_id != actor_id {
            return Err(AppError::Forbidden("Not the playlist owner".to_string()));
        }

        Ok(playlist)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, Value};
    use std::sync::Arc;

    fn create_test_playlist(id: &str, owner_id: &str) -> playlist::Model {
        playlist::Model {
            id: id.to_string(),
            owner_id: owner_id.to_string(),
            name: "Favorites".to_string(),
            description: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service_with(
        playlist_db: Arc<DatabaseConnection>,
        video_db: Arc<DatabaseConnection>,
    ) -> PlaylistService {
        let empty = || Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        PlaylistService::new(
            PlaylistRepository::new(playlist_db),
            VideoRepository::new(video_db),
            UserRepository::new(empty()),
        )
    }

    #[tokio::test]
    async fn test_create_empty_name() {
        let playlist_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let video_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(playlist_db, video_db);

        let result = service.create("u1", "  ", None).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_add_videos_not_owner() {
        let playlist_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_playlist("pl1", "u1")]])
                .into_connection(),
        );
        let video_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(playlist_db, video_db);

        let result = service
            .add_videos("pl1", "intruder", &["v1".to_string()])
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_add_videos_duplicate_in_request() {
        let playlist_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_playlist("pl1", "u1")]])
                .into_connection(),
        );
        let video_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(playlist_db, video_db);

        let result = service
            .add_videos("pl1", "u1", &["v1".to_string(), "v1".to_string()])
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_add_videos_unknown_video_rejects_whole_batch() {
        let playlist_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_playlist("pl1", "u1")]])
                .into_connection(),
        );
        // Only one of the two requested videos exists
        let video_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[btreemap! {
                    "num_items" => Into::<Value>::into(1i64),
                }]])
                .into_connection(),
        );

        let service = service_with(playlist_db, video_db);

        let result = service
            .add_videos("pl1", "u1", &["v1".to_string(), "missing".to_string()])
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_add_videos_already_member_rejects_whole_batch() {
        let playlist_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // playlist lookup, then membership count finding one member
                .append_query_results([[create_test_playlist("pl1", "u1")]])
                .append_query_results([[btreemap! {
                    "num_items" => Into::<Value>::into(1i64),
                }]])
                .into_connection(),
        );
        // Both videos exist
        let video_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[btreemap! {
                    "num_items" => Into::<Value>::into(2i64),
                }]])
                .into_connection(),
        );

        let service = service_with(playlist_db, video_db);

        let result = service
            .add_videos("pl1", "u1", &["v2".to_string(), "v3".to_string()])
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_remove_videos_missing_member_fails_not_found() {
        let playlist_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // playlist lookup, then membership count finding no member
                .append_query_results([[create_test_playlist("pl1", "u1")]])
                .append_query_results([[btreemap! {
                    "num_items" => Into::<Value>::into(0i64),
                }]])
                .into_connection(),
        );
        let video_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(playlist_db, video_db);

        let result = service
            .remove_videos("pl1", "u1", &["v1".to_string()])
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_playlist_not_found() {
        let playlist_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<playlist::Model>::new()])
                .into_connection(),
        );
        let video_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(playlist_db, video_db);

        let result = service.delete("missing", "u1").await;

        assert!(matches!(result, Err(AppError::PlaylistNotFound(_))));
    }
}
