//! View service - the view counter and watch-history tracker.

use sea_orm::Set;
use serde::Serialize;
use tubekit_common::{AppResult, IdGenerator, PageRequest, Paginated};
use tubekit_db::{
    entities::{view, watch_history},
    repositories::{UserRepository, VideoRepository, ViewRepository, WatchHistoryRepository},
};

use crate::services::user::UserSummary;
use crate::services::video::VideoSummary;

/// Result of recording a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewOutcome {
    /// `true` if this was the viewer's first view and the counter moved.
    pub counted: bool,
}

/// One entry of a user's watch history.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchedVideo {
    pub video: VideoSummary,
    pub owner: UserSummary,
    pub watched_at: String,
}

/// View service for business logic.
#[derive(Clone)]
pub struct ViewService {
    view_repo: ViewRepository,
    video_repo: VideoRepository,
    watch_history_repo: WatchHistoryRepository,
    user_repo: UserRepository,
    watch_history_repeats: bool,
    id_gen: IdGenerator,
}

impl ViewService {
    /// Create a new view service.
    #[must_use]
    pub const fn new(
        view_repo: ViewRepository,
        video_repo: VideoRepository,
        watch_history_repo: WatchHistoryRepository,
        user_repo: UserRepository,
        watch_history_repeats: bool,
    ) -> Self {
        Self {
            view_repo,
            video_repo,
            watch_history_repo,
            user_repo,
            watch_history_repeats,
            id_gen: IdGenerator::new(),
        }
    }

    /// Record a view of a video by a viewer.
    ///
    /// The first view per (video, viewer) pair creates the dedup record,
    /// bumps the video's counter by exactly one and appends to the viewer's
    /// watch history. Repeat views mutate nothing and report
    /// `counted = false` - the counter stays at unique viewers. The
    /// dedup-insert is a single conditional write, so concurrent recorders
    /// for the same pair move the counter once, never twice.
    ///
    /// With the `watch_history_repeats` policy on, repeat views still
    /// append a history entry (the counter is unaffected).
    pub async fn record_view(&self, video_id: &str, viewer_id: &str) -> AppResult<ViewOutcome> {
        self.video_repo.get_by_id(video_id).await?;

        let model = view::ActiveModel {
            id: Set(self.id_gen.generate()),
            video_id: Set(video_id.to_string()),
            viewer_id: Set(viewer_id.to_string()),
            ..Default::default()
        };

        let counted = self.view_repo.insert_if_absent(model).await?;

        if counted {
            self.video_repo.increment_views(video_id).await?;
            self.append_history(viewer_id, video_id).await?;
            tracing::debug!(video_id, viewer_id, "First view counted");
        } else if self.watch_history_repeats {
            self.append_history(viewer_id, video_id).await?;
        }

        Ok(ViewOutcome { counted })
    }

    /// A user's watch history, most recent first, joined with video and
    /// owner summaries. Entries whose video has been deleted are skipped.
    pub async fn watch_history(
        &self,
        user_id: &str,
        page: PageRequest,
    ) -> AppResult<Paginated<WatchedVideo>> {
        self.user_repo.get_by_id(user_id).await?;

        let page = page.clamped();

        let entries = self
            .watch_history_repo
            .find_by_user(user_id, page.page_size, page.offset())
            .await?;
        let total = self.watch_history_repo.count_by_user(user_id).await?;

        let video_ids: Vec<String> = entries.iter().map(|e| e.video_id.clone()).collect();
        let videos = self.video_repo.find_by_ids(&video_ids).await?;

        let mut owner_ids: Vec<String> = videos.iter().map(|v| v.owner_id.clone()).collect();
        owner_ids.sort();
        owner_ids.dedup();
        let owners = self.user_repo.find_by_ids(&owner_ids).await?;

        let items = entries
            .iter()
            .filter_map(|e| {
                // Weak reference: deleted videos drop out of history
                let video = videos.iter().find(|v| v.id == e.video_id)?;
                let owner = owners.iter().find(|u| u.id == video.owner_id)?;
                Some(WatchedVideo {
                    video: VideoSummary::from(video),
                    owner: UserSummary::from(owner),
                    watched_at: e.watched_at.to_rfc3339(),
                })
            })
            .collect();

        Ok(Paginated::new(items, page, total))
    }

    async fn append_history(&self, user_id: &str, video_id: &str) -> AppResult<()> {
        let model = watch_history::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            video_id: Set(video_id.to_string()),
            ..Default::default()
        };
        self.watch_history_repo.append(model).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;
    use tubekit_common::AppError;
    use tubekit_db::entities::video;

    fn service_with(
        view_db: Arc<DatabaseConnection>,
        video_db: Arc<DatabaseConnection>,
        user_db: Arc<DatabaseConnection>,
    ) -> ViewService {
        let empty = || Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        ViewService::new(
            ViewRepository::new(view_db),
            VideoRepository::new(video_db),
            WatchHistoryRepository::new(empty()),
            UserRepository::new(user_db),
            false,
        )
    }

    #[tokio::test]
    async fn test_record_view_video_not_found() {
        let view_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let video_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<video::Model>::new()])
                .into_connection(),
        );
        let user_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(view_db, video_db, user_db);

        let result = service.record_view("nonexistent", "u1").await;

        match result {
            Err(AppError::VideoNotFound(id)) => assert_eq!(id, "nonexistent"),
            _ => panic!("Expected VideoNotFound error"),
        }
    }

    #[tokio::test]
    async fn test_watch_history_user_not_found() {
        let view_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let video_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<tubekit_db::entities::user::Model>::new()])
                .into_connection(),
        );

        let service = service_with(view_db, video_db, user_db);

        let result = service
            .watch_history("nonexistent", PageRequest::default())
            .await;

        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[test]
    fn test_view_outcome_serializes_counted() {
        let json = serde_json::to_string(&ViewOutcome { counted: true }).unwrap();
        assert_eq!(json, r#"{"counted":true}"#);
    }
}
