//! Video service.

use sea_orm::Set;
use serde::Serialize;
use tubekit_common::{AppError, AppResult, IdGenerator, PageRequest, Paginated};
use tubekit_db::{
    entities::{comment::ParentKind, reaction::TargetKind, video},
    repositories::{CommentRepository, ReactionRepository, UserRepository, VideoRepository},
};

// Re-export for convenience
pub use tubekit_db::repositories::{SortDirection, VideoQuery, VideoSort};

use crate::services::comment::{CommentService, CommentThreadEntry};
use crate::services::user::UserSummary;
use crate::services::view::ViewService;

/// Media references supplied by the media storage collaborator.
///
/// Only URLs and metadata cross this boundary; the core never touches
/// raw bytes.
#[derive(Debug, Clone)]
pub struct MediaRef {
    pub video_file: String,
    pub thumbnail: String,
    pub duration_secs: f64,
}

/// Input for publishing a video.
#[derive(Debug, Clone)]
pub struct PublishVideoInput {
    pub title: String,
    pub description: Option<String>,
    pub media: MediaRef,
}

/// Input for updating video fields.
#[derive(Debug, Clone, Default)]
pub struct UpdateVideoInput {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub thumbnail: Option<String>,
}

/// Search, sort and pagination parameters for the video listing.
#[derive(Debug, Clone, Default)]
pub struct VideoSearchInput {
    pub text: Option<String>,
    pub owner_id: Option<String>,
    pub sort: VideoSort,
    pub direction: SortDirection,
    pub page: PageRequest,
}

/// Video summary joined into feeds and playlists.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSummary {
    pub id: String,
    pub title: String,
    pub thumbnail: String,
    pub duration_secs: f64,
    pub views: i64,
    pub created_at: String,
}

impl From<&video::Model> for VideoSummary {
    fn from(v: &video::Model) -> Self {
        Self {
            id: v.id.clone(),
            title: v.title.clone(),
            thumbnail: v.thumbnail.clone(),
            duration_secs: v.duration_secs,
            views: v.views,
            created_at: v.created_at.to_rfc3339(),
        }
    }
}

/// One entry of the video search listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoListing {
    pub video: VideoSummary,
    pub owner: UserSummary,
}

/// The video detail page: video fields joined with the owner summary and
/// the full comment thread.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetail {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub video_file: String,
    pub thumbnail: String,
    pub duration_secs: f64,
    pub views: i64,
    pub published: bool,
    pub owner: UserSummary,
    pub comments: Vec<CommentThreadEntry>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

/// Video service for business logic.
#[derive(Clone)]
pub struct VideoService {
    video_repo: VideoRepository,
    user_repo: UserRepository,
    comment_repo: CommentRepository,
    reaction_repo: ReactionRepository,
    view_service: ViewService,
    comment_service: CommentService,
    id_gen: IdGenerator,
}

impl VideoService {
    /// Create a new video service.
    #[must_use]
    pub const fn new(
        video_repo: VideoRepository,
        user_repo: UserRepository,
        comment_repo: CommentRepository,
        reaction_repo: ReactionRepository,
        view_service: ViewService,
        comment_service: CommentService,
    ) -> Self {
        Self {
            video_repo,
            user_repo,
            comment_repo,
            reaction_repo,
            view_service,
            comment_service,
            id_gen: IdGenerator::new(),
        }
    }

    /// Publish a new video from collaborator-supplied media references.
    pub async fn publish(
        &self,
        owner_id: &str,
        input: PublishVideoInput,
    ) -> AppResult<video::Model> {
        let title = input.title.trim();
        if title.is_empty() || title.len() > 256 {
            return Err(AppError::Validation(
                "Title must be between 1 and 256 characters".to_string(),
            ));
        }

        Self::check_url(&input.media.video_file, "video file")?;
        Self::check_url(&input.media.thumbnail, "thumbnail")?;

        if input.media.duration_secs < 0.0 {
            return Err(AppError::Validation(
                "Duration cannot be negative".to_string(),
            ));
        }

        let model = video::ActiveModel {
            id: Set(self.id_gen.generate()),
            owner_id: Set(owner_id.to_string()),
            title: Set(title.to_string()),
            description: Set(input.description),
            video_file: Set(input.media.video_file),
            thumbnail: Set(input.media.thumbnail),
            duration_secs: Set(input.media.duration_secs),
            views: Set(0),
            published: Set(true),
            ..Default::default()
        };

        self.video_repo.create(model).await
    }

    /// Update video fields. Owner only.
    pub async fn update(
        &self,
        video_id: &str,
        actor_id: &str,
        input: UpdateVideoInput,
    ) -> AppResult<video::Model> {
        let video = self.owned_video(video_id, actor_id).await?;

        if let Some(ref title) = input.title
            && (title.trim().is_empty() || title.len() > 256)
        {
            return Err(AppError::Validation(
                "Title must be between 1 and 256 characters".to_string(),
            ));
        }

        if let Some(ref thumbnail) = input.thumbnail {
            Self::check_url(thumbnail, "thumbnail")?;
        }

        let mut model: video::ActiveModel = video.into();
        if let Some(title) = input.title {
            model.title = Set(title.trim().to_string());
        }
        if let Some(description) = input.description {
            model.description = Set(description);
        }
        if let Some(thumbnail) = input.thumbnail {
            model.thumbnail = Set(thumbnail);
        }
        model.updated_at = Set(Some(chrono::Utc::now().into()));

        self.video_repo.update(model).await
    }

    /// Set the published flag. Owner only.
    pub async fn set_published(
        &self,
        video_id: &str,
        actor_id: &str,
        published: bool,
    ) -> AppResult<video::Model> {
        let video = self.owned_video(video_id, actor_id).await?;

        let mut model: video::ActiveModel = video.into();
        model.published = Set(published);
        model.updated_at = Set(Some(chrono::Utc::now().into()));

        self.video_repo.update(model).await
    }

    /// Delete a video. Owner only.
    ///
    /// Cascades, in order: reactions on the video's comments, the comments
    /// themselves, reactions on the video. Views and playlist membership
    /// rows go with the video row (foreign key cascade); watch-history
    /// entries are weak references and stay behind.
    pub async fn delete(&self, video_id: &str, actor_id: &str) -> AppResult<()> {
        self.owned_video(video_id, actor_id).await?;

        let comment_ids = self
            .comment_repo
            .find_ids_by_parent(ParentKind::Video, video_id)
            .await?;
        self.reaction_repo
            .delete_by_targets(&[TargetKind::Comment], &comment_ids)
            .await?;
        self.comment_repo
            .delete_by_parent(ParentKind::Video, video_id)
            .await?;
        self.reaction_repo
            .delete_by_target(&[TargetKind::Video], video_id)
            .await?;

        self.video_repo.delete(video_id).await?;
        tracing::info!(video_id, comments = comment_ids.len(), "Deleted video");

        Ok(())
    }

    /// The video detail page for a viewer.
    ///
    /// Fetching the page is what counts as watching: the view tracker runs
    /// first (bumping the unique-viewer counter at most once for this
    /// viewer), then the owner summary and comment thread are joined in.
    pub async fn detail(&self, video_id: &str, viewer_id: &str) -> AppResult<VideoDetail> {
        self.view_service.record_view(video_id, viewer_id).await?;

        let video = self.video_repo.get_by_id(video_id).await?;
        let owner = self.user_repo.get_by_id(&video.owner_id).await?;

        let comments = self
            .comment_repo
            .find_all_by_parent(ParentKind::Video, video_id)
            .await?;
        let thread = self.comment_service.join_authors(&comments).await?;

        Ok(VideoDetail {
            id: video.id,
            title: video.title,
            description: video.description,
            video_file: video.video_file,
            thumbnail: video.thumbnail,
            duration_secs: video.duration_secs,
            views: video.views,
            published: video.published,
            owner: UserSummary::from(owner),
            comments: thread,
            created_at: video.created_at.to_rfc3339(),
            updated_at: video.updated_at.map(|t| t.to_rfc3339()),
        })
    }

    /// Search published videos, joined with owner summaries.
    ///
    /// Zero matches is an ordinary empty page, never an error.
    pub async fn search(&self, input: &VideoSearchInput) -> AppResult<Paginated<VideoListing>> {
        let page = input.page.clamped();

        let query = VideoQuery {
            text: input.text.as_deref(),
            owner_id: input.owner_id.as_deref(),
            include_unpublished: false,
            sort: input.sort,
            direction: input.direction,
        };

        let (videos, total) = self
            .video_repo
            .search(&query, page.index(), page.page_size)
            .await?;

        let mut owner_ids: Vec<String> = videos.iter().map(|v| v.owner_id.clone()).collect();
        owner_ids.sort();
        owner_ids.dedup();
        let owners = self.user_repo.find_by_ids(&owner_ids).await?;

        let items = videos
            .iter()
            .filter_map(|v| {
                let owner = owners.iter().find(|u| u.id == v.owner_id)?;
                Some(VideoListing {
                    video: VideoSummary::from(v),
                    owner: UserSummary::from(owner),
                })
            })
            .collect();

        Ok(Paginated::new(items, page, total))
    }

    /// Get a video by ID without side effects (ownership views, dashboards).
    pub async fn get_by_id(&self, video_id: &str) -> AppResult<video::Model> {
        self.video_repo.get_by_id(video_id).await
    }

    async fn owned_video(&self, video_id: &str, actor_id: &str) -> AppResult<video::Model> {
        // Existence before ownership
        let video = self.video_repo.get_by_id(video_id).await?;

        if video.owner_id != actor_id {
            return Err(AppError::Forbidden("Not the video owner".to_string()));
        }

        Ok(video)
    }

    fn check_url(value: &str, field: &str) -> AppResult<()> {
        url::Url::parse(value)
            .map_err(|_| AppError::Validation(format!("Invalid {field} URL")))?;
        Ok(())
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
    use tubekit_db::repositories::{PostRepository, ViewRepository, WatchHistoryRepository};

    fn create_test_video(id: &str, owner_id: &str) -> video::Model {
        video::Model {
            id: id.to_string(),
            owner_id: owner_id.to_string(),
            title: "Test video".to_string(),
            description: None,
            video_file: "https://media.example.com/v.mp4".to_string(),
            thumbnail: "https://media.example.com/v.jpg".to_string(),
            duration_secs: 60.0,
            views: 0,
            published: true,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn empty() -> Arc<DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn service_with(
        video_db: Arc<DatabaseConnection>,
        user_db: Arc<DatabaseConnection>,
    ) -> VideoService {
        let view_service = ViewService::new(
            ViewRepository::new(empty()),
            VideoRepository::new(empty()),
            WatchHistoryRepository::new(empty()),
            UserRepository::new(empty()),
            false,
        );
        let comment_service = CommentService::new(
            CommentRepository::new(empty()),
            ReactionRepository::new(empty()),
            VideoRepository::new(empty()),
            PostRepository::new(empty()),
            UserRepository::new(user_db.clone()),
        );
        VideoService::new(
            VideoRepository::new(video_db),
            UserRepository::new(user_db),
            CommentRepository::new(empty()),
            ReactionRepository::new(empty()),
            view_service,
            comment_service,
        )
    }

    fn publish_input() -> PublishVideoInput {
        PublishVideoInput {
            title: "My video".to_string(),
            description: None,
            media: MediaRef {
                video_file: "https://media.example.com/v.mp4".to_string(),
                thumbnail: "https://media.example.com/v.jpg".to_string(),
                duration_secs: 42.5,
            },
        }
    }

    #[tokio::test]
    async fn test_publish_empty_title() {
        let service = service_with(empty(), empty());

        let mut input = publish_input();
        input.title = "  ".to_string();
        let result = service.publish("u1", input).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_publish_invalid_media_url() {
        let service = service_with(empty(), empty());

        let mut input = publish_input();
        input.media.video_file = "not a url".to_string();
        let result = service.publish("u1", input).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_publish_negative_duration() {
        let service = service_with(empty(), empty());

        let mut input = publish_input();
        input.media.duration_secs = -1.0;
        let result = service.publish("u1", input).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_not_owner() {
        let video_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_video("v1", "u1")]])
                .into_connection(),
        );

        let service = service_with(video_db, empty());

        let result = service
            .update("v1", "intruder", UpdateVideoInput::default())
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_delete_video_not_found() {
        let video_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<video::Model>::new()])
                .into_connection(),
        );

        let service = service_with(video_db, empty());

        let result = service.delete("missing", "u1").await;

        assert!(matches!(result, Err(AppError::VideoNotFound(_))));
    }

    #[tokio::test]
    async fn test_search_zero_matches_is_empty_page() {
        let video_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // paginator count, then the page fetch
                .append_query_results([[btreemap! {
                    "num_items" => Into::<Value>::into(0i64),
                }]])
                .append_query_results([Vec::<video::Model>::new()])
                .into_connection(),
        );

        let service = service_with(video_db, empty());

        let result = service
            .search(&VideoSearchInput {
                text: Some("nothing matches this".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(result.total_count, 0);
        assert!(result.items.is_empty());
        assert_eq!(result.page, 1);
    }
}
