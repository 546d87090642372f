//! Comment service - the comment thread store.

use sea_orm::Set;
use serde::Serialize;
use tubekit_common::{AppError, AppResult, IdGenerator, PageRequest, Paginated};
use tubekit_db::{
    entities::{comment, comment::ParentKind, reaction::TargetKind},
    repositories::{
        CommentRepository, PostRepository, ReactionRepository, UserRepository, VideoRepository,
    },
};

use crate::services::user::UserSummary;

/// A comment joined with its author summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThreadEntry {
    pub id: String,
    pub content: String,
    pub author: UserSummary,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl CommentThreadEntry {
    fn join(comment: &comment::Model, author: &UserSummary) -> Self {
        Self {
            id: comment.id.clone(),
            content: comment.content.clone(),
            author: author.clone(),
            created_at: comment.created_at.to_rfc3339(),
            updated_at: comment.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    reaction_repo: ReactionRepository,
    video_repo: VideoRepository,
    post_repo: PostRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(
        comment_repo: CommentRepository,
        reaction_repo: ReactionRepository,
        video_repo: VideoRepository,
        post_repo: PostRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            comment_repo,
            reaction_repo,
            video_repo,
            post_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a comment under a video or post.
    pub async fn create(
        &self,
        author_id: &str,
        parent_kind: ParentKind,
        parent_id: &str,
        content: &str,
    ) -> AppResult<comment::Model> {
        self.check_parent_exists(parent_kind, parent_id).await?;

        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::Validation("Comment is required".to_string()));
        }

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            owner_id: Set(author_id.to_string()),
            parent_kind: Set(parent_kind),
            parent_id: Set(parent_id.to_string()),
            content: Set(content.to_string()),
            ..Default::default()
        };

        self.comment_repo.create(model).await
    }

    /// Update a comment's content. Owner only.
    pub async fn update(
        &self,
        comment_id: &str,
        actor_id: &str,
        new_content: &str,
    ) -> AppResult<comment::Model> {
        // Existence before ownership
        let comment = self.comment_repo.get_by_id(comment_id).await?;

        if comment.owner_id != actor_id {
            return Err(AppError::Forbidden("Not the comment author".to_string()));
        }

        let new_content = new_content.trim();
        if new_content.is_empty() {
            return Err(AppError::Validation("Comment is required".to_string()));
        }

        let mut model: comment::ActiveModel = comment.into();
        model.content = Set(new_content.to_string());
        model.updated_at = Set(Some(chrono::Utc::now().into()));

        self.comment_repo.update(model).await
    }

    /// Delete a comment. Owner only.
    ///
    /// Cascades: reactions targeting this comment are removed so no
    /// polymorphic reaction rows are orphaned.
    pub async fn delete(&self, comment_id: &str, actor_id: &str) -> AppResult<()> {
        let comment = self.comment_repo.get_by_id(comment_id).await?;

        if comment.owner_id != actor_id {
            return Err(AppError::Forbidden("Not the comment author".to_string()));
        }

        self.comment_repo.delete(comment_id).await?;

        let removed = self
            .reaction_repo
            .delete_by_target(&[TargetKind::Comment, TargetKind::PostComment], comment_id)
            .await?;
        tracing::debug!(comment_id, removed, "Deleted comment and its reactions");

        Ok(())
    }

    /// The comment thread under a parent, reverse-chronological, each entry
    /// joined with its author summary.
    pub async fn list(
        &self,
        parent_kind: ParentKind,
        parent_id: &str,
        page: PageRequest,
    ) -> AppResult<Paginated<CommentThreadEntry>> {
        self.check_parent_exists(parent_kind, parent_id).await?;

        let page = page.clamped();

        let comments = self
            .comment_repo
            .find_by_parent(parent_kind, parent_id, page.page_size, page.offset())
            .await?;
        let total = self
            .comment_repo
            .count_by_parent(parent_kind, parent_id)
            .await?;

        let items = self.join_authors(&comments).await?;

        Ok(Paginated::new(items, page, total))
    }

    /// Join author summaries onto a batch of comments, preserving order.
    pub(crate) async fn join_authors(
        &self,
        comments: &[comment::Model],
    ) -> AppResult<Vec<CommentThreadEntry>> {
        let mut author_ids: Vec<String> = comments.iter().map(|c| c.owner_id.clone()).collect();
        author_ids.sort();
        author_ids.dedup();
        let authors = self.user_repo.find_by_ids(&author_ids).await?;

        Ok(comments
            .iter()
            .filter_map(|c| {
                let author = authors.iter().find(|u| u.id == c.owner_id)?;
                Some(CommentThreadEntry::join(c, &UserSummary::from(author)))
            })
            .collect())
    }

    async fn check_parent_exists(&self, parent_kind: ParentKind, parent_id: &str) -> AppResult<()> {
        match parent_kind {
            ParentKind::Video => {
                self.video_repo.get_by_id(parent_id).await?;
            }
            ParentKind::Post => {
                self.post_repo.get_by_id(parent_id).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;
    use tubekit_db::entities::{post, video};

    fn create_test_video(id: &str) -> video::Model {
        video::Model {
            id: id.to_string(),
            owner_id: "owner1".to_string(),
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

    fn create_test_comment(id: &str, owner_id: &str) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            owner_id: owner_id.to_string(),
            parent_kind: ParentKind::Video,
            parent_id: "v1".to_string(),
            content: "Nice video".to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service_with(
        comment_db: Arc<DatabaseConnection>,
        video_db: Arc<DatabaseConnection>,
        post_db: Arc<DatabaseConnection>,
    ) -> CommentService {
        let empty = || Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        CommentService::new(
            CommentRepository::new(comment_db),
            ReactionRepository::new(empty()),
            VideoRepository::new(video_db),
            PostRepository::new(post_db),
            UserRepository::new(empty()),
        )
    }

    #[tokio::test]
    async fn test_create_parent_not_found() {
        let comment_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let video_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<video::Model>::new()])
                .into_connection(),
        );
        let post_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(comment_db, video_db, post_db);

        let result = service
            .create("u1", ParentKind::Video, "nonexistent", "Hello")
            .await;

        assert!(matches!(result, Err(AppError::VideoNotFound(_))));
    }

    #[tokio::test]
    async fn test_create_empty_content() {
        let comment_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let video_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_video("v1")]])
                .into_connection(),
        );
        let post_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(comment_db, video_db, post_db);

        let result = service.create("u1", ParentKind::Video, "v1", "   ").await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_not_author() {
        let comment_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_comment("c1", "u1")]])
                .into_connection(),
        );
        let video_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let post_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(comment_db, video_db, post_db);

        let result = service.update("c1", "intruder", "Edited").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_update_comment_not_found_before_ownership() {
        // A missing comment reports NotFound even for a non-owner actor
        let comment_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<comment::Model>::new()])
                .into_connection(),
        );
        let video_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let post_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(comment_db, video_db, post_db);

        let result = service.update("missing", "anyone", "Edited").await;

        assert!(matches!(result, Err(AppError::CommentNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_not_author() {
        let comment_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_comment("c1", "u1")]])
                .into_connection(),
        );
        let video_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let post_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(comment_db, video_db, post_db);

        let result = service.delete("c1", "intruder").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_list_parent_not_found() {
        let comment_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let video_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );

        let service = service_with(comment_db, video_db, post_db);

        let result = service
            .list(ParentKind::Post, "nonexistent", PageRequest::default())
            .await;

        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }
}
