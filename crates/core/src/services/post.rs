//! Post service.

use sea_orm::Set;
use tubekit_common::{AppError, AppResult, IdGenerator, PageRequest, Paginated};
use tubekit_db::{
    entities::{comment::ParentKind, post, reaction::TargetKind},
    repositories::{CommentRepository, PostRepository, ReactionRepository, UserRepository},
};

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    comment_repo: CommentRepository,
    reaction_repo: ReactionRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub const fn new(
        post_repo: PostRepository,
        comment_repo: CommentRepository,
        reaction_repo: ReactionRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            post_repo,
            comment_repo,
            reaction_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a post.
    pub async fn create(
        &self,
        owner_id: &str,
        content: &str,
        image: Option<String>,
    ) -> AppResult<post::Model> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::Validation("Content is required".to_string()));
        }

        if let Some(ref image) = image {
            url::Url::parse(image)
                .map_err(|_| AppError::Validation("Invalid image URL".to_string()))?;
        }

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            owner_id: Set(owner_id.to_string()),
            content: Set(content.to_string()),
            image: Set(image),
            ..Default::default()
        };

        self.post_repo.create(model).await
    }

    /// Update a post's content. Owner only.
    pub async fn update(
        &self,
        post_id: &str,
        actor_id: &str,
        new_content: &str,
    ) -> AppResult<post::Model> {
        // Existence before ownership
        let post = self.post_repo.get_by_id(post_id).await?;

        if post.owner_id != actor_id {
            return Err(AppError::Forbidden("Not the post owner".to_string()));
        }

        let new_content = new_content.trim();
        if new_content.is_empty() {
            return Err(AppError::Validation("Content is required".to_string()));
        }

        let mut model: post::ActiveModel = post.into();
        model.content = Set(new_content.to_string());
        model.updated_at = Set(Some(chrono::Utc::now().into()));

        self.post_repo.update(model).await
    }

    /// Delete a post. Owner only.
    ///
    /// Cascades, in order: reactions on the post's comments, the comments
    /// themselves, reactions on the post.
    pub async fn delete(&self, post_id: &str, actor_id: &str) -> AppResult<()> {
        let post = self.post_repo.get_by_id(post_id).await?;

        if post.owner_id != actor_id {
            return Err(AppError::Forbidden("Not the post owner".to_string()));
        }

        let comment_ids = self
            .comment_repo
            .find_ids_by_parent(ParentKind::Post, post_id)
            .await?;
        self.reaction_repo
            .delete_by_targets(&[TargetKind::PostComment], &comment_ids)
            .await?;
        self.comment_repo
            .delete_by_parent(ParentKind::Post, post_id)
            .await?;
        self.reaction_repo
            .delete_by_target(&[TargetKind::Post], post_id)
            .await?;

        self.post_repo.delete(post_id).await?;
        tracing::info!(post_id, comments = comment_ids.len(), "Deleted post");

        Ok(())
    }

    /// Get a post by ID.
    pub async fn get_by_id(&self, post_id: &str) -> AppResult<post::Model> {
        self.post_repo.get_by_id(post_id).await
    }

    /// A user's posts, newest first.
    pub async fn list_by_owner(
        &self,
        owner_id: &str,
        page: PageRequest,
    ) -> AppResult<Paginated<post::Model>> {
        self.user_repo.get_by_id(owner_id).await?;

        let page = page.clamped();

        let posts = self
            .post_repo
            .find_by_owner(owner_id, page.page_size, page.offset())
            .await?;
        let total = self.post_repo.count_by_owner(owner_id).await?;

        Ok(Paginated::new(posts, page, total))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn create_test_post(id: &str, owner_id: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            owner_id: owner_id.to_string(),
            content: "Hello channel".to_string(),
            image: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service_with(post_db: Arc<DatabaseConnection>) -> PostService {
        let empty = || Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        PostService::new(
            PostRepository::new(post_db),
            CommentRepository::new(empty()),
            ReactionRepository::new(empty()),
            UserRepository::new(empty()),
        )
    }

    #[tokio::test]
    async fn test_create_empty_content() {
        let post_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service_with(post_db);

        let result = service.create("u1", "  ", None).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_invalid_image_url() {
        let post_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service_with(post_db);

        let result = service
            .create("u1", "Hello", Some("not a url".to_string()))
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_not_owner() {
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_post("p1", "u1")]])
                .into_connection(),
        );
        let service = service_with(post_db);

        let result = service.update("p1", "intruder", "Edited").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_delete_post_not_found() {
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );
        let service = service_with(post_db);

        let result = service.delete("missing", "u1").await;

        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }
}
