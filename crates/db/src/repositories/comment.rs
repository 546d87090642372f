//! Comment repository.

use std::sync::Arc;

use crate::entities::{Comment, comment};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use tubekit_common::{AppError, AppResult};

/// Comment repository for database operations.
#[derive(Clone)]
pub struct CommentRepository {
    db: Arc<DatabaseConnection>,
}

impl CommentRepository {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a comment by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<comment::Model>> {
        Comment::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a comment by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<comment::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::CommentNotFound(id.to_string()))
    }

    /// Create a new comment.
    pub async fn create(&self, model: comment::ActiveModel) -> AppResult<comment::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a comment.
    pub async fn update(&self, model: comment::ActiveModel) -> AppResult<comment::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a comment.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Comment::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get comments under a parent (newest first).
    pub async fn find_by_parent(
        &self,
        parent_kind: comment::ParentKind,
        parent_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<comment::Model>> {
        Comment::find()
            .filter(comment::Column::ParentKind.eq(parent_kind))
            .filter(comment::Column::ParentId.eq(parent_id))
            .order_by_desc(comment::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get all comments under a parent, oldest first (for detail joins).
    pub async fn find_all_by_parent(
        &self,
        parent_kind: comment::ParentKind,
        parent_id: &str,
    ) -> AppResult<Vec<comment::Model>> {
        Comment::find()
            .filter(comment::Column::ParentKind.eq(parent_kind))
            .filter(comment::Column::ParentId.eq(parent_id))
            .order_by_asc(comment::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count comments under a parent.
    pub async fn count_by_parent(
        &self,
        parent_kind: comment::ParentKind,
        parent_id: &str,
    ) -> AppResult<u64> {
        Comment::find()
            .filter(comment::Column::ParentKind.eq(parent_kind))
            .filter(comment::Column::ParentId.eq(parent_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get the IDs of all comments under a parent (for reaction cascades).
    pub async fn find_ids_by_parent(
        &self,
        parent_kind: comment::ParentKind,
        parent_id: &str,
    ) -> AppResult<Vec<String>> {
        Comment::find()
            .select_only()
            .column(comment::Column::Id)
            .filter(comment::Column::ParentKind.eq(parent_kind))
            .filter(comment::Column::ParentId.eq(parent_id))
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete all comments under a parent (cascade from parent deletion).
    pub async fn delete_by_parent(
        &self,
        parent_kind: comment::ParentKind,
        parent_id: &str,
    ) -> AppResult<u64> {
        let result = Comment::delete_many()
            .filter(comment::Column::ParentKind.eq(parent_kind))
            .filter(comment::Column::ParentId.eq(parent_id))
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

    fn create_test_comment(
        id: &str,
        owner_id: &str,
        parent_kind: comment::ParentKind,
        parent_id: &str,
    ) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            owner_id: owner_id.to_string(),
            parent_kind,
            parent_id: parent_id.to_string(),
            content: "Nice video".to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<comment::Model>::new()])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        let result = repo.get_by_id("nonexistent").await;

        match result {
            Err(AppError::CommentNotFound(id)) => assert_eq!(id, "nonexistent"),
            _ => panic!("Expected CommentNotFound error"),
        }
    }

    #[tokio::test]
    async fn test_find_by_parent() {
        let c1 = create_test_comment("c1", "u1", comment::ParentKind::Video, "v1");
        let c2 = create_test_comment("c2", "u2", comment::ParentKind::Video, "v1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[c1, c2]])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        let result = repo
            .find_by_parent(comment::ParentKind::Video, "v1", 10, 0)
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_by_parent() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 2,
                }])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        let deleted = repo
            .delete_by_parent(comment::ParentKind::Post, "p1")
            .await
            .unwrap();

        assert_eq!(deleted, 2);
    }
}
