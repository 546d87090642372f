//! Reaction repository.
//!
//! Carries the atomic conditional writes the toggle engine relies on:
//! insert-if-absent backed by the unique (user, kind, target) index, and
//! delete-if-present checked through `rows_affected`.

use std::sync::Arc;

use crate::entities::{Reaction, reaction};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, TryInsertResult, sea_query::OnConflict,
};
use tubekit_common::{AppError, AppResult};

/// Reaction repository for database operations.
#[derive(Clone)]
pub struct ReactionRepository {
    db: Arc<DatabaseConnection>,
}

impl ReactionRepository {
    /// Create a new reaction repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a reaction by actor and target.
    pub async fn find_by_actor_and_target(
        &self,
        user_id: &str,
        target_kind: reaction::TargetKind,
        target_id: &str,
    ) -> AppResult<Option<reaction::Model>> {
        Reaction::find()
            .filter(reaction::Column::UserId.eq(user_id))
            .filter(reaction::Column::TargetKind.eq(target_kind))
            .filter(reaction::Column::TargetId.eq(target_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if an actor has reacted to a target.
    pub async fn exists(
        &self,
        user_id: &str,
        target_kind: reaction::TargetKind,
        target_id: &str,
    ) -> AppResult<bool> {
        Ok(self
            .find_by_actor_and_target(user_id, target_kind, target_id)
            .await?
            .is_some())
    }

    /// Insert a reaction unless one already exists for its (actor, target)
    /// tuple. A single conditional statement: two concurrent togglers can
    /// never both insert.
    ///
    /// Returns `true` if the row was inserted, `false` if a concurrent
    /// writer got there first.
    pub async fn insert_if_absent(&self, model: reaction::ActiveModel) -> AppResult<bool> {
        let result = Reaction::insert(model)
            .on_conflict(
                OnConflict::columns([
                    reaction::Column::UserId,
                    reaction::Column::TargetKind,
                    reaction::Column::TargetId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .do_nothing()
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(matches!(result, TryInsertResult::Inserted(_)))
    }

    /// Delete the reaction for an (actor, target) tuple if present.
    ///
    /// Returns `true` if a row was deleted, `false` if there was nothing to
    /// delete (a concurrent toggler may have removed it already).
    pub async fn delete_if_present(
        &self,
        user_id: &str,
        target_kind: reaction::TargetKind,
        target_id: &str,
    ) -> AppResult<bool> {
        let result = Reaction::delete_many()
            .filter(reaction::Column::UserId.eq(user_id))
            .filter(reaction::Column::TargetKind.eq(target_kind))
            .filter(reaction::Column::TargetId.eq(target_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    /// Delete all reactions on a single target (cascade from target deletion).
    pub async fn delete_by_target(
        &self,
        target_kinds: &[reaction::TargetKind],
        target_id: &str,
    ) -> AppResult<u64> {
        let result = Reaction::delete_many()
            .filter(reaction::Column::TargetKind.is_in(target_kinds.iter().copied()))
            .filter(reaction::Column::TargetId.eq(target_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Delete all reactions on a batch of targets (cascade from parent
    /// deletion, e.g. all comments of a removed video).
    pub async fn delete_by_targets(
        &self,
        target_kinds: &[reaction::TargetKind],
        target_ids: &[String],
    ) -> AppResult<u64> {
        if target_ids.is_empty() {
            return Ok(0);
        }

        let result = Reaction::delete_many()
            .filter(reaction::Column::TargetKind.is_in(target_kinds.iter().copied()))
            .filter(reaction::Column::TargetId.is_in(target_ids.to_vec()))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Get reactions by a user on a given target kind (newest first).
    pub async fn find_by_user_and_kind(
        &self,
        user_id: &str,
        target_kind: reaction::TargetKind,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<reaction::Model>> {
        Reaction::find()
            .filter(reaction::Column::UserId.eq(user_id))
            .filter(reaction::Column::TargetKind.eq(target_kind))
            .order_by_desc(reaction::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count reactions by a user on a given target kind.
    pub async fn count_by_user_and_kind(
        &self,
        user_id: &str,
        target_kind: reaction::TargetKind,
    ) -> AppResult<u64> {
        Reaction::find()
            .filter(reaction::Column::UserId.eq(user_id))
            .filter(reaction::Column::TargetKind.eq(target_kind))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count reactions on a target.
    pub async fn count_by_target(
        &self,
        target_kind: reaction::TargetKind,
        target_id: &str,
    ) -> AppResult<u64> {
        Reaction::find()
            .filter(reaction::Column::TargetKind.eq(target_kind))
            .filter(reaction::Column::TargetId.eq(target_id))
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
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_reaction(
        id: &str,
        user_id: &str,
        target_kind: reaction::TargetKind,
        target_id: &str,
    ) -> reaction::Model {
        reaction::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            target_kind,
            target_id: target_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_actor_and_target_found() {
        let r = create_test_reaction("r1", "u1", reaction::TargetKind::Video, "v1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[r.clone()]])
                .into_connection(),
        );

        let repo = ReactionRepository::new(db);
        let result = repo
            .find_by_actor_and_target("u1", reaction::TargetKind::Video, "v1")
            .await
            .unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().target_id, "v1");
    }

    #[tokio::test]
    async fn test_exists_false() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<reaction::Model>::new()])
                .into_connection(),
        );

        let repo = ReactionRepository::new(db);
        let result = repo
            .exists("u1", reaction::TargetKind::Post, "p1")
            .await
            .unwrap();

        assert!(!result);
    }

    #[tokio::test]
    async fn test_delete_if_present_deletes() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = ReactionRepository::new(db);
        let deleted = repo
            .delete_if_present("u1", reaction::TargetKind::Video, "v1")
            .await
            .unwrap();

        assert!(deleted);
    }

    #[tokio::test]
    async fn test_delete_if_present_nothing_to_delete() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = ReactionRepository::new(db);
        let deleted = repo
            .delete_if_present("u1", reaction::TargetKind::Video, "v1")
            .await
            .unwrap();

        assert!(!deleted);
    }

    #[tokio::test]
    async fn test_delete_by_targets_empty_batch() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = ReactionRepository::new(db);
        let deleted = repo
            .delete_by_targets(
                &[
                    reaction::TargetKind::Comment,
                    reaction::TargetKind::PostComment,
                ],
                &[],
            )
            .await
            .unwrap();

        assert_eq!(deleted, 0);
    }

    #[tokio::test]
    async fn test_find_by_user_and_kind() {
        let r1 = create_test_reaction("r1", "u1", reaction::TargetKind::Video, "v1");
        let r2 = create_test_reaction("r2", "u1", reaction::TargetKind::Video, "v2");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[r1, r2]])
                .into_connection(),
        );

        let repo = ReactionRepository::new(db);
        let result = repo
            .find_by_user_and_kind("u1", reaction::TargetKind::Video, 10, 0)
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
    }
}
