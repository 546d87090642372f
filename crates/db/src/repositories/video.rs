//! Video repository.

use std::sync::Arc;

use crate::entities::{Video, video};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbBackend, EntityTrait,
    FromQueryResult, Order, PaginatorTrait, QueryFilter, QueryOrder, Select, Statement,
    sea_query::Expr,
};
use tubekit_common::{AppError, AppResult};

/// Sortable video fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoSort {
    /// Creation time (the default).
    #[default]
    CreatedAt,
    /// Unique-viewer count.
    Views,
    /// Duration in seconds.
    Duration,
    /// Title, lexicographic.
    Title,
}

impl VideoSort {
    const fn column(self) -> video::Column {
        match self {
            Self::CreatedAt => video::Column::CreatedAt,
            Self::Views => video::Column::Views,
            Self::Duration => video::Column::DurationSecs,
            Self::Title => video::Column::Title,
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Ascending.
    Asc,
    /// Descending (the default).
    #[default]
    Desc,
}

impl SortDirection {
    const fn order(self) -> Order {
        match self {
            Self::Asc => Order::Asc,
            Self::Desc => Order::Desc,
        }
    }
}

/// Filter and sort parameters for a video search.
#[derive(Debug, Clone, Copy, Default)]
pub struct VideoQuery<'a> {
    /// Free-text query over title and description.
    pub text: Option<&'a str>,
    /// Restrict to one owner's videos.
    pub owner_id: Option<&'a str>,
    /// Include unpublished videos (owner dashboards only).
    pub include_unpublished: bool,
    /// Sort field.
    pub sort: VideoSort,
    /// Sort direction.
    pub direction: SortDirection,
}

/// Video repository for database operations.
#[derive(Clone)]
pub struct VideoRepository {
    db: Arc<DatabaseConnection>,
}

impl VideoRepository {
    /// Create a new video repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a video by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<video::Model>> {
        Video::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a video by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<video::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::VideoNotFound(id.to_string()))
    }

    /// Find videos by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<video::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Video::find()
            .filter(video::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count how many of the given IDs reference existing videos.
    pub async fn count_existing(&self, ids: &[String]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        Video::find()
            .filter(video::Column::Id.is_in(ids.to_vec()))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new video.
    pub async fn create(&self, model: video::ActiveModel) -> AppResult<video::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a video.
    pub async fn update(&self, model: video::ActiveModel) -> AppResult<video::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a video.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Video::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Increment the unique-viewer count atomically (single UPDATE query,
    /// no fetch). Called at most once per (video, viewer) by the tracker.
    pub async fn increment_views(&self, video_id: &str) -> AppResult<()> {
        Video::update_many()
            .col_expr(
                video::Column::Views,
                Expr::col(video::Column::Views).add(1),
            )
            .filter(video::Column::Id.eq(video_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Sum of view counts over one owner's videos.
    pub async fn sum_views_by_owner(&self, owner_id: &str) -> AppResult<i64> {
        #[derive(FromQueryResult)]
        struct TotalViews {
            total: i64,
        }

        let row = TotalViews::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT COALESCE(SUM(views), 0)::BIGINT AS total FROM video WHERE owner_id = $1",
            [owner_id.into()],
        ))
        .one(self.db.as_ref())
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row.map_or(0, |r| r.total))
    }

    /// Count one owner's videos.
    pub async fn count_by_owner(&self, owner_id: &str) -> AppResult<u64> {
        Video::find()
            .filter(video::Column::OwnerId.eq(owner_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Search videos: optional full-text match, sorted, paginated.
    ///
    /// The text match uses `PostgreSQL` full-text search against the GIN
    /// index over title and description, falling back to LIKE when the
    /// full-text query fails. Returns the page of rows plus the total match
    /// count; zero matches is an ordinary empty result.
    pub async fn search(
        &self,
        query: &VideoQuery<'_>,
        page_index: u64,
        page_size: u64,
    ) -> AppResult<(Vec<video::Model>, u64)> {
        let base = self.base_select(query);

        let Some(text) = query.text else {
            return self.fetch_page(base, query, page_index, page_size).await;
        };

        let fulltext = base.clone().filter(Expr::cust_with_values(
            "to_tsvector('simple', title || ' ' || COALESCE(description, '')) @@ plainto_tsquery('simple', ?)",
            [text],
        ));

        match self.fetch_page(fulltext, query, page_index, page_size).await {
            Ok(result) => Ok(result),
            Err(_) => {
                // Fallback to LIKE search
                let pattern = format!("%{}%", text.replace('%', "\\%").replace('_', "\\_"));
                let like = base.filter(
                    Condition::any()
                        .add(video::Column::Title.like(&pattern))
                        .add(video::Column::Description.like(&pattern)),
                );
                self.fetch_page(like, query, page_index, page_size).await
            }
        }
    }

    fn base_select(&self, query: &VideoQuery<'_>) -> Select<Video> {
        let mut select = Video::find();

        if !query.include_unpublished {
            select = select.filter(video::Column::Published.eq(true));
        }

        if let Some(owner_id) = query.owner_id {
            select = select.filter(video::Column::OwnerId.eq(owner_id));
        }

        select
    }

    async fn fetch_page(
        &self,
        select: Select<Video>,
        query: &VideoQuery<'_>,
        page_index: u64,
        page_size: u64,
    ) -> AppResult<(Vec<video::Model>, u64)> {
        // Secondary sort on id keeps the order total: pages never overlap
        // or reorder for equal sort keys.
        let select = select
            .order_by(query.sort.column(), query.direction.order())
            .order_by(video::Column::Id, Order::Desc);

        let paginator = select.paginate(self.db.as_ref(), page_size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        let items = paginator
            .fetch_page(page_index)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((items, total))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_video(id: &str, owner_id: &str, title: &str) -> video::Model {
        video::Model {
            id: id.to_string(),
            owner_id: owner_id.to_string(),
            title: title.to_string(),
            description: None,
            video_file: format!("https://media.example.com/{id}.mp4"),
            thumbnail: format!("https://media.example.com/{id}.jpg"),
            duration_secs: 60.0,
            views: 0,
            published: true,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_id_found() {
        let v = create_test_video("v1", "u1", "First video");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[v.clone()]])
                .into_connection(),
        );

        let repo = VideoRepository::new(db);
        let result = repo.find_by_id("v1").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().title, "First video");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<video::Model>::new()])
                .into_connection(),
        );

        let repo = VideoRepository::new(db);
        let result = repo.get_by_id("nonexistent").await;

        match result {
            Err(AppError::VideoNotFound(id)) => assert_eq!(id, "nonexistent"),
            _ => panic!("Expected VideoNotFound error"),
        }
    }

    #[tokio::test]
    async fn test_find_by_ids_empty() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = VideoRepository::new(db);
        let result = repo.find_by_ids(&[]).await.unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_count_existing_empty_batch() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = VideoRepository::new(db);
        let result = repo.count_existing(&[]).await.unwrap();

        assert_eq!(result, 0);
    }

    #[test]
    fn test_sort_defaults() {
        let query = VideoQuery::default();
        assert_eq!(query.sort, VideoSort::CreatedAt);
        assert_eq!(query.direction, SortDirection::Desc);
        assert!(!query.include_unpublished);
    }
}
