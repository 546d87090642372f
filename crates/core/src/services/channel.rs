//! Channel service - read-only channel aggregations.

use serde::Serialize;
use tubekit_common::AppResult;
use tubekit_db::repositories::{SubscriptionRepository, UserRepository, VideoRepository};

/// A channel's public profile with its subscription aggregates, relative
/// to the viewing user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelProfile {
    pub id: String,
    pub user_name: String,
    pub full_name: String,
    pub avatar: Option<String>,
    pub cover_image: Option<String>,
    /// Edges where this channel is the target.
    pub subscriber_count: u64,
    /// Edges where this channel's owner is the subscriber.
    pub subscribed_count: u64,
    /// Whether the viewer subscribes to this channel. Always `false` for
    /// anonymous viewers.
    pub is_subscribed: bool,
}

/// Aggregate statistics for a channel dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStats {
    pub total_views: i64,
    pub total_subscribers: u64,
    pub total_videos: u64,
}

/// Channel service for business logic.
#[derive(Clone)]
pub struct ChannelService {
    user_repo: UserRepository,
    subscription_repo: SubscriptionRepository,
    video_repo: VideoRepository,
}

impl ChannelService {
    /// Create a new channel service.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        subscription_repo: SubscriptionRepository,
        video_repo: VideoRepository,
    ) -> Self {
        Self {
            user_repo,
            subscription_repo,
            video_repo,
        }
    }

    /// The channel profile for a handle, seen by an optional viewer.
    pub async fn profile(
        &self,
        channel_user_name: &str,
        viewer_id: Option<&str>,
    ) -> AppResult<ChannelProfile> {
        let owner = self.user_repo.get_by_user_name(channel_user_name).await?;

        let subscriber_count = self.subscription_repo.count_by_channel(&owner.id).await?;
        let subscribed_count = self.subscription_repo.count_by_subscriber(&owner.id).await?;

        let is_subscribed = match viewer_id {
            Some(viewer_id) => self.subscription_repo.exists(viewer_id, &owner.id).await?,
            None => false,
        };

        Ok(ChannelProfile {
            id: owner.id,
            user_name: owner.user_name,
            full_name: owner.full_name,
            avatar: owner.avatar,
            cover_image: owner.cover_image,
            subscriber_count,
            subscribed_count,
            is_subscribed,
        })
    }

    /// Aggregate statistics for a channel.
    pub async fn stats(&self, channel_id: &str) -> AppResult<ChannelStats> {
        self.user_repo.get_by_id(channel_id).await?;

        let total_views = self.video_repo.sum_views_by_owner(channel_id).await?;
        let total_subscribers = self.subscription_repo.count_by_channel(channel_id).await?;
        let total_videos = self.video_repo.count_by_owner(channel_id).await?;

        Ok(ChannelStats {
            total_views,
            total_subscribers,
            total_videos,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::sync::Arc;
    use tubekit_common::AppError;
    use tubekit_db::entities::user;

    fn create_test_user(id: &str, user_name: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            user_name: user_name.to_string(),
            email: format!("{user_name}@example.com"),
            full_name: user_name.to_string(),
            avatar: None,
            cover_image: None,
            password_hash: "hash".to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn count_row(n: i64) -> std::collections::BTreeMap<&'static str, Value> {
        btreemap! {
            "num_items" => Into::<Value>::into(n),
        }
    }

    #[tokio::test]
    async fn test_profile_channel_not_found() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );
        let empty = || Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = ChannelService::new(
            UserRepository::new(user_db),
            SubscriptionRepository::new(empty()),
            VideoRepository::new(empty()),
        );

        let result = service.profile("ghost", None).await;

        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_profile_counts_and_subscribed_viewer() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("u1", "alice")]])
                .into_connection(),
        );
        // subscriber count, subscribed count, then the viewer edge check
        let sub_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[count_row(3)]])
                .append_query_results([[count_row(2)]])
                .append_query_results([[count_row(1)]])
                .into_connection(),
        );
        let empty = || Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = ChannelService::new(
            UserRepository::new(user_db),
            SubscriptionRepository::new(sub_db),
            VideoRepository::new(empty()),
        );

        let profile = service.profile("alice", Some("viewer1")).await.unwrap();

        assert_eq!(profile.subscriber_count, 3);
        assert_eq!(profile.subscribed_count, 2);
        assert!(profile.is_subscribed);
    }

    #[tokio::test]
    async fn test_profile_anonymous_viewer_not_subscribed() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("u1", "alice")]])
                .into_connection(),
        );
        let sub_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[count_row(3)]])
                .append_query_results([[count_row(0)]])
                .into_connection(),
        );
        let empty = || Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = ChannelService::new(
            UserRepository::new(user_db),
            SubscriptionRepository::new(sub_db),
            VideoRepository::new(empty()),
        );

        let profile = service.profile("alice", None).await.unwrap();

        assert_eq!(profile.subscriber_count, 3);
        assert!(!profile.is_subscribed);
    }
}
