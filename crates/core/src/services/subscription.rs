//! Subscription service - the channel subscription graph.

use sea_orm::Set;
use serde::Serialize;
use tubekit_common::{AppError, AppResult, IdGenerator, PageRequest, Paginated};
use tubekit_db::{
    entities::subscription,
    repositories::{SubscriptionRepository, UserRepository},
};

use crate::services::user::UserSummary;

/// Result of a subscription toggle: the state after the flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionOutcome {
    /// `true` if the edge now exists, `false` if it was removed.
    pub subscribed: bool,
}

/// Subscription service for business logic.
#[derive(Clone)]
pub struct SubscriptionService {
    subscription_repo: SubscriptionRepository,
    user_repo: UserRepository,
    allow_self_subscription: bool,
    id_gen: IdGenerator,
}

impl SubscriptionService {
    /// Create a new subscription service.
    #[must_use]
    pub const fn new(
        subscription_repo: SubscriptionRepository,
        user_repo: UserRepository,
        allow_self_subscription: bool,
    ) -> Self {
        Self {
            subscription_repo,
            user_repo,
            allow_self_subscription,
            id_gen: IdGenerator::new(),
        }
    }

    /// Flip the subscriber → channel edge.
    ///
    /// Same conditional-write flip as the reaction toggle: the unique pair
    /// index resolves concurrent toggles to a single edge.
    pub async fn toggle(
        &self,
        subscriber_id: &str,
        channel_id: &str,
    ) -> AppResult<SubscriptionOutcome> {
        if subscriber_id == channel_id && !self.allow_self_subscription {
            return Err(AppError::Validation(
                "Cannot subscribe to your own channel".to_string(),
            ));
        }

        // Channel must reference an existing user
        self.user_repo.get_by_id(channel_id).await?;

        if self
            .subscription_repo
            .delete_if_present(subscriber_id, channel_id)
            .await?
        {
            tracing::debug!(subscriber_id, channel_id, "Unsubscribed");
            return Ok(SubscriptionOutcome { subscribed: false });
        }

        let model = subscription::ActiveModel {
            id: Set(self.id_gen.generate()),
            subscriber_id: Set(subscriber_id.to_string()),
            channel_id: Set(channel_id.to_string()),
            ..Default::default()
        };

        self.subscription_repo.insert_if_absent(model).await?;
        tracing::debug!(subscriber_id, channel_id, "Subscribed");

        Ok(SubscriptionOutcome { subscribed: true })
    }

    /// Count subscribers of a channel.
    pub async fn count_subscribers(&self, channel_id: &str) -> AppResult<u64> {
        self.user_repo.get_by_id(channel_id).await?;
        self.subscription_repo.count_by_channel(channel_id).await
    }

    /// Check if a subscriber → channel edge exists.
    pub async fn is_subscribed(&self, subscriber_id: &str, channel_id: &str) -> AppResult<bool> {
        self.subscription_repo
            .exists(subscriber_id, channel_id)
            .await
    }

    /// Channels a user is subscribed to, newest subscription first.
    pub async fn subscribed_channels(
        &self,
        subscriber_id: &str,
        page: PageRequest,
    ) -> AppResult<Paginated<UserSummary>> {
        let page = page.clamped();

        let edges = self
            .subscription_repo
            .find_by_subscriber(subscriber_id, page.page_size, page.offset())
            .await?;
        let total = self
            .subscription_repo
            .count_by_subscriber(subscriber_id)
            .await?;

        let channel_ids: Vec<String> = edges.iter().map(|e| e.channel_id.clone()).collect();
        let channels = self.user_repo.find_by_ids(&channel_ids).await?;

        let items = edges
            .iter()
            .filter_map(|e| {
                let channel = channels.iter().find(|u| u.id == e.channel_id)?;
                Some(UserSummary::from(channel))
            })
            .collect();

        Ok(Paginated::new(items, page, total))
    }
}
