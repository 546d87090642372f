//! Subscription endpoints.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use tubekit_common::{AppResult, PageRequest, Paginated};
use tubekit_core::{SubscriptionOutcome, UserSummary};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

// ==================== Request/Response Types ====================

/// Toggle subscription request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleSubscriptionRequest {
    pub channel_id: String,
}

/// Subscriber count request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberCountRequest {
    pub channel_id: String,
}

/// Subscriber count response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberCountResponse {
    pub channel_id: String,
    pub subscriber_count: u64,
}

/// Subscribed channels request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribedChannelsRequest {
    #[serde(flatten)]
    pub page: PageRequest,
}

/// Is-subscribed request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IsSubscribedRequest {
    pub channel_id: String,
}

/// Is-subscribed response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IsSubscribedResponse {
    pub subscribed: bool,
}

// ==================== Handlers ====================

/// Flip the actor's subscription to a channel.
async fn toggle(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ToggleSubscriptionRequest>,
) -> AppResult<ApiResponse<SubscriptionOutcome>> {
    let outcome = state
        .subscription_service
        .toggle(&user.id, &req.channel_id)
        .await?;

    Ok(ApiResponse::ok_with_message(
        outcome,
        "Subscription toggled succesfully",
    ))
}

/// Count a channel's subscribers.
async fn subscriber_count(
    State(state): State<AppState>,
    Json(req): Json<SubscriberCountRequest>,
) -> AppResult<ApiResponse<SubscriberCountResponse>> {
    let count = state
        .subscription_service
        .count_subscribers(&req.channel_id)
        .await?;

    Ok(ApiResponse::ok_with_message(
        SubscriberCountResponse {
            channel_id: req.channel_id,
            subscriber_count: count,
        },
        "Subscribers fetched succesfully",
    ))
}

/// Channels the actor is subscribed to.
async fn subscribed_channels(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<SubscribedChannelsRequest>,
) -> AppResult<ApiResponse<Paginated<UserSummary>>> {
    let channels = state
        .subscription_service
        .subscribed_channels(&user.id, req.page)
        .await?;

    Ok(ApiResponse::ok_with_message(
        channels,
        "Subscribed channels fetched succesfully",
    ))
}

/// Check whether the actor subscribes to a channel.
async fn is_subscribed(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<IsSubscribedRequest>,
) -> AppResult<ApiResponse<IsSubscribedResponse>> {
    let subscribed = state
        .subscription_service
        .is_subscribed(&user.id, &req.channel_id)
        .await?;

    Ok(ApiResponse::ok(IsSubscribedResponse { subscribed }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/toggle", post(toggle))
        .route("/subscriber-count", post(subscriber_count))
        .route("/channels", post(subscribed_channels))
        .route("/is-subscribed", post(is_subscribed))
}
