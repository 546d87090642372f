//! Channel endpoints.

use axum::{Json, Router, extract::State, routing::post};
use serde::Deserialize;
use tubekit_common::AppResult;
use tubekit_core::{ChannelProfile, ChannelStats};

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

// ==================== Request Types ====================

/// Channel profile request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelProfileRequest {
    pub user_name: String,
}

/// Channel stats request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStatsRequest {
    pub channel_id: String,
}

// ==================== Handlers ====================

/// A channel's public profile with subscription aggregates relative to
/// the viewer.
async fn profile(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<ChannelProfileRequest>,
) -> AppResult<ApiResponse<ChannelProfile>> {
    let viewer_id = viewer.as_ref().map(|u| u.id.as_str());

    let profile = state
        .channel_service
        .profile(&req.user_name, viewer_id)
        .await?;

    Ok(ApiResponse::ok_with_message(
        profile,
        "Channel fetched succesfully",
    ))
}

/// Aggregate statistics for a channel dashboard.
async fn stats(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ChannelStatsRequest>,
) -> AppResult<ApiResponse<ChannelStats>> {
    let stats = state.channel_service.stats(&req.channel_id).await?;

    Ok(ApiResponse::ok_with_message(
        stats,
        "Channel stats fetched succesfully",
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile", post(profile))
        .route("/stats", post(stats))
}
