//! Like (reaction) endpoints.

use axum::{Json, Router, extract::State, routing::post};
use serde::Deserialize;
use tubekit_common::{AppError, AppResult, PageRequest, Paginated};
use tubekit_core::{LikedVideo, ToggleOutcome};
use tubekit_db::entities::reaction::TargetKind;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

// ==================== Request Types ====================

/// Toggle like request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleLikeRequest {
    pub target_kind: String,
    pub target_id: String,
}

/// Liked videos feed request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikedVideosRequest {
    #[serde(flatten)]
    pub page: PageRequest,
}

fn parse_target_kind(value: &str) -> AppResult<TargetKind> {
    match value {
        "video" => Ok(TargetKind::Video),
        "post" => Ok(TargetKind::Post),
        "comment" => Ok(TargetKind::Comment),
        "postComment" => Ok(TargetKind::PostComment),
        other => Err(AppError::Validation(format!(
            "Unknown target kind: {other}"
        ))),
    }
}

// ==================== Handlers ====================

/// Flip the actor's like on a target.
async fn toggle(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ToggleLikeRequest>,
) -> AppResult<ApiResponse<ToggleOutcome>> {
    let kind = parse_target_kind(&req.target_kind)?;

    let outcome = state
        .reaction_service
        .toggle(&user.id, kind, &req.target_id)
        .await?;

    Ok(ApiResponse::ok_with_message(
        outcome,
        "Like toggled succesfully",
    ))
}

/// The actor's liked videos, newest like first.
async fn liked_videos(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<LikedVideosRequest>,
) -> AppResult<ApiResponse<Paginated<LikedVideo>>> {
    let feed = state.reaction_service.liked_videos(&user.id, req.page).await?;

    Ok(ApiResponse::ok_with_message(
        feed,
        "Liked videos fetched succesfully",
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/toggle", post(toggle))
        .route("/videos", post(liked_videos))
}
