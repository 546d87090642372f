//! User endpoints.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use validator::Validate;

use tubekit_common::{AppResult, PageRequest, Paginated};
use tubekit_core::{CreateUserInput, UpdateProfileInput, WatchedVideo};
use tubekit_db::entities::user;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

// ==================== Request/Response Types ====================

/// User response. The credential hash never leaves the store layer's
/// serialization; this type simply has no field for it.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub user_name: String,
    pub email: String,
    pub full_name: String,
    pub avatar: Option<String>,
    pub cover_image: Option<String>,
    pub created_at: String,
}

impl From<user::Model> for UserResponse {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            user_name: u.user_name,
            email: u.email,
            full_name: u.full_name,
            avatar: u.avatar,
            cover_image: u.cover_image,
            created_at: u.created_at.to_rfc3339(),
        }
    }
}

/// Create user request. The password hash comes pre-computed from the
/// auth collaborator.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 64))]
    pub user_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub full_name: String,
    pub password_hash: String,
    pub avatar: Option<String>,
    pub cover_image: Option<String>,
}

/// Update profile request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<Option<String>>,
    pub cover_image: Option<Option<String>>,
}

/// Watch history request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchHistoryRequest {
    #[serde(flatten)]
    pub page: PageRequest,
}

// ==================== Handlers ====================

/// The authenticated actor's own record.
async fn me(AuthUser(user): AuthUser) -> AppResult<ApiResponse<UserResponse>> {
    Ok(ApiResponse::ok(user.into()))
}

/// Create a user account (called by the auth collaborator at signup).
async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    req.validate()?;

    let user = state
        .user_service
        .create(CreateUserInput {
            user_name: req.user_name,
            email: req.email,
            full_name: req.full_name,
            password_hash: req.password_hash,
            avatar: req.avatar,
            cover_image: req.cover_image,
        })
        .await?;

    Ok(ApiResponse::ok_with_message(
        user.into(),
        "User created succesfully",
    ))
}

/// Update the actor's profile fields.
async fn update_profile(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateProfileRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    let updated = state
        .user_service
        .update_profile(
            &user.id,
            UpdateProfileInput {
                full_name: req.full_name,
                email: req.email,
                avatar: req.avatar,
                cover_image: req.cover_image,
            },
        )
        .await?;

    Ok(ApiResponse::ok_with_message(
        updated.into(),
        "Profile updated succesfully",
    ))
}

/// The actor's watch history, most recent first.
async fn watch_history(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<WatchHistoryRequest>,
) -> AppResult<ApiResponse<Paginated<WatchedVideo>>> {
    let history = state.view_service.watch_history(&user.id, req.page).await?;

    Ok(ApiResponse::ok_with_message(
        history,
        "Watch history fetched succesfully",
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", post(me))
        .route("/create", post(create))
        .route("/update-profile", post(update_profile))
        .route("/watch-history", post(watch_history))
}
