//! Post endpoints.

use axum::{Json, Router, extract::State, routing};
use serde::{Deserialize, Serialize};
use tubekit_common::{AppResult, PageRequest, Paginated};
use tubekit_db::entities::post;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

// ==================== Request/Response Types ====================

/// Post response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub owner_id: String,
    pub content: String,
    pub image: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<post::Model> for PostResponse {
    fn from(p: post::Model) -> Self {
        Self {
            id: p.id,
            owner_id: p.owner_id,
            content: p.content,
            image: p.image,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Create post request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub content: String,
    pub image: Option<String>,
}

/// Update post request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    pub post_id: String,
    pub content: String,
}

/// Delete post request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletePostRequest {
    pub post_id: String,
}

/// Show post request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowPostRequest {
    pub post_id: String,
}

/// List user posts request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUserPostsRequest {
    pub owner_id: String,
    #[serde(flatten)]
    pub page: PageRequest,
}

// ==================== Handlers ====================

/// Create a post.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreatePostRequest>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state
        .post_service
        .create(&user.id, &req.content, req.image)
        .await?;

    Ok(ApiResponse::ok_with_message(
        post.into(),
        "Post created succesfully",
    ))
}

/// Update a post.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdatePostRequest>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state
        .post_service
        .update(&req.post_id, &user.id, &req.content)
        .await?;

    Ok(ApiResponse::ok_with_message(
        post.into(),
        "Post updated succesfully",
    ))
}

/// Delete a post and its dependent records.
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<DeletePostRequest>,
) -> AppResult<ApiResponse<()>> {
    state.post_service.delete(&req.post_id, &user.id).await?;

    Ok(ApiResponse::ok_with_message((), "Post deleted succesfully"))
}

/// Show a post.
async fn show(
    State(state): State<AppState>,
    Json(req): Json<ShowPostRequest>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state.post_service.get_by_id(&req.post_id).await?;

    Ok(ApiResponse::ok(post.into()))
}

/// A user's posts, newest first.
async fn list_user_posts(
    State(state): State<AppState>,
    Json(req): Json<ListUserPostsRequest>,
) -> AppResult<ApiResponse<Paginated<PostResponse>>> {
    let posts = state
        .post_service
        .list_by_owner(&req.owner_id, req.page)
        .await?;

    Ok(ApiResponse::ok_with_message(
        posts.map(PostResponse::from),
        "Posts fetched succesfully",
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", routing::post(create))
        .route("/update", routing::post(update))
        .route("/delete", routing::post(delete))
        .route("/show", routing::post(show))
        .route("/list-user", routing::post(list_user_posts))
}
