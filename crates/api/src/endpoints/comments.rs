//! Comment endpoints.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use tubekit_common::{AppError, AppResult, PageRequest, Paginated};
use tubekit_core::CommentThreadEntry;
use tubekit_db::entities::comment::{self, ParentKind};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

// ==================== Request/Response Types ====================

/// Comment response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub owner_id: String,
    pub parent_id: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<comment::Model> for CommentResponse {
    fn from(c: comment::Model) -> Self {
        Self {
            id: c.id,
            owner_id: c.owner_id,
            parent_id: c.parent_id,
            content: c.content,
            created_at: c.created_at.to_rfc3339(),
            updated_at: c.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Create comment request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub parent_kind: String,
    pub parent_id: String,
    pub content: String,
}

/// Update comment request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCommentRequest {
    pub comment_id: String,
    pub content: String,
}

/// Delete comment request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCommentRequest {
    pub comment_id: String,
}

/// List comments request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCommentsRequest {
    pub parent_kind: String,
    pub parent_id: String,
    #[serde(flatten)]
    pub page: PageRequest,
}

fn parse_parent_kind(value: &str) -> AppResult<ParentKind> {
    match value {
        "video" => Ok(ParentKind::Video),
        "post" => Ok(ParentKind::Post),
        other => Err(AppError::Validation(format!(
            "Unknown parent kind: {other}"
        ))),
    }
}

// ==================== Handlers ====================

/// Add a comment under a video or post.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateCommentRequest>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let kind = parse_parent_kind(&req.parent_kind)?;

    let comment = state
        .comment_service
        .create(&user.id, kind, &req.parent_id, &req.content)
        .await?;

    Ok(ApiResponse::ok_with_message(
        comment.into(),
        "Comment added succesfully",
    ))
}

/// Update a comment.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateCommentRequest>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let comment = state
        .comment_service
        .update(&req.comment_id, &user.id, &req.content)
        .await?;

    Ok(ApiResponse::ok_with_message(
        comment.into(),
        "Comment updated succesfully",
    ))
}

/// Delete a comment and the likes on it.
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<DeleteCommentRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .comment_service
        .delete(&req.comment_id, &user.id)
        .await?;

    Ok(ApiResponse::ok_with_message(
        (),
        "Comment deleted succesfully",
    ))
}

/// The comment thread under a parent, newest first.
async fn list(
    State(state): State<AppState>,
    Json(req): Json<ListCommentsRequest>,
) -> AppResult<ApiResponse<Paginated<CommentThreadEntry>>> {
    let kind = parse_parent_kind(&req.parent_kind)?;

    let thread = state
        .comment_service
        .list(kind, &req.parent_id, req.page)
        .await?;

    Ok(ApiResponse::ok_with_message(
        thread,
        "Comments fetched succesfully",
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/update", post(update))
        .route("/delete", post(delete))
        .route("/list", post(list))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_parent_kind() {
        assert!(matches!(parse_parent_kind("video"), Ok(ParentKind::Video)));
        assert!(matches!(parse_parent_kind("post"), Ok(ParentKind::Post)));
        assert!(matches!(
            parse_parent_kind("comment"),
            Err(AppError::Validation(_))
        ));
    }
}
