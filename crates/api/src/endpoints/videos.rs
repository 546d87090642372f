//! Video endpoints.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use validator::Validate;

use tubekit_common::{AppError, AppResult, PageRequest, Paginated};
use tubekit_core::{
    MediaRef, PublishVideoInput, SortDirection, UpdateVideoInput, VideoDetail, VideoListing,
    VideoSearchInput, VideoSort,
};
use tubekit_db::entities::video;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

// ==================== Request/Response Types ====================

/// Video response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResponse {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: Option<String>,
    pub video_file: String,
    pub thumbnail: String,
    pub duration_secs: f64,
    pub views: i64,
    pub published: bool,
    pub created_at: String,
}

impl From<video::Model> for VideoResponse {
    fn from(v: video::Model) -> Self {
        Self {
            id: v.id,
            owner_id: v.owner_id,
            title: v.title,
            description: v.description,
            video_file: v.video_file,
            thumbnail: v.thumbnail,
            duration_secs: v.duration_secs,
            views: v.views,
            published: v.published,
            created_at: v.created_at.to_rfc3339(),
        }
    }
}

/// Publish video request. Media URLs come from the media storage
/// collaborator; this API stores only the references.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PublishVideoRequest {
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    pub description: Option<String>,
    #[validate(url)]
    pub video_file: String,
    #[validate(url)]
    pub thumbnail: String,
    #[serde(default)]
    pub duration_secs: f64,
}

/// Update video request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVideoRequest {
    pub video_id: String,
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub thumbnail: Option<String>,
}

/// Delete video request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteVideoRequest {
    pub video_id: String,
}

/// Set published state request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPublishedRequest {
    pub video_id: String,
    pub published: bool,
}

/// Show video request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowVideoRequest {
    pub video_id: String,
}

/// Search videos request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchVideosRequest {
    pub query: Option<String>,
    pub sort_field: Option<String>,
    pub sort_direction: Option<String>,
    pub owner_id: Option<String>,
    #[serde(flatten)]
    pub page: PageRequest,
}

fn parse_sort_field(value: Option<&str>) -> AppResult<VideoSort> {
    match value {
        None | Some("createdAt") => Ok(VideoSort::CreatedAt),
        Some("views") => Ok(VideoSort::Views),
        Some("duration") => Ok(VideoSort::Duration),
        Some("title") => Ok(VideoSort::Title),
        Some(other) => Err(AppError::Validation(format!("Unknown sort field: {other}"))),
    }
}

fn parse_sort_direction(value: Option<&str>) -> AppResult<SortDirection> {
    match value {
        None | Some("desc") => Ok(SortDirection::Desc),
        Some("asc") => Ok(SortDirection::Asc),
        Some(other) => Err(AppError::Validation(format!(
            "Unknown sort direction: {other}"
        ))),
    }
}

// ==================== Handlers ====================

/// Publish a new video.
async fn publish(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PublishVideoRequest>,
) -> AppResult<ApiResponse<VideoResponse>> {
    req.validate()?;

    let video = state
        .video_service
        .publish(
            &user.id,
            PublishVideoInput {
                title: req.title,
                description: req.description,
                media: MediaRef {
                    video_file: req.video_file,
                    thumbnail: req.thumbnail,
                    duration_secs: req.duration_secs,
                },
            },
        )
        .await?;

    Ok(ApiResponse::ok_with_message(
        video.into(),
        "Video uploaded succesfully",
    ))
}

/// Update a video.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateVideoRequest>,
) -> AppResult<ApiResponse<VideoResponse>> {
    let video = state
        .video_service
        .update(
            &req.video_id,
            &user.id,
            UpdateVideoInput {
                title: req.title,
                description: req.description,
                thumbnail: req.thumbnail,
            },
        )
        .await?;

    Ok(ApiResponse::ok_with_message(
        video.into(),
        "Video updated succesfully",
    ))
}

/// Delete a video and its dependent records.
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<DeleteVideoRequest>,
) -> AppResult<ApiResponse<()>> {
    state.video_service.delete(&req.video_id, &user.id).await?;

    Ok(ApiResponse::ok_with_message((), "Video deleted succesfully"))
}

/// Set the published flag.
async fn set_published(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<SetPublishedRequest>,
) -> AppResult<ApiResponse<VideoResponse>> {
    let video = state
        .video_service
        .set_published(&req.video_id, &user.id, req.published)
        .await?;

    Ok(ApiResponse::ok(video.into()))
}

/// The video detail page. Fetching it counts as watching: the viewer's
/// first fetch bumps the unique-viewer counter and appends watch history.
async fn show(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ShowVideoRequest>,
) -> AppResult<ApiResponse<VideoDetail>> {
    let detail = state.video_service.detail(&req.video_id, &user.id).await?;

    Ok(ApiResponse::ok_with_message(
        detail,
        "Video fetched succesfully",
    ))
}

/// Search published videos.
async fn search(
    State(state): State<AppState>,
    Json(req): Json<SearchVideosRequest>,
) -> AppResult<ApiResponse<Paginated<VideoListing>>> {
    let input = VideoSearchInput {
        text: req.query,
        owner_id: req.owner_id,
        sort: parse_sort_field(req.sort_field.as_deref())?,
        direction: parse_sort_direction(req.sort_direction.as_deref())?,
        page: req.page,
    };

    let listing = state.video_service.search(&input).await?;

    Ok(ApiResponse::ok_with_message(
        listing,
        "Videos fetched succesfully",
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/publish", post(publish))
        .route("/update", post(update))
        .route("/delete", post(delete))
        .route("/set-published", post(set_published))
        .route("/show", post(show))
        .route("/search", post(search))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sort_field_known_values() {
        assert_eq!(parse_sort_field(None).unwrap_or(VideoSort::Views), VideoSort::CreatedAt);
        assert!(matches!(
            parse_sort_field(Some("views")),
            Ok(VideoSort::Views)
        ));
        assert!(matches!(
            parse_sort_field(Some("duration")),
            Ok(VideoSort::Duration)
        ));
    }

    #[test]
    fn test_parse_sort_field_unknown() {
        assert!(matches!(
            parse_sort_field(Some("popularity")),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_parse_sort_direction() {
        assert!(matches!(
            parse_sort_direction(Some("asc")),
            Ok(SortDirection::Asc)
        ));
        assert!(matches!(parse_sort_direction(None), Ok(SortDirection::Desc)));
        assert!(matches!(
            parse_sort_direction(Some("sideways")),
            Err(AppError::Validation(_))
        ));
    }
}
