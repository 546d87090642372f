//! Playlist endpoints.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use tubekit_common::{AppResult, PageRequest, Paginated};
use tubekit_core::PlaylistDetail;
use tubekit_db::entities::playlist;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

// ==================== Request/Response Types ====================

/// Playlist response (without member videos).
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistResponse {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
}

impl From<playlist::Model> for PlaylistResponse {
    fn from(p: playlist::Model) -> Self {
        Self {
            id: p.id,
            owner_id: p.owner_id,
            name: p.name,
            description: p.description,
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

/// Create playlist request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: Option<String>,
}

/// Rename playlist request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenamePlaylistRequest {
    pub playlist_id: String,
    pub name: Option<String>,
    pub description: Option<Option<String>>,
}

/// Delete playlist request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletePlaylistRequest {
    pub playlist_id: String,
}

/// Add videos request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddVideosRequest {
    pub playlist_id: String,
    pub video_ids: Vec<String>,
}

/// Remove videos request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveVideosRequest {
    pub playlist_id: String,
    pub video_ids: Vec<String>,
}

/// Show playlist request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowPlaylistRequest {
    pub playlist_id: String,
}

/// List user playlists request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUserPlaylistsRequest {
    pub owner_id: String,
    #[serde(flatten)]
    pub page: PageRequest,
}

// ==================== Handlers ====================

/// Create a playlist.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreatePlaylistRequest>,
) -> AppResult<ApiResponse<PlaylistResponse>> {
    let playlist = state
        .playlist_service
        .create(&user.id, &req.name, req.description)
        .await?;

    Ok(ApiResponse::ok_with_message(
        playlist.into(),
        "Playlist created succesfully",
    ))
}

/// Rename a playlist or change its description.
async fn rename(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<RenamePlaylistRequest>,
) -> AppResult<ApiResponse<PlaylistResponse>> {
    let playlist = state
        .playlist_service
        .rename(&req.playlist_id, &user.id, req.name, req.description)
        .await?;

    Ok(ApiResponse::ok_with_message(
        playlist.into(),
        "Playlist updated succesfully",
    ))
}

/// Delete a playlist.
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<DeletePlaylistRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .playlist_service
        .delete(&req.playlist_id, &user.id)
        .await?;

    Ok(ApiResponse::ok_with_message(
        (),
        "Playlist deleted succesfully",
    ))
}

/// Add a batch of videos to a playlist (all-or-nothing).
async fn add_videos(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<AddVideosRequest>,
) -> AppResult<ApiResponse<PlaylistDetail>> {
    let detail = state
        .playlist_service
        .add_videos(&req.playlist_id, &user.id, &req.video_ids)
        .await?;

    Ok(ApiResponse::ok_with_message(
        detail,
        "Videos added to playlist succesfully",
    ))
}

/// Remove a set of videos from a playlist.
async fn remove_videos(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<RemoveVideosRequest>,
) -> AppResult<ApiResponse<PlaylistDetail>> {
    let detail = state
        .playlist_service
        .remove_videos(&req.playlist_id, &user.id, &req.video_ids)
        .await?;

    Ok(ApiResponse::ok_with_message(
        detail,
        "Videos removed from playlist succesfully",
    ))
}

/// A playlist with its member video summaries.
async fn show(
    State(state): State<AppState>,
    Json(req): Json<ShowPlaylistRequest>,
) -> AppResult<ApiResponse<PlaylistDetail>> {
    let detail = state.playlist_service.get_detail(&req.playlist_id).await?;

    Ok(ApiResponse::ok_with_message(
        detail,
        "Playlist fetched succesfully",
    ))
}

/// A user's playlists, newest first.
async fn list_user_playlists(
    State(state): State<AppState>,
    Json(req): Json<ListUserPlaylistsRequest>,
) -> AppResult<ApiResponse<Paginated<PlaylistResponse>>> {
    let playlists = state
        .playlist_service
        .list_by_owner(&req.owner_id, req.page)
        .await?;

    Ok(ApiResponse::ok_with_message(
        playlists.map(PlaylistResponse::from),
        "Playlists fetched succesfully",
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/rename", post(rename))
        .route("/delete", post(delete))
        .route("/add-videos", post(add_videos))
        .route("/remove-videos", post(remove_videos))
        .route("/show", post(show))
        .route("/list-user", post(list_user_playlists))
}
