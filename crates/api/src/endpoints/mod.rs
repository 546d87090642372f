//! API endpoints.

mod channels;
mod comments;
mod likes;
mod playlists;
mod posts;
mod subscriptions;
mod users;
mod videos;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/videos", videos::router())
        .nest("/posts", posts::router())
        .nest("/comments", comments::router())
        .nest("/likes", likes::router())
        .nest("/subscriptions", subscriptions::router())
        .nest("/playlists", playlists::router())
        .nest("/channels", channels::router())
        .nest("/users", users::router())
}
