//! API middleware.

#![allow(missing_docs)]

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use tubekit_core::{
    ChannelService, CommentService, PlaylistService, PostService, ReactionService,
    SubscriptionService, UserService, VideoService, ViewService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub video_service: VideoService,
    pub post_service: PostService,
    pub comment_service: CommentService,
    pub reaction_service: ReactionService,
    pub subscription_service: SubscriptionService,
    pub view_service: ViewService,
    pub playlist_service: PlaylistService,
    pub channel_service: ChannelService,
}

/// Actor resolution middleware.
///
/// The auth collaborator authenticates the request upstream and forwards
/// the actor's user ID in `x-actor-id`. This middleware resolves it to a
/// user row and stashes it in request extensions; no credential checks
/// happen in this process.
pub async fn actor_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(header) = req.headers().get("x-actor-id")
        && let Ok(actor_id) = header.to_str()
        && let Ok(user) = state.user_service.get_by_id(actor_id).await
    {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}
