//! Tubekit server entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{Router, middleware};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tubekit_api::{middleware::AppState, router as api_router};
use tubekit_common::Config;
use tubekit_core::{
    ChannelService, CommentService, PlaylistService, PostService, ReactionService,
    SubscriptionService, UserService, VideoService, ViewService,
};
use tubekit_db::repositories::{
    CommentRepository, PlaylistRepository, PostRepository, ReactionRepository,
    SubscriptionRepository, UserRepository, VideoRepository, ViewRepository,
    WatchHistoryRepository,
};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tubekit=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting tubekit server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database and run migrations
    let db = Arc::new(tubekit_db::init(&config).await?);
    info!("Connected to database");

    info!("Running database migrations...");
    tubekit_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let user_repo = UserRepository::new(db.clone());
    let video_repo = VideoRepository::new(db.clone());
    let post_repo = PostRepository::new(db.clone());
    let comment_repo = CommentRepository::new(db.clone());
    let reaction_repo = ReactionRepository::new(db.clone());
    let subscription_repo = SubscriptionRepository::new(db.clone());
    let view_repo = ViewRepository::new(db.clone());
    let playlist_repo = PlaylistRepository::new(db.clone());
    let watch_history_repo = WatchHistoryRepository::new(db.clone());

    // Initialize services
    let user_service = UserService::new(user_repo.clone());
    let view_service = ViewService::new(
        view_repo,
        video_repo.clone(),
        watch_history_repo,
        user_repo.clone(),
        config.policy.watch_history_repeats,
    );
    let comment_service = CommentService::new(
        comment_repo.clone(),
        reaction_repo.clone(),
        video_repo.clone(),
        post_repo.clone(),
        user_repo.clone(),
    );
    let video_service = VideoService::new(
        video_repo.clone(),
        user_repo.clone(),
        comment_repo.clone(),
        reaction_repo.clone(),
        view_service.clone(),
        comment_service.clone(),
    );
    let post_service = PostService::new(
        post_repo.clone(),
        comment_repo.clone(),
        reaction_repo.clone(),
        user_repo.clone(),
    );
    let reaction_service = ReactionService::new(
        reaction_repo,
        video_repo.clone(),
        post_repo,
        comment_repo,
        user_repo.clone(),
    );
    let subscription_service = SubscriptionService::new(
        subscription_repo.clone(),
        user_repo.clone(),
        config.policy.allow_self_subscription,
    );
    let playlist_service =
        PlaylistService::new(playlist_repo, video_repo.clone(), user_repo.clone());
    let channel_service = ChannelService::new(user_repo, subscription_repo, video_repo);

    let state = AppState {
        user_service,
        video_service,
        post_service,
        comment_service,
        reaction_service,
        subscription_service,
        view_service,
        playlist_service,
        channel_service,
    };

    // Build the application router. The timeout layer bounds every store
    // operation by the configured deadline; timed-out requests surface as
    // transient server errors.
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            tubekit_api::middleware::actor_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(RequestBodyLimitLayer::new(1024 * 1024))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
