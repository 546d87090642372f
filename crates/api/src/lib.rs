//! HTTP API layer for tubekit.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: video, post, comment, like, subscription, playlist and
//!   channel operations
//! - **Extractors**: authenticated-actor extraction
//! - **Middleware**: actor resolution from the auth collaborator's header
//! - **Response**: the (payload, message) envelope all reads share
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, actor_middleware};
pub use response::ApiResponse;
