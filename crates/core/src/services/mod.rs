//! Business logic services.

#![allow(missing_docs)]

pub mod channel;
pub mod comment;
pub mod playlist;
pub mod post;
pub mod reaction;
pub mod subscription;
pub mod user;
pub mod video;
pub mod view;

pub use channel::{ChannelProfile, ChannelService, ChannelStats};
pub use comment::{CommentService, CommentThreadEntry};
pub use playlist::{PlaylistDetail, PlaylistService};
pub use post::PostService;
pub use reaction::{LikedVideo, ReactionService, ToggleOutcome};
pub use subscription::{SubscriptionOutcome, SubscriptionService};
pub use user::{CreateUserInput, UpdateProfileInput, UserService, UserSummary};
pub use video::{
    MediaRef, PublishVideoInput, SortDirection, UpdateVideoInput, VideoDetail, VideoListing,
    VideoSearchInput, VideoService, VideoSort, VideoSummary,
};
pub use view::{ViewOutcome, ViewService, WatchedVideo};
