//! Reaction service - the like toggle engine.

use sea_orm::Set;
use serde::Serialize;
use tubekit_common::{AppResult, IdGenerator, PageRequest, Paginated};
use tubekit_db::{
    entities::{comment, reaction, reaction::TargetKind},
    repositories::{
        CommentRepository, PostRepository, ReactionRepository, UserRepository, VideoRepository,
    },
};

use crate::services::user::UserSummary;
use crate::services::video::VideoSummary;

/// Result of a reaction toggle: the state after the flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleOutcome {
    /// `true` if the reaction now exists, `false` if it was removed.
    pub active: bool,
}

/// One entry of the liked-videos feed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikedVideo {
    pub video: VideoSummary,
    pub owner: UserSummary,
    pub liked_at: String,
}

/// Reaction service for business logic.
#[derive(Clone)]
pub struct ReactionService {
    reaction_repo: ReactionRepository,
    video_repo: VideoRepository,
    post_repo: PostRepository,
    comment_repo: CommentRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl ReactionService {
    /// Create a new reaction service.
    #[must_use]
    pub const fn new(
        reaction_repo: ReactionRepository,
        video_repo: VideoRepository,
        post_repo: PostRepository,
        comment_repo: CommentRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            reaction_repo,
            video_repo,
            post_repo,
            comment_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Flip the actor's reaction on a target.
    ///
    /// Each call is a state flip: present becomes absent and absent becomes
    /// present. The flip is built from the store's conditional writes, so
    /// two concurrent togglers can never leave two reactions behind - a
    /// toggler whose insert loses the race observes the same final state
    /// the winner created and reports `active = true`.
    pub async fn toggle(
        &self,
        actor_id: &str,
        target_kind: TargetKind,
        target_id: &str,
    ) -> AppResult<ToggleOutcome> {
        self.check_target_exists(target_kind, target_id).await?;

        if self
            .reaction_repo
            .delete_if_present(actor_id, target_kind, target_id)
            .await?
        {
            tracing::debug!(actor_id, target_id, "Reaction removed");
            return Ok(ToggleOutcome { active: false });
        }

        let model = reaction::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(actor_id.to_string()),
            target_kind: Set(target_kind),
            target_id: Set(target_id.to_string()),
            ..Default::default()
        };

        // A conflicted insert means a concurrent toggle created the
        // reaction first; either way it exists now.
        self.reaction_repo.insert_if_absent(model).await?;
        tracing::debug!(actor_id, target_id, "Reaction added");

        Ok(ToggleOutcome { active: true })
    }

    /// Check whether the actor has an active reaction on a target.
    pub async fn is_active(
        &self,
        actor_id: &str,
        target_kind: TargetKind,
        target_id: &str,
    ) -> AppResult<bool> {
        self.reaction_repo
            .exists(actor_id, target_kind, target_id)
            .await
    }

    /// Count reactions on a target.
    pub async fn count_for_target(
        &self,
        target_kind: TargetKind,
        target_id: &str,
    ) -> AppResult<u64> {
        self.reaction_repo
            .count_by_target(target_kind, target_id)
            .await
    }

    /// The viewer's liked videos, newest like first, joined with video and
    /// owner summaries.
    pub async fn liked_videos(
        &self,
        viewer_id: &str,
        page: PageRequest,
    ) -> AppResult<Paginated<LikedVideo>> {
        let page = page.clamped();

        let reactions = self
            .reaction_repo
            .find_by_user_and_kind(viewer_id, TargetKind::Video, page.page_size, page.offset())
            .await?;
        let total = self
            .reaction_repo
            .count_by_user_and_kind(viewer_id, TargetKind::Video)
            .await?;

        let video_ids: Vec<String> = reactions.iter().map(|r| r.target_id.clone()).collect();
        let videos = self.video_repo.find_by_ids(&video_ids).await?;

        let mut owner_ids: Vec<String> = videos.iter().map(|v| v.owner_id.clone()).collect();
        owner_ids.sort();
        owner_ids.dedup();
        let owners = self.user_repo.find_by_ids(&owner_ids).await?;

        let items = reactions
            .iter()
            .filter_map(|r| {
                let video = videos.iter().find(|v| v.id == r.target_id)?;
                let owner = owners.iter().find(|u| u.id == video.owner_id)?;
                Some(LikedVideo {
                    video: VideoSummary::from(video),
                    owner: UserSummary::from(owner),
                    liked_at: r.created_at.to_rfc3339(),
                })
            })
            .collect();

        Ok(Paginated::new(items, page, total))
    }

    /// Verify the reaction target references a live entity of the claimed
    /// kind. A comment target must also sit under the matching parent kind,
    /// otherwise one comment could carry two reactions from the same actor
    /// under different kinds.
    async fn check_target_exists(&self, target_kind: TargetKind, target_id: &str) -> AppResult<()> {
        match target_kind {
            TargetKind::Video => {
                self.video_repo.get_by_id(target_id).await?;
            }
            TargetKind::Post => {
                self.post_repo.get_by_id(target_id).await?;
            }
            TargetKind::Comment => {
                self.check_comment_parent(target_id, comment::ParentKind::Video)
                    .await?;
            }
            TargetKind::PostComment => {
                self.check_comment_parent(target_id, comment::ParentKind::Post)
                    .await?;
            }
        }
        Ok(())
    }

    async fn check_comment_parent(
        &self,
        comment_id: &str,
        expected: comment::ParentKind,
    ) -> AppResult<()> {
        let comment = self.comment_repo.get_by_id(comment_id).await?;
        if comment.parent_kind != expected {
            return Err(tubekit_common::AppError::CommentNotFound(
                comment_id.to_string(),
            ));
        }
        Ok(())
    }
}
