//! Reaction entity (likes on videos, posts and comments).
//!
//! The target is a tagged reference: `target_kind` plus `target_id`, one row
//! per (user, kind, id) tuple. The unique index on that tuple is what makes
//! the toggle engine's conditional insert atomic.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Which kind of entity a reaction applies to.
///
/// `Comment` is a comment under a video; `PostComment` is a comment under a
/// post. They are distinct kinds so a target id never needs disambiguation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum TargetKind {
    #[sea_orm(string_value = "video")]
    Video,
    #[sea_orm(string_value = "post")]
    Post,
    #[sea_orm(string_value = "comment")]
    Comment,
    #[sea_orm(string_value = "post_comment")]
    PostComment,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reaction")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user who reacted
    #[sea_orm(indexed)]
    pub user_id: String,

    /// Which table `target_id` references
    pub target_kind: TargetKind,

    /// The entity being reacted to
    #[sea_orm(indexed)]
    pub target_id: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
