//! Comment entity.
//!
//! A comment belongs to exactly one parent, either a video or a post. The
//! parent is a tagged reference: `parent_kind` says which table `parent_id`
//! points into, so there is no foreign key on `parent_id` itself. Cascades
//! from the parent are performed explicitly by the owning service.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Which kind of entity a comment is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum ParentKind {
    #[sea_orm(string_value = "video")]
    Video,
    #[sea_orm(string_value = "post")]
    Post,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "comment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Author user ID
    #[sea_orm(indexed)]
    pub owner_id: String,

    /// Which table `parent_id` references
    pub parent_kind: ParentKind,

    /// The video or post this comment is attached to
    #[sea_orm(indexed)]
    pub parent_id: String,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Owner,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
