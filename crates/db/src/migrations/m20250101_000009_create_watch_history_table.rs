//! Create watch_history table migration.
//!
//! `video_id` is a weak reference (no foreign key): history entries
//! survive video deletion and are skipped on read when they dangle.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WatchHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WatchHistory::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(WatchHistory::UserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WatchHistory::VideoId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WatchHistory::WatchedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_watch_history_user")
                            .from(WatchHistory::Table, WatchHistory::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: user_id (history listings)
        manager
            .create_index(
                Index::create()
                    .name("idx_watch_history_user_id")
                    .table(WatchHistory::Table)
                    .col(WatchHistory::UserId)
                    .to_owned(),
            )
            .await?;

        // Index: (user_id, video_id) for the first-view dedup check
        manager
            .create_index(
                Index::create()
                    .name("idx_watch_history_user_video")
                    .table(WatchHistory::Table)
                    .col(WatchHistory::UserId)
                    .col(WatchHistory::VideoId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WatchHistory::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum WatchHistory {
    Table,
    Id,
    UserId,
    VideoId,
    WatchedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
