//! Add full-text search index for videos.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // GIN index for video search over title and description.
        // Uses 'simple' configuration for language-neutral matching.
        manager
            .get_connection()
            .execute_unprepared(
                r"
                CREATE INDEX IF NOT EXISTS idx_video_text_search
                ON video
                USING GIN (to_tsvector('simple', title || ' ' || COALESCE(description, '')))
                WHERE published = true;
                ",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP INDEX IF EXISTS idx_video_text_search;")
            .await?;
        Ok(())
    }
}
