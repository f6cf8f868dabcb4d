use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum MediaAssets {
    Table,
    Id,
    StoryId,
    UserId,
    Kind,
    Url,
    StoragePath,
    Details,
    CreditsUsed,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Stories {
    Table,
    Id,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MediaAssets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MediaAssets::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MediaAssets::StoryId).integer().null())
                    .col(ColumnDef::new(MediaAssets::UserId).uuid().not_null())
                    // audio / image / video / pdf
                    .col(ColumnDef::new(MediaAssets::Kind).string_len(16).not_null())
                    .col(ColumnDef::new(MediaAssets::Url).text().not_null())
                    .col(ColumnDef::new(MediaAssets::StoragePath).text().null())
                    .col(ColumnDef::new(MediaAssets::Details).text().null())
                    .col(
                        ColumnDef::new(MediaAssets::CreditsUsed)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(MediaAssets::CreatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_media_assets_story")
                            .from(MediaAssets::Table, MediaAssets::StoryId)
                            .to(Stories::Table, Stories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_media_assets_story_kind")
                    .table(MediaAssets::Table)
                    .col(MediaAssets::StoryId)
                    .col(MediaAssets::Kind)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_media_assets_user")
                    .table(MediaAssets::Table)
                    .col(MediaAssets::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(MediaAssets::Table).to_owned())
            .await?;
        Ok(())
    }
}
