use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Stories {
    Table,
    Id,
    AuthorId,
    Title,
    Content,
    Moral,
    AgeGroup,
    Genre,
    Language,
    Characters,
    Setting,
    Prompt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum StoryTranslations {
    Table,
    Id,
    StoryId,
    UserId,
    Language,
    Title,
    Content,
    Moral,
    CreditsUsed,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Stories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Stories::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Stories::AuthorId).uuid().not_null())
                    .col(ColumnDef::new(Stories::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Stories::Content).text().not_null())
                    .col(ColumnDef::new(Stories::Moral).text().not_null())
                    .col(ColumnDef::new(Stories::AgeGroup).string_len(32).not_null())
                    .col(ColumnDef::new(Stories::Genre).string_len(64).not_null())
                    .col(
                        ColumnDef::new(Stories::Language)
                            .string_len(16)
                            .not_null()
                            .default("en"),
                    )
                    .col(ColumnDef::new(Stories::Characters).text().null())
                    .col(ColumnDef::new(Stories::Setting).text().null())
                    .col(ColumnDef::new(Stories::Prompt).text().null())
                    .col(ColumnDef::new(Stories::CreatedAt).timestamp_with_time_zone().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_stories_author")
                    .table(Stories::Table)
                    .col(Stories::AuthorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StoryTranslations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StoryTranslations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(StoryTranslations::StoryId).integer().not_null())
                    .col(ColumnDef::new(StoryTranslations::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(StoryTranslations::Language)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StoryTranslations::Title)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(StoryTranslations::Content).text().not_null())
                    .col(ColumnDef::new(StoryTranslations::Moral).text().not_null())
                    .col(
                        ColumnDef::new(StoryTranslations::CreditsUsed)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(StoryTranslations::CreatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_story_translations_story")
                            .from(StoryTranslations::Table, StoryTranslations::StoryId)
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
                    .name("idx_story_translations_story")
                    .table(StoryTranslations::Table)
                    .col(StoryTranslations::StoryId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(StoryTranslations::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Stories::Table).to_owned())
            .await?;
        Ok(())
    }
}
