use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum SubscriptionTiers {
    Table,
    Level,
    Name,
    MonthlyCredits,
    SavedStoriesLimit,
    PriceCents,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Profiles {
    Table,
    UserId,
    SubscriptionLevel,
    IsAdmin,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum UsageCounters {
    Table,
    UserId,
    MonthKey,
    CreditsUsed,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SubscriptionTiers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SubscriptionTiers::Level)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SubscriptionTiers::Name).string_len(64).not_null())
                    .col(
                        ColumnDef::new(SubscriptionTiers::MonthlyCredits)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionTiers::SavedStoriesLimit)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionTiers::PriceCents)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SubscriptionTiers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 默认套餐: Free / Basic / Premium
        let seed = Query::insert()
            .into_table(SubscriptionTiers::Table)
            .columns([
                SubscriptionTiers::Level,
                SubscriptionTiers::Name,
                SubscriptionTiers::MonthlyCredits,
                SubscriptionTiers::SavedStoriesLimit,
                SubscriptionTiers::PriceCents,
            ])
            .values_panic([0.into(), "Free".into(), 3.into(), 3.into(), 0.into()])
            .values_panic([1.into(), "Basic".into(), 30.into(), 25.into(), 999.into()])
            .values_panic([2.into(), "Premium".into(), 100.into(), 100.into(), 1999.into()])
            .to_owned();
        manager.exec_stmt(seed).await?;

        manager
            .create_table(
                Table::create()
                    .table(Profiles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Profiles::UserId).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Profiles::SubscriptionLevel)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Profiles::IsAdmin)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Profiles::CreatedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Profiles::UpdatedAt).timestamp_with_time_zone().null())
                    .to_owned(),
            )
            .await?;

        // (user_id, month_key) 复合主键，每月一行
        manager
            .create_table(
                Table::create()
                    .table(UsageCounters::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UsageCounters::UserId).uuid().not_null())
                    .col(ColumnDef::new(UsageCounters::MonthKey).string_len(7).not_null())
                    .col(
                        ColumnDef::new(UsageCounters::CreditsUsed)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UsageCounters::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .primary_key(
                        Index::create()
                            .name("pk_usage_counters")
                            .col(UsageCounters::UserId)
                            .col(UsageCounters::MonthKey),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(UsageCounters::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Profiles::Table).to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(SubscriptionTiers::Table)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
