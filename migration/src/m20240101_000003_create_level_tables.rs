use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Levels::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Levels::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Levels::Title).string().not_null())
                    .col(ColumnDef::new(Levels::Description).text().null())
                    .col(ColumnDef::new(Levels::Difficulty).string().not_null())
                    .col(
                        ColumnDef::new(Levels::EstimatedTimeMinutes)
                            .integer()
                            .not_null()
                            .default(5),
                    )
                    .col(
                        ColumnDef::new(Levels::MaxScore)
                            .integer()
                            .not_null()
                            .default(1000),
                    )
                    .col(ColumnDef::new(Levels::TasksConfig).text().null())
                    .col(ColumnDef::new(Levels::UnlockLevelId).integer().null())
                    .col(
                        ColumnDef::new(Levels::UnlockStarsRequired)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Levels::RewardCoins)
                            .integer()
                            .not_null()
                            .default(100),
                    )
                    .col(
                        ColumnDef::new(Levels::RewardExp)
                            .integer()
                            .not_null()
                            .default(50),
                    )
                    .col(
                        ColumnDef::new(Levels::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Levels::SortOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Levels::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Levels::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_levels_unlock_level")
                            .from(Levels::Table, Levels::UnlockLevelId)
                            .to(Levels::Table, Levels::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Reverse lookup for the unlock cascade
        manager
            .create_index(
                Index::create()
                    .name("idx_levels_unlock_level_id")
                    .table(Levels::Table)
                    .col(Levels::UnlockLevelId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LevelRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LevelRecords::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LevelRecords::UserId).integer().not_null())
                    .col(ColumnDef::new(LevelRecords::LevelId).integer().not_null())
                    .col(
                        ColumnDef::new(LevelRecords::BestScore)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(LevelRecords::TotalAttempts)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(LevelRecords::CompletedAttempts)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(LevelRecords::Stars)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(LevelRecords::TasksCompletion).text().null())
                    .col(
                        ColumnDef::new(LevelRecords::Status)
                            .string()
                            .not_null()
                            .default("locked"),
                    )
                    .col(
                        ColumnDef::new(LevelRecords::BestTimeSeconds)
                            .integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(LevelRecords::TotalTimeSeconds)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(LevelRecords::LastPlayedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(LevelRecords::FirstCompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(LevelRecords::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(LevelRecords::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_level_records_user")
                            .from(LevelRecords::Table, LevelRecords::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_level_records_level")
                            .from(LevelRecords::Table, LevelRecords::LevelId)
                            .to(Levels::Table, Levels::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // One record per (user, level); backs the fetch-or-create race
        manager
            .create_index(
                Index::create()
                    .name("idx_level_records_user_level")
                    .table(LevelRecords::Table)
                    .col(LevelRecords::UserId)
                    .col(LevelRecords::LevelId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GameHistories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GameHistories::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GameHistories::UserId).integer().not_null())
                    .col(ColumnDef::new(GameHistories::LevelId).integer().not_null())
                    .col(
                        ColumnDef::new(GameHistories::Score)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(GameHistories::TimeSeconds)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(GameHistories::StarsEarned)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(GameHistories::CorrectAnswers)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(GameHistories::WrongAnswers)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(GameHistories::TotalQuestions)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(GameHistories::TasksResult).text().null())
                    .col(
                        ColumnDef::new(GameHistories::IsCompleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(GameHistories::IsNewRecord)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(GameHistories::PlayedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_game_histories_user")
                            .from(GameHistories::Table, GameHistories::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_game_histories_level")
                            .from(GameHistories::Table, GameHistories::LevelId)
                            .to(Levels::Table, Levels::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_game_histories_user_played_at")
                    .table(GameHistories::Table)
                    .col(GameHistories::UserId)
                    .col(GameHistories::PlayedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GameHistories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LevelRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Levels::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Levels {
    Table,
    Id,
    Title,
    Description,
    Difficulty,
    EstimatedTimeMinutes,
    MaxScore,
    TasksConfig,
    UnlockLevelId,
    UnlockStarsRequired,
    RewardCoins,
    RewardExp,
    IsActive,
    SortOrder,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum LevelRecords {
    Table,
    Id,
    UserId,
    LevelId,
    BestScore,
    TotalAttempts,
    CompletedAttempts,
    Stars,
    TasksCompletion,
    Status,
    BestTimeSeconds,
    TotalTimeSeconds,
    LastPlayedAt,
    FirstCompletedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum GameHistories {
    Table,
    Id,
    UserId,
    LevelId,
    Score,
    TimeSeconds,
    StarsEarned,
    CorrectAnswers,
    WrongAnswers,
    TotalQuestions,
    TasksResult,
    IsCompleted,
    IsNewRecord,
    PlayedAt,
}
