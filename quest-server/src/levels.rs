use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};

use quest_core::stars;
use quest_persistence::entities::{game_histories, level_records, levels, prelude::*};
use quest_persistence::repositories::{CompletionDelta, apply_completion_delta};
use quest_types::{
    CompleteLevelRequest, CompleteLevelResponse, EngineError, HistoryPage, Level, LevelDetail,
    LevelOverview, LevelStatus, Pagination, ProgressSummary, StartLevelResponse, TaskProgress,
};

use crate::store::{is_unique_violation, unwrap_txn_err, user_total_stars};

/// Orchestrates level start/complete, best-record bookkeeping and the
/// unlock cascade. Every mutating operation runs as one transaction.
pub struct LevelEngine {
    db: DatabaseConnection,
}

impl LevelEngine {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list_levels(&self, user_id: i32) -> Result<Vec<LevelOverview>, EngineError> {
        let level_models = Levels::find()
            .filter(levels::Column::IsActive.eq(true))
            .order_by_asc(levels::Column::SortOrder)
            .all(&self.db)
            .await
            .map_err(EngineError::internal)?;

        let records: HashMap<i32, level_records::Model> = LevelRecords::find()
            .filter(level_records::Column::UserId.eq(user_id))
            .all(&self.db)
            .await
            .map_err(EngineError::internal)?
            .into_iter()
            .map(|record| (record.level_id, record))
            .collect();

        let mut overviews = Vec::with_capacity(level_models.len());
        for model in level_models {
            let level = model.to_level().map_err(EngineError::internal)?;
            let record = records.get(&model.id);

            let completion = match record {
                Some(record) => record.tasks_completion().map_err(EngineError::internal)?,
                None => Vec::new(),
            };
            let tasks = level
                .tasks_config
                .iter()
                .enumerate()
                .map(|(i, task)| TaskProgress {
                    text: task.description.clone(),
                    done: completion.get(i).map(|t| t.completed).unwrap_or(false),
                })
                .collect();

            let overview = match record {
                Some(record) => LevelOverview {
                    best_score: Some(record.best_score),
                    stars: record.stars,
                    status: record.status(),
                    tasks,
                    total_attempts: record.total_attempts,
                    completed_attempts: record.completed_attempts,
                    completion_rate: record.completion_rate(),
                    level,
                },
                None => LevelOverview {
                    best_score: None,
                    stars: 0,
                    // Root levels are playable straight away
                    status: if level.unlock_level_id.is_some() {
                        LevelStatus::Locked
                    } else {
                        LevelStatus::Available
                    },
                    tasks,
                    total_attempts: 0,
                    completed_attempts: 0,
                    completion_rate: 0.0,
                    level,
                },
            };
            overviews.push(overview);
        }

        Ok(overviews)
    }

    pub async fn level_detail(
        &self,
        user_id: i32,
        level_id: i32,
    ) -> Result<LevelDetail, EngineError> {
        let level = find_active_level(&self.db, level_id).await?;

        let record = LevelRecords::find()
            .filter(level_records::Column::UserId.eq(user_id))
            .filter(level_records::Column::LevelId.eq(level_id))
            .one(&self.db)
            .await
            .map_err(EngineError::internal)?;

        Ok(LevelDetail {
            level: level.to_level().map_err(EngineError::internal)?,
            user_record: record
                .map(|r| r.to_record())
                .transpose()
                .map_err(EngineError::internal)?,
        })
    }

    /// Fetch-or-create the caller's record and count the attempt. A fresh
    /// record starts out available; only an existing locked record fails
    /// `Locked`.
    pub async fn start_level(
        &self,
        user_id: i32,
        level_id: i32,
    ) -> Result<StartLevelResponse, EngineError> {
        self.db
            .transaction::<_, StartLevelResponse, EngineError>(move |txn| {
                Box::pin(async move {
                    let level = find_active_level(txn, level_id).await?;
                    let record = fetch_or_create_record(txn, user_id, level_id).await?;

                    if record.status() == LevelStatus::Locked {
                        return Err(EngineError::Locked);
                    }

                    let now = Utc::now();
                    let mut updated: level_records::ActiveModel = record.clone().into();
                    updated.total_attempts = Set(record.total_attempts + 1);
                    updated.last_played_at = Set(Some(now));
                    updated.updated_at = Set(now);
                    let record = updated.update(txn).await.map_err(EngineError::internal)?;

                    Ok(StartLevelResponse {
                        level: level.to_level().map_err(EngineError::internal)?,
                        record: record.to_record().map_err(EngineError::internal)?,
                    })
                })
            })
            .await
            .map_err(unwrap_txn_err)
    }

    /// Record a completed attempt: star rating, best-ever bookkeeping, an
    /// immutable history row, the user aggregate delta, and the unlock
    /// cascade over dependent levels, all in one transaction.
    pub async fn complete_level(
        &self,
        user_id: i32,
        level_id: i32,
        request: CompleteLevelRequest,
    ) -> Result<CompleteLevelResponse, EngineError> {
        self.db
            .transaction::<_, CompleteLevelResponse, EngineError>(move |txn| {
                Box::pin(async move {
                    let level = find_active_level(txn, level_id).await?;

                    let record = LevelRecords::find()
                        .filter(level_records::Column::UserId.eq(user_id))
                        .filter(level_records::Column::LevelId.eq(level_id))
                        .one(txn)
                        .await
                        .map_err(EngineError::internal)?
                        .ok_or(EngineError::PreconditionFailed("start the level first"))?;

                    let tasks_total = level.tasks().map_err(EngineError::internal)?.len();
                    let tasks_completed =
                        request.tasks_result.iter().filter(|t| t.completed).count();
                    let stars_earned = stars(
                        request.score,
                        level.max_score,
                        request.time_seconds,
                        level.estimated_time_minutes,
                        tasks_completed,
                        tasks_total,
                    );

                    let now = Utc::now();
                    // Strict > : matching the best is not a new record
                    let is_new_record = request.score > record.best_score;
                    let tasks_json = serde_json::to_string(&request.tasks_result)
                        .map_err(EngineError::internal)?;

                    let mut updated: level_records::ActiveModel = record.clone().into();
                    if is_new_record {
                        updated.best_score = Set(request.score);
                    }
                    if record
                        .best_time_seconds
                        .map(|best| request.time_seconds < best)
                        .unwrap_or(true)
                    {
                        updated.best_time_seconds = Set(Some(request.time_seconds));
                    }
                    // Stars are a high-water mark; a weaker re-run never regresses them
                    if stars_earned > record.stars {
                        updated.stars = Set(stars_earned);
                    }
                    updated.tasks_completion = Set(Some(tasks_json.clone()));
                    updated.completed_attempts = Set(record.completed_attempts + 1);
                    updated.total_time_seconds =
                        Set(record.total_time_seconds + request.time_seconds);
                    updated.status = Set(LevelStatus::Completed.as_str().to_string());
                    if record.first_completed_at.is_none() {
                        updated.first_completed_at = Set(Some(now));
                    }
                    updated.updated_at = Set(now);
                    let record = updated.update(txn).await.map_err(EngineError::internal)?;

                    let history = game_histories::ActiveModel {
                        user_id: Set(user_id),
                        level_id: Set(level_id),
                        score: Set(request.score),
                        time_seconds: Set(request.time_seconds),
                        stars_earned: Set(stars_earned),
                        correct_answers: Set(request.correct_answers),
                        wrong_answers: Set(request.wrong_answers),
                        total_questions: Set(request.correct_answers + request.wrong_answers),
                        tasks_result: Set(Some(tasks_json)),
                        is_completed: Set(true),
                        is_new_record: Set(is_new_record),
                        played_at: Set(now),
                        ..Default::default()
                    };
                    history.insert(txn).await.map_err(EngineError::internal)?;

                    apply_completion_delta(
                        txn,
                        user_id,
                        CompletionDelta {
                            score: request.score,
                            won: false,
                            counts_game: false,
                        },
                    )
                    .await
                    .map_err(EngineError::internal)?;

                    let unlocked_levels = run_unlock_cascade(txn, user_id, level_id).await?;

                    Ok(CompleteLevelResponse {
                        score: request.score,
                        stars_earned,
                        is_new_record,
                        record: record.to_record().map_err(EngineError::internal)?,
                        unlocked_levels,
                    })
                })
            })
            .await
            .map_err(unwrap_txn_err)
    }

    pub async fn history(
        &self,
        user_id: i32,
        page: u64,
        per_page: u64,
        level_id: Option<i32>,
    ) -> Result<HistoryPage, EngineError> {
        let page = page.max(1);
        let per_page = per_page.clamp(1, 100);

        let mut query = GameHistories::find().filter(game_histories::Column::UserId.eq(user_id));
        if let Some(level_id) = level_id {
            query = query.filter(game_histories::Column::LevelId.eq(level_id));
        }

        let paginator = query
            .order_by_desc(game_histories::Column::PlayedAt)
            .paginate(&self.db, per_page);
        let counts = paginator
            .num_items_and_pages()
            .await
            .map_err(EngineError::internal)?;
        let models = paginator
            .fetch_page(page - 1)
            .await
            .map_err(EngineError::internal)?;

        let histories = models
            .iter()
            .map(|model| model.to_entry())
            .collect::<Result<Vec<_>, _>>()
            .map_err(EngineError::internal)?;

        Ok(HistoryPage {
            histories,
            pagination: Pagination {
                page,
                per_page,
                total: counts.number_of_items,
                pages: counts.number_of_pages,
            },
        })
    }

    pub async fn progress(&self, user_id: i32) -> Result<ProgressSummary, EngineError> {
        let total_levels = Levels::find()
            .filter(levels::Column::IsActive.eq(true))
            .count(&self.db)
            .await
            .map_err(EngineError::internal)?;

        let records = LevelRecords::find()
            .filter(level_records::Column::UserId.eq(user_id))
            .all(&self.db)
            .await
            .map_err(EngineError::internal)?;

        let completed_levels = records
            .iter()
            .filter(|r| r.status() == LevelStatus::Completed)
            .count() as u64;
        let total_stars: i64 = records.iter().map(|r| r.stars as i64).sum();
        let total_attempts: i64 = records.iter().map(|r| r.total_attempts as i64).sum();
        let total_time_seconds: i64 = records.iter().map(|r| r.total_time_seconds as i64).sum();

        let progress_percent = if total_levels > 0 {
            (completed_levels as f64 / total_levels as f64 * 100.0 * 100.0).round() / 100.0
        } else {
            0.0
        };

        let star_milestones = [10, 50, 100];
        let completion_milestones = [5, 20];
        let achievements = star_milestones
            .iter()
            .filter(|&&needed| total_stars >= needed)
            .count() as u32
            + completion_milestones
                .iter()
                .filter(|&&needed| completed_levels >= needed)
                .count() as u32;
        let achievements_total = 30;

        Ok(ProgressSummary {
            total_levels,
            completed_levels,
            progress_percent,
            total_stars,
            total_attempts,
            total_time_hours: (total_time_seconds as f64 / 3600.0 * 100.0).round() / 100.0,
            achievements,
            achievements_total,
            achievement_percent: (achievements as f64 / achievements_total as f64 * 100.0 * 100.0)
                .round()
                / 100.0,
        })
    }
}

async fn find_active_level<C: sea_orm::ConnectionTrait>(
    db: &C,
    level_id: i32,
) -> Result<levels::Model, EngineError> {
    Levels::find_by_id(level_id)
        .filter(levels::Column::IsActive.eq(true))
        .one(db)
        .await
        .map_err(EngineError::internal)?
        .ok_or(EngineError::NotFound("level"))
}

/// Fetch the (user, level) record, creating it as available when absent.
/// An insert losing the unique-index race falls back to fetching the
/// winner's row instead of failing the caller.
async fn fetch_or_create_record(
    txn: &DatabaseTransaction,
    user_id: i32,
    level_id: i32,
) -> Result<level_records::Model, EngineError> {
    let existing = LevelRecords::find()
        .filter(level_records::Column::UserId.eq(user_id))
        .filter(level_records::Column::LevelId.eq(level_id))
        .one(txn)
        .await
        .map_err(EngineError::internal)?;

    if let Some(record) = existing {
        return Ok(record);
    }

    let now = Utc::now();
    let new_record = level_records::ActiveModel {
        user_id: Set(user_id),
        level_id: Set(level_id),
        best_score: Set(0),
        total_attempts: Set(0),
        completed_attempts: Set(0),
        stars: Set(0),
        tasks_completion: Set(None),
        status: Set(LevelStatus::Available.as_str().to_string()),
        best_time_seconds: Set(None),
        total_time_seconds: Set(0),
        last_played_at: Set(None),
        first_completed_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    match new_record.insert(txn).await {
        Ok(record) => Ok(record),
        Err(err) if is_unique_violation(&err) => LevelRecords::find()
            .filter(level_records::Column::UserId.eq(user_id))
            .filter(level_records::Column::LevelId.eq(level_id))
            .one(txn)
            .await
            .map_err(EngineError::internal)?
            .ok_or(EngineError::Conflict("level record insert race")),
        Err(err) => Err(EngineError::internal(err)),
    }
}

/// Evaluate every level gated behind the just-completed one against the
/// user's accumulated star total. Returns only levels whose record
/// actually transitioned to available, so re-running the cascade with the
/// same star total is a no-op.
async fn run_unlock_cascade(
    txn: &DatabaseTransaction,
    user_id: i32,
    level_id: i32,
) -> Result<Vec<Level>, EngineError> {
    let dependents = Levels::find()
        .filter(levels::Column::UnlockLevelId.eq(level_id))
        .filter(levels::Column::IsActive.eq(true))
        .all(txn)
        .await
        .map_err(EngineError::internal)?;

    if dependents.is_empty() {
        return Ok(Vec::new());
    }

    let total_stars = user_total_stars(txn, user_id)
        .await
        .map_err(EngineError::internal)?;

    let mut unlocked = Vec::new();
    for next_level in dependents {
        if total_stars < next_level.unlock_stars_required as i64 {
            continue;
        }

        let next_record = LevelRecords::find()
            .filter(level_records::Column::UserId.eq(user_id))
            .filter(level_records::Column::LevelId.eq(next_level.id))
            .one(txn)
            .await
            .map_err(EngineError::internal)?;

        match next_record {
            None => {
                fetch_or_create_record(txn, user_id, next_level.id).await?;
                unlocked.push(next_level.to_level().map_err(EngineError::internal)?);
            }
            Some(record) if record.status() == LevelStatus::Locked => {
                let mut updated: level_records::ActiveModel = record.into();
                updated.status = Set(LevelStatus::Available.as_str().to_string());
                updated.updated_at = Set(Utc::now());
                updated.update(txn).await.map_err(EngineError::internal)?;
                unlocked.push(next_level.to_level().map_err(EngineError::internal)?);
            }
            // Already available or completed: never regress, never re-report
            Some(_) => {}
        }
    }

    Ok(unlocked)
}
