use sea_orm::entity::prelude::*;

use quest_types::{LevelRecord, LevelStatus, TaskResult};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "level_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub level_id: i32,
    pub best_score: i32,
    pub total_attempts: i32,
    pub completed_attempts: i32,
    pub stars: i32,
    pub tasks_completion: Option<String>,
    pub status: String,
    pub best_time_seconds: Option<i32>,
    pub total_time_seconds: i32,
    pub last_played_at: Option<DateTimeUtc>,
    pub first_completed_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn status(&self) -> LevelStatus {
        LevelStatus::parse(&self.status).unwrap_or(LevelStatus::Locked)
    }

    /// Latest-wins snapshot of per-task completion for this user.
    pub fn tasks_completion(&self) -> Result<Vec<TaskResult>, serde_json::Error> {
        match &self.tasks_completion {
            Some(raw) => serde_json::from_str(raw),
            None => Ok(Vec::new()),
        }
    }

    pub fn completion_rate(&self) -> f64 {
        if self.total_attempts == 0 {
            return 0.0;
        }
        (self.completed_attempts as f64 / self.total_attempts as f64 * 100.0 * 100.0).round()
            / 100.0
    }

    pub fn to_record(&self) -> Result<LevelRecord, serde_json::Error> {
        Ok(LevelRecord {
            id: self.id,
            user_id: self.user_id,
            level_id: self.level_id,
            best_score: self.best_score,
            total_attempts: self.total_attempts,
            completed_attempts: self.completed_attempts,
            completion_rate: self.completion_rate(),
            stars: self.stars,
            tasks_completion: self.tasks_completion()?,
            status: self.status(),
            best_time_seconds: self.best_time_seconds,
            total_time_seconds: self.total_time_seconds,
            last_played_at: self.last_played_at.map(|t| t.to_rfc3339()),
            first_completed_at: self.first_completed_at.map(|t| t.to_rfc3339()),
            created_at: self.created_at.to_rfc3339(),
        })
    }
}
