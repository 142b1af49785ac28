use sea_orm::entity::prelude::*;

use quest_types::{GameHistoryEntry, TaskResult};

/// Append-only audit rows; never updated after insert.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "game_histories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub level_id: i32,
    pub score: i32,
    pub time_seconds: i32,
    pub stars_earned: i32,
    pub correct_answers: i32,
    pub wrong_answers: i32,
    pub total_questions: i32,
    pub tasks_result: Option<String>,
    pub is_completed: bool,
    pub is_new_record: bool,
    pub played_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn tasks_result(&self) -> Result<Vec<TaskResult>, serde_json::Error> {
        match &self.tasks_result {
            Some(raw) => serde_json::from_str(raw),
            None => Ok(Vec::new()),
        }
    }

    pub fn accuracy(&self) -> f64 {
        if self.total_questions == 0 {
            return 0.0;
        }
        (self.correct_answers as f64 / self.total_questions as f64 * 100.0 * 100.0).round() / 100.0
    }

    pub fn to_entry(&self) -> Result<GameHistoryEntry, serde_json::Error> {
        Ok(GameHistoryEntry {
            id: self.id,
            user_id: self.user_id,
            level_id: self.level_id,
            score: self.score,
            time_seconds: self.time_seconds,
            stars_earned: self.stars_earned,
            correct_answers: self.correct_answers,
            wrong_answers: self.wrong_answers,
            total_questions: self.total_questions,
            accuracy: self.accuracy(),
            tasks_result: self.tasks_result()?,
            is_completed: self.is_completed,
            is_new_record: self.is_new_record,
            played_at: self.played_at.to_rfc3339(),
        })
    }
}
