use sea_orm::entity::prelude::*;

use quest_types::{GameResult, GameSession, SessionPlayer, SessionStatus, SessionWord};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "game_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub session_code: String,
    pub game_id: i32,
    pub user_id: i32,
    pub status: String,
    pub current_round: i32,
    pub total_rounds: i32,
    pub words_data: Option<String>,
    pub players_data: Option<String>,
    pub game_result: Option<String>,
    pub final_score: i32,
    pub correct_answers: i32,
    pub wrong_answers: i32,
    pub time_used: i32,
    pub started_at: Option<DateTimeUtc>,
    pub finished_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn status(&self) -> SessionStatus {
        SessionStatus::parse(&self.status).unwrap_or(SessionStatus::Waiting)
    }

    /// Word set drawn for this session, snapshotted at start time.
    pub fn words(&self) -> Result<Vec<SessionWord>, serde_json::Error> {
        match &self.words_data {
            Some(raw) => serde_json::from_str(raw),
            None => Ok(Vec::new()),
        }
    }

    /// Roster with per-player running scores and ready flags.
    pub fn players(&self) -> Result<Vec<SessionPlayer>, serde_json::Error> {
        match &self.players_data {
            Some(raw) => serde_json::from_str(raw),
            None => Ok(Vec::new()),
        }
    }

    /// Final summary, present only once the session has finished.
    pub fn result(&self) -> Result<Option<GameResult>, serde_json::Error> {
        match &self.game_result {
            Some(raw) => serde_json::from_str(raw).map(Some),
            None => Ok(None),
        }
    }

    pub fn accuracy(&self) -> f64 {
        let total = self.correct_answers + self.wrong_answers;
        if total == 0 {
            return 0.0;
        }
        (self.correct_answers as f64 / total as f64 * 100.0 * 100.0).round() / 100.0
    }

    pub fn to_session(&self, game_name: Option<String>) -> GameSession {
        GameSession {
            id: self.id,
            session_code: self.session_code.clone(),
            game_id: self.game_id,
            game_name,
            user_id: self.user_id,
            status: self.status(),
            current_round: self.current_round,
            total_rounds: self.total_rounds,
            final_score: self.final_score,
            correct_answers: self.correct_answers,
            wrong_answers: self.wrong_answers,
            accuracy: self.accuracy(),
            time_used: self.time_used,
            started_at: self.started_at.map(|t| t.to_rfc3339()),
            finished_at: self.finished_at.map(|t| t.to_rfc3339()),
            created_at: self.created_at.to_rfc3339(),
        }
    }
}
