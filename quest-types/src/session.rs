use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::Pagination;

/// Session lifecycle. Linear: waiting -> playing -> finished. `Cancelled`
/// is a terminal state reachable only administratively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum SessionStatus {
    Waiting,
    Playing,
    Finished,
    Cancelled,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Waiting => "waiting",
            SessionStatus::Playing => "playing",
            SessionStatus::Finished => "finished",
            SessionStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "waiting" => Some(SessionStatus::Waiting),
            "playing" => Some(SessionStatus::Playing),
            "finished" => Some(SessionStatus::Finished),
            "cancelled" => Some(SessionStatus::Cancelled),
            _ => None,
        }
    }
}

/// Session template/config. Administrative entity, low churn.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Game {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub max_players: i32,
    pub time_limit: i32,
    pub word_count: i32,
    pub difficulty_level: i32,
    #[ts(type = "Record<string, unknown>")]
    pub rules_config: serde_json::Value,
    pub is_active: bool,
}

/// One roster entry inside a session's `players_data` snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionPlayer {
    pub user_id: i32,
    pub username: String,
    pub nickname: Option<String>,
    pub avatar_url: Option<String>,
    pub score: i32,
    pub ready: bool,
}

/// One word drawn into a session's `words_data` snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionWord {
    pub id: i32,
    pub word: String,
    pub translation: String,
    pub pronunciation: Option<String>,
    pub difficulty_level: i32,
}

/// Final summary written exactly once when a session finishes.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GameResult {
    pub final_score: i32,
    pub correct_answers: i32,
    pub wrong_answers: i32,
    pub total_questions: i32,
    pub accuracy: f64,
    pub time_used: i32,
    pub completed_at: String, // ISO 8601 string
    pub players: Vec<SessionPlayer>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GameSession {
    pub id: i32,
    pub session_code: String,
    pub game_id: i32,
    pub game_name: Option<String>,
    pub user_id: i32,
    pub status: SessionStatus,
    pub current_round: i32,
    pub total_rounds: i32,
    pub final_score: i32,
    pub correct_answers: i32,
    pub wrong_answers: i32,
    pub accuracy: f64,
    pub time_used: i32,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
    pub created_at: String,
}

/// Public read view of a session. The word snapshot is only exposed while
/// the session is in progress.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionView {
    pub session: GameSession,
    pub players: Vec<SessionPlayer>,
    pub words: Option<Vec<SessionWord>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateSessionRequest {
    pub game_id: i32,
    #[serde(default)]
    pub total_rounds: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SubmitAnswerRequest {
    pub word_id: i32,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    pub score: i32,
    pub correct_answer: String,
    pub total_score: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FinishSessionResponse {
    pub result: GameResult,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionsPage {
    pub sessions: Vec<GameSession>,
    pub pagination: Pagination,
}
