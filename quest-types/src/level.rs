use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Per-user progress state of a level. Transitions are forward-only:
/// locked -> available -> completed, and completed is sticky.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum LevelStatus {
    Locked,
    Available,
    Completed,
}

impl LevelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LevelStatus::Locked => "locked",
            LevelStatus::Available => "available",
            LevelStatus::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "locked" => Some(LevelStatus::Locked),
            "available" => Some(LevelStatus::Available),
            "completed" => Some(LevelStatus::Completed),
            _ => None,
        }
    }
}

/// One task requirement configured on a level.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaskSpec {
    pub description: String,
    #[serde(default)]
    pub target: Option<i32>,
    #[serde(default)]
    pub task_type: Option<String>,
}

/// Per-task outcome reported by the client on completion.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaskResult {
    #[serde(default)]
    pub description: Option<String>,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Level {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub difficulty: String,
    pub estimated_time_minutes: i32,
    pub max_score: i32,
    pub tasks_config: Vec<TaskSpec>,
    pub unlock_level_id: Option<i32>,
    pub unlock_stars_required: i32,
    pub reward_coins: i32,
    pub reward_exp: i32,
    pub is_active: bool,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LevelRecord {
    pub id: i32,
    pub user_id: i32,
    pub level_id: i32,
    pub best_score: i32,
    pub total_attempts: i32,
    pub completed_attempts: i32,
    pub completion_rate: f64,
    pub stars: i32,
    pub tasks_completion: Vec<TaskResult>,
    pub status: LevelStatus,
    pub best_time_seconds: Option<i32>,
    pub total_time_seconds: i32,
    pub last_played_at: Option<String>, // ISO 8601 string
    pub first_completed_at: Option<String>,
    pub created_at: String,
}

/// A level's task merged with the caller's latest completion snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaskProgress {
    pub text: String,
    pub done: bool,
}

/// List view of a level merged with the caller's record (or defaults when
/// the user has never touched the level).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LevelOverview {
    pub level: Level,
    pub best_score: Option<i32>,
    pub stars: i32,
    pub status: LevelStatus,
    pub tasks: Vec<TaskProgress>,
    pub total_attempts: i32,
    pub completed_attempts: i32,
    pub completion_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LevelDetail {
    pub level: Level,
    pub user_record: Option<LevelRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StartLevelResponse {
    pub level: Level,
    pub record: LevelRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CompleteLevelRequest {
    pub score: i32,
    pub time_seconds: i32,
    pub correct_answers: i32,
    pub wrong_answers: i32,
    pub tasks_result: Vec<TaskResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CompleteLevelResponse {
    pub score: i32,
    pub stars_earned: i32,
    pub is_new_record: bool,
    pub record: LevelRecord,
    pub unlocked_levels: Vec<Level>,
}

/// Immutable audit row for one completed attempt.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GameHistoryEntry {
    pub id: i32,
    pub user_id: i32,
    pub level_id: i32,
    pub score: i32,
    pub time_seconds: i32,
    pub stars_earned: i32,
    pub correct_answers: i32,
    pub wrong_answers: i32,
    pub total_questions: i32,
    pub accuracy: f64,
    pub tasks_result: Vec<TaskResult>,
    pub is_completed: bool,
    pub is_new_record: bool,
    pub played_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Pagination {
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub pages: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HistoryPage {
    pub histories: Vec<GameHistoryEntry>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProgressSummary {
    pub total_levels: u64,
    pub completed_levels: u64,
    pub progress_percent: f64,
    pub total_stars: i64,
    pub total_attempts: i64,
    pub total_time_hours: f64,
    pub achievements: u32,
    pub achievements_total: u32,
    pub achievement_percent: f64,
}
