#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DatabaseConnection};
use warp::Filter;

use quest_persistence::connection::connect_to_memory_database;
use quest_persistence::entities::{games, level_records, levels, users, words};
use quest_persistence::repositories::UserRepository;
use quest_server::{
    auth::AuthService, create_routes, levels::LevelEngine, sessions::SessionEngine,
};

pub async fn setup_db() -> DatabaseConnection {
    let db = connect_to_memory_database().await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

/// Full route stack over the given database, with dev-mode auth so tests
/// authenticate as `dev:<user_id>`.
pub fn test_app(
    db: DatabaseConnection,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let level_engine = Arc::new(LevelEngine::new(db.clone()));
    let session_engine = Arc::new(SessionEngine::with_settings(db.clone(), 10, 80.0, 16));
    let auth_service = Arc::new(AuthService::new_dev_mode());
    let user_repository = Arc::new(UserRepository::new(db));

    create_routes(level_engine, session_engine, auth_service, user_repository)
}

pub async fn seed_user(db: &DatabaseConnection, name: &str) -> i32 {
    let now = Utc::now();
    let user = users::ActiveModel {
        username: Set(name.to_string()),
        email: Set(format!("{name}@example.com")),
        password_hash: Set("hash".to_string()),
        nickname: Set(None),
        avatar_url: Set(None),
        total_games: Set(0),
        total_wins: Set(0),
        best_score: Set(0),
        total_score: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    user.insert(db).await.unwrap().id
}

/// Insert a level with `task_count` one-line tasks. `unlock` is the
/// prerequisite level id and the star threshold.
pub async fn seed_level(
    db: &DatabaseConnection,
    title: &str,
    unlock: Option<(i32, i32)>,
    task_count: usize,
) -> i32 {
    let now = Utc::now();
    let tasks: Vec<serde_json::Value> = (0..task_count)
        .map(|i| serde_json::json!({ "description": format!("task {i}") }))
        .collect();
    let level = levels::ActiveModel {
        title: Set(title.to_string()),
        description: Set(None),
        difficulty: Set("easy".to_string()),
        estimated_time_minutes: Set(5),
        max_score: Set(1000),
        tasks_config: Set(Some(serde_json::to_string(&tasks).unwrap())),
        unlock_level_id: Set(unlock.map(|(id, _)| id)),
        unlock_stars_required: Set(unlock.map(|(_, stars)| stars).unwrap_or(0)),
        reward_coins: Set(0),
        reward_exp: Set(0),
        is_active: Set(true),
        sort_order: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    level.insert(db).await.unwrap().id
}

/// Insert a locked record for the pair, as seeded progression data would
/// carry before the prerequisite is met.
pub async fn seed_locked_record(db: &DatabaseConnection, user_id: i32, level_id: i32) -> i32 {
    let now = Utc::now();
    let record = level_records::ActiveModel {
        user_id: Set(user_id),
        level_id: Set(level_id),
        best_score: Set(0),
        total_attempts: Set(0),
        completed_attempts: Set(0),
        stars: Set(0),
        tasks_completion: Set(None),
        status: Set("locked".to_string()),
        best_time_seconds: Set(None),
        total_time_seconds: Set(0),
        last_played_at: Set(None),
        first_completed_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    record.insert(db).await.unwrap().id
}

pub async fn seed_word(db: &DatabaseConnection, word: &str, translation: &str) -> i32 {
    let model = words::ActiveModel {
        word: Set(word.to_string()),
        translation: Set(translation.to_string()),
        pronunciation: Set(None),
        difficulty_level: Set(1),
        example_sentence: Set(None),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    model.insert(db).await.unwrap().id
}

pub async fn seed_game(db: &DatabaseConnection, max_players: i32, word_count: i32) -> i32 {
    seed_game_with_rules(db, max_players, word_count, None).await
}

pub async fn seed_game_with_rules(
    db: &DatabaseConnection,
    max_players: i32,
    word_count: i32,
    rules: Option<serde_json::Value>,
) -> i32 {
    let now = Utc::now();
    let game = games::ActiveModel {
        name: Set("Vocabulary Sprint".to_string()),
        description: Set(None),
        max_players: Set(max_players),
        time_limit: Set(300),
        word_count: Set(word_count),
        difficulty_level: Set(1),
        rules_config: Set(rules.map(|r| r.to_string())),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    game.insert(db).await.unwrap().id
}
