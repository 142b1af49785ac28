mod common;

use common::{seed_level, seed_locked_record, seed_user, setup_db, test_app};
use quest_types::{
    CompleteLevelRequest, CompleteLevelResponse, HistoryPage, LevelOverview, LevelStatus,
    ProgressSummary, StartLevelResponse, TaskResult,
};

fn completion(score: i32, time_seconds: i32, tasks_done: usize, tasks_total: usize) -> CompleteLevelRequest {
    CompleteLevelRequest {
        score,
        time_seconds,
        correct_answers: 18,
        wrong_answers: 2,
        tasks_result: (0..tasks_total)
            .map(|i| TaskResult {
                description: None,
                completed: i < tasks_done,
            })
            .collect(),
    }
}

#[tokio::test]
async fn test_levels_require_authentication() {
    let db = setup_db().await;
    let app = test_app(db.clone());

    let response = warp::test::request()
        .method("GET")
        .path("/levels")
        .reply(&app)
        .await;
    assert_eq!(response.status(), 401);

    let response = warp::test::request()
        .method("GET")
        .path("/levels")
        .header("authorization", "garbage")
        .reply(&app)
        .await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_list_levels_defaults_for_new_user() {
    let db = setup_db().await;
    let first = seed_level(&db, "Basics", None, 2).await;
    let gated = seed_level(&db, "Advanced", Some((first, 2)), 1).await;
    let user = seed_user(&db, "alice").await;
    let app = test_app(db.clone());

    let response = warp::test::request()
        .method("GET")
        .path("/levels")
        .header("authorization", format!("dev:{user}"))
        .reply(&app)
        .await;
    assert_eq!(response.status(), 200);

    let overviews: Vec<LevelOverview> = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(overviews.len(), 2);

    let basics = overviews.iter().find(|o| o.level.id == first).unwrap();
    assert_eq!(basics.status, LevelStatus::Available);
    assert_eq!(basics.best_score, None);
    assert_eq!(basics.stars, 0);
    assert_eq!(basics.tasks.len(), 2);
    assert!(basics.tasks.iter().all(|t| !t.done));

    let advanced = overviews.iter().find(|o| o.level.id == gated).unwrap();
    assert_eq!(advanced.status, LevelStatus::Locked);
}

#[tokio::test]
async fn test_untouched_gated_level_starts_as_available() {
    let db = setup_db().await;
    let first = seed_level(&db, "Basics", None, 1).await;
    let gated = seed_level(&db, "Advanced", Some((first, 2)), 1).await;
    let user = seed_user(&db, "bob").await;
    let app = test_app(db.clone());

    let response = warp::test::request()
        .method("POST")
        .path(&format!("/levels/{gated}/start"))
        .header("authorization", format!("dev:{user}"))
        .reply(&app)
        .await;
    assert_eq!(response.status(), 200);

    let started: StartLevelResponse = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(started.record.status, LevelStatus::Available);
    assert_eq!(started.record.total_attempts, 1);
}

#[tokio::test]
async fn test_locked_record_blocks_start() {
    let db = setup_db().await;
    let first = seed_level(&db, "Basics", None, 1).await;
    let gated = seed_level(&db, "Advanced", Some((first, 2)), 1).await;
    let user = seed_user(&db, "bert").await;
    seed_locked_record(&db, user, gated).await;
    let app = test_app(db.clone());

    let response = warp::test::request()
        .method("POST")
        .path(&format!("/levels/{gated}/start"))
        .header("authorization", format!("dev:{user}"))
        .reply(&app)
        .await;
    assert_eq!(response.status(), 400);

    let error: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(error["error"], "level is not unlocked yet");
}

#[tokio::test]
async fn test_complete_requires_prior_start() {
    let db = setup_db().await;
    let level = seed_level(&db, "Basics", None, 1).await;
    let user = seed_user(&db, "carol").await;
    let app = test_app(db.clone());

    let response = warp::test::request()
        .method("POST")
        .path(&format!("/levels/{level}/complete"))
        .header("authorization", format!("dev:{user}"))
        .json(&completion(500, 100, 1, 1))
        .reply(&app)
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_complete_awards_stars_and_unlocks_dependents() {
    let db = setup_db().await;
    let first = seed_level(&db, "Basics", None, 3).await;
    let gated = seed_level(&db, "Advanced", Some((first, 2)), 1).await;
    let user = seed_user(&db, "dave").await;
    let app = test_app(db.clone());

    let response = warp::test::request()
        .method("POST")
        .path(&format!("/levels/{first}/start"))
        .header("authorization", format!("dev:{user}"))
        .reply(&app)
        .await;
    assert_eq!(response.status(), 200);
    let started: StartLevelResponse = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(started.record.total_attempts, 1);

    // 950/1000 within 80% of the estimate with all tasks done: 3 stars
    let response = warp::test::request()
        .method("POST")
        .path(&format!("/levels/{first}/complete"))
        .header("authorization", format!("dev:{user}"))
        .json(&completion(950, 200, 3, 3))
        .reply(&app)
        .await;
    assert_eq!(response.status(), 200);

    let completed: CompleteLevelResponse = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(completed.stars_earned, 3);
    assert!(completed.is_new_record);
    assert_eq!(completed.record.best_score, 950);
    assert_eq!(completed.record.best_time_seconds, Some(200));
    assert_eq!(completed.record.status, LevelStatus::Completed);
    assert_eq!(completed.unlocked_levels.len(), 1);
    assert_eq!(completed.unlocked_levels[0].id, gated);

    // A weaker re-run keeps the record and reports no new unlocks
    let response = warp::test::request()
        .method("POST")
        .path(&format!("/levels/{first}/complete"))
        .header("authorization", format!("dev:{user}"))
        .json(&completion(750, 290, 1, 3))
        .reply(&app)
        .await;
    assert_eq!(response.status(), 200);

    let repeat: CompleteLevelResponse = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(repeat.stars_earned, 1);
    assert!(!repeat.is_new_record);
    assert_eq!(repeat.record.best_score, 950);
    assert_eq!(repeat.record.stars, 3);
    assert_eq!(repeat.record.best_time_seconds, Some(200));
    assert!(repeat.unlocked_levels.is_empty());

    // The gated level is now startable
    let response = warp::test::request()
        .method("POST")
        .path(&format!("/levels/{gated}/start"))
        .header("authorization", format!("dev:{user}"))
        .reply(&app)
        .await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_history_pagination_and_filter() {
    let db = setup_db().await;
    let level = seed_level(&db, "Basics", None, 1).await;
    let other = seed_level(&db, "Other", None, 1).await;
    let user = seed_user(&db, "erin").await;
    let app = test_app(db.clone());

    for target in [level, level, other] {
        warp::test::request()
            .method("POST")
            .path(&format!("/levels/{target}/start"))
            .header("authorization", format!("dev:{user}"))
            .reply(&app)
            .await;
        warp::test::request()
            .method("POST")
            .path(&format!("/levels/{target}/complete"))
            .header("authorization", format!("dev:{user}"))
            .json(&completion(500, 100, 1, 1))
            .reply(&app)
            .await;
    }

    let response = warp::test::request()
        .method("GET")
        .path("/levels/history?per_page=2")
        .header("authorization", format!("dev:{user}"))
        .reply(&app)
        .await;
    assert_eq!(response.status(), 200);

    let page: HistoryPage = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(page.pagination.total, 3);
    assert_eq!(page.pagination.pages, 2);
    assert_eq!(page.histories.len(), 2);

    let response = warp::test::request()
        .method("GET")
        .path(&format!("/levels/history?level_id={level}"))
        .header("authorization", format!("dev:{user}"))
        .reply(&app)
        .await;
    let filtered: HistoryPage = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(filtered.pagination.total, 2);
    assert!(filtered.histories.iter().all(|h| h.level_id == level));
}

#[tokio::test]
async fn test_progress_summary() {
    let db = setup_db().await;
    let first = seed_level(&db, "Basics", None, 3).await;
    let _gated = seed_level(&db, "Advanced", Some((first, 2)), 1).await;
    let user = seed_user(&db, "fred").await;
    let app = test_app(db.clone());

    warp::test::request()
        .method("POST")
        .path(&format!("/levels/{first}/start"))
        .header("authorization", format!("dev:{user}"))
        .reply(&app)
        .await;
    warp::test::request()
        .method("POST")
        .path(&format!("/levels/{first}/complete"))
        .header("authorization", format!("dev:{user}"))
        .json(&completion(950, 200, 3, 3))
        .reply(&app)
        .await;

    let response = warp::test::request()
        .method("GET")
        .path("/levels/progress")
        .header("authorization", format!("dev:{user}"))
        .reply(&app)
        .await;
    assert_eq!(response.status(), 200);

    let progress: ProgressSummary = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(progress.total_levels, 2);
    assert_eq!(progress.completed_levels, 1);
    assert_eq!(progress.progress_percent, 50.0);
    assert_eq!(progress.total_stars, 3);
}

#[tokio::test]
async fn test_level_completion_feeds_score_but_not_game_counters() {
    let db = setup_db().await;
    let level = seed_level(&db, "Basics", None, 1).await;
    let user = seed_user(&db, "gina").await;
    let app = test_app(db.clone());

    warp::test::request()
        .method("POST")
        .path(&format!("/levels/{level}/start"))
        .header("authorization", format!("dev:{user}"))
        .reply(&app)
        .await;
    warp::test::request()
        .method("POST")
        .path(&format!("/levels/{level}/complete"))
        .header("authorization", format!("dev:{user}"))
        .json(&completion(600, 100, 1, 1))
        .reply(&app)
        .await;

    let response = warp::test::request()
        .method("GET")
        .path(&format!("/users/{user}/stats"))
        .header("authorization", format!("dev:{user}"))
        .reply(&app)
        .await;
    assert_eq!(response.status(), 200);

    let stats: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(stats["user"]["total_score"], 600);
    assert_eq!(stats["user"]["best_score"], 600);
    assert_eq!(stats["user"]["total_games"], 0);
    assert_eq!(stats["user"]["total_wins"], 0);
}

#[tokio::test]
async fn test_user_stats_are_private() {
    let db = setup_db().await;
    let user = seed_user(&db, "henry").await;
    let other = seed_user(&db, "irene").await;
    let app = test_app(db.clone());

    let response = warp::test::request()
        .method("GET")
        .path(&format!("/users/{other}/stats"))
        .header("authorization", format!("dev:{user}"))
        .reply(&app)
        .await;
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn test_unknown_level_is_404() {
    let db = setup_db().await;
    let user = seed_user(&db, "jack").await;
    let app = test_app(db.clone());

    let response = warp::test::request()
        .method("GET")
        .path("/levels/9999")
        .header("authorization", format!("dev:{user}"))
        .reply(&app)
        .await;
    assert_eq!(response.status(), 404);
}
