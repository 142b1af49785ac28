use std::sync::Arc;

use serde::Deserialize;
use warp::Filter;
use warp::http::StatusCode;

use crate::auth::AuthService;
use crate::levels::LevelEngine;
use crate::sessions::SessionEngine;
use quest_persistence::repositories::UserRepository;
use quest_types::{CompleteLevelRequest, CreateSessionRequest, EngineError, SubmitAnswerRequest};

pub mod auth;
pub mod config;
pub mod levels;
pub mod sessions;
mod store;

#[derive(Deserialize)]
struct LeaderboardQuery {
    limit: Option<u64>,
}

#[derive(Deserialize)]
struct HistoryQuery {
    page: Option<u64>,
    per_page: Option<u64>,
    level_id: Option<i32>,
}

#[derive(Deserialize)]
struct PageQuery {
    page: Option<u64>,
    per_page: Option<u64>,
}

#[derive(serde::Serialize)]
struct UserStatsResponse {
    user: quest_types::User,
    rank: Option<u32>,
}

pub fn create_routes(
    level_engine: Arc<LevelEngine>,
    session_engine: Arc<SessionEngine>,
    auth_service: Arc<AuthService>,
    user_repository: Arc<UserRepository>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    // Clone for filters
    let level_engine_filter = warp::any().map({
        let level_engine = level_engine.clone();
        move || level_engine.clone()
    });

    let session_engine_filter = warp::any().map({
        let session_engine = session_engine.clone();
        move || session_engine.clone()
    });

    let auth_filter = warp::any().map({
        let auth_service = auth_service.clone();
        move || auth_service.clone()
    });

    let user_repository_filter = warp::any().map({
        let user_repository = user_repository.clone();
        move || user_repository.clone()
    });

    // Health check endpoint
    let health = warp::path!("health")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", StatusCode::OK));

    // Level endpoints
    let list_levels = warp::path!("levels")
        .and(warp::get())
        .and(warp::header::optional::<String>("authorization"))
        .and(level_engine_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_list_levels);

    let level_history = warp::path!("levels" / "history")
        .and(warp::get())
        .and(warp::query::<HistoryQuery>())
        .and(warp::header::optional::<String>("authorization"))
        .and(level_engine_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_level_history);

    let level_progress = warp::path!("levels" / "progress")
        .and(warp::get())
        .and(warp::header::optional::<String>("authorization"))
        .and(level_engine_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_level_progress);

    let level_detail = warp::path!("levels" / i32)
        .and(warp::get())
        .and(warp::header::optional::<String>("authorization"))
        .and(level_engine_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_level_detail);

    let start_level = warp::path!("levels" / i32 / "start")
        .and(warp::post())
        .and(warp::header::optional::<String>("authorization"))
        .and(level_engine_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_start_level);

    let complete_level = warp::path!("levels" / i32 / "complete")
        .and(warp::post())
        .and(warp::body::json())
        .and(warp::header::optional::<String>("authorization"))
        .and(level_engine_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_complete_level);

    // Session endpoints
    let create_session = warp::path!("sessions" / "create")
        .and(warp::post())
        .and(warp::body::json())
        .and(warp::header::optional::<String>("authorization"))
        .and(session_engine_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_create_session);

    let my_sessions = warp::path!("sessions" / "mine")
        .and(warp::get())
        .and(warp::query::<PageQuery>())
        .and(warp::header::optional::<String>("authorization"))
        .and(session_engine_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_my_sessions);

    let get_session = warp::path!("sessions" / String)
        .and(warp::get())
        .and(session_engine_filter.clone())
        .and_then(handle_get_session);

    let join_session = warp::path!("sessions" / String / "join")
        .and(warp::post())
        .and(warp::header::optional::<String>("authorization"))
        .and(session_engine_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_join_session);

    let start_session = warp::path!("sessions" / String / "start")
        .and(warp::post())
        .and(warp::header::optional::<String>("authorization"))
        .and(session_engine_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_start_session);

    let submit_answer = warp::path!("sessions" / String / "answer")
        .and(warp::post())
        .and(warp::body::json())
        .and(warp::header::optional::<String>("authorization"))
        .and(session_engine_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_submit_answer);

    let finish_session = warp::path!("sessions" / String / "finish")
        .and(warp::post())
        .and(warp::header::optional::<String>("authorization"))
        .and(session_engine_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_finish_session);

    // User endpoints
    let user_stats = warp::path!("users" / i32 / "stats")
        .and(warp::get())
        .and(warp::header::optional::<String>("authorization"))
        .and(user_repository_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_user_stats);

    let leaderboard = warp::path!("leaderboard")
        .and(warp::get())
        .and(warp::query::<LeaderboardQuery>())
        .and(user_repository_filter.clone())
        .and_then(handle_leaderboard);

    // CORS configuration
    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type", "authorization"])
        .allow_methods(vec!["GET", "POST", "DELETE"]);

    health
        .or(list_levels)
        .or(level_history)
        .or(level_progress)
        .or(level_detail)
        .or(start_level)
        .or(complete_level)
        .or(create_session)
        .or(my_sessions)
        .or(join_session)
        .or(start_session)
        .or(submit_answer)
        .or(finish_session)
        .or(get_session)
        .or(user_stats)
        .or(leaderboard)
        .with(cors)
        .with(warp::log("word_quest"))
}

fn error_body(message: &str) -> warp::reply::Json {
    warp::reply::json(&serde_json::json!({ "error": message }))
}

/// Serialize an engine result, mapping the error taxonomy onto HTTP
/// status codes. Internal failures are logged here and never leak their
/// detail to the client.
fn engine_reply<T: serde::Serialize>(
    result: Result<T, EngineError>,
) -> warp::reply::WithStatus<warp::reply::Json> {
    match result {
        Ok(value) => warp::reply::with_status(warp::reply::json(&value), StatusCode::OK),
        Err(EngineError::Internal(detail)) => {
            tracing::error!("Engine failure: {}", detail);
            warp::reply::with_status(
                error_body("internal error"),
                StatusCode::INTERNAL_SERVER_ERROR,
            )
        }
        Err(err) => {
            let status = match err {
                EngineError::NotFound(_) => StatusCode::NOT_FOUND,
                EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
                EngineError::Conflict(_) => StatusCode::CONFLICT,
                _ => StatusCode::BAD_REQUEST,
            };
            warp::reply::with_status(error_body(&err.to_string()), status)
        }
    }
}

/// Resolve the caller from a bearer header; on failure the ready-made 401
/// reply is handed back for the handler to return as-is.
fn authenticate(
    auth_service: &AuthService,
    auth_header: Option<String>,
) -> Result<i32, warp::reply::WithStatus<warp::reply::Json>> {
    let Some(header) = auth_header else {
        return Err(warp::reply::with_status(
            error_body("Authentication required"),
            StatusCode::UNAUTHORIZED,
        ));
    };
    let token = header.strip_prefix("Bearer ").unwrap_or(&header);
    auth_service.validate_token(token).map_err(|_| {
        warp::reply::with_status(
            error_body("Invalid authentication token"),
            StatusCode::UNAUTHORIZED,
        )
    })
}

async fn handle_list_levels(
    auth_header: Option<String>,
    level_engine: Arc<LevelEngine>,
    auth_service: Arc<AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let user_id = match authenticate(&auth_service, auth_header) {
        Ok(user_id) => user_id,
        Err(reply) => return Ok(reply),
    };
    Ok(engine_reply(level_engine.list_levels(user_id).await))
}

async fn handle_level_history(
    query: HistoryQuery,
    auth_header: Option<String>,
    level_engine: Arc<LevelEngine>,
    auth_service: Arc<AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let user_id = match authenticate(&auth_service, auth_header) {
        Ok(user_id) => user_id,
        Err(reply) => return Ok(reply),
    };
    Ok(engine_reply(
        level_engine
            .history(
                user_id,
                query.page.unwrap_or(1),
                query.per_page.unwrap_or(20),
                query.level_id,
            )
            .await,
    ))
}

async fn handle_level_progress(
    auth_header: Option<String>,
    level_engine: Arc<LevelEngine>,
    auth_service: Arc<AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let user_id = match authenticate(&auth_service, auth_header) {
        Ok(user_id) => user_id,
        Err(reply) => return Ok(reply),
    };
    Ok(engine_reply(level_engine.progress(user_id).await))
}

async fn handle_level_detail(
    level_id: i32,
    auth_header: Option<String>,
    level_engine: Arc<LevelEngine>,
    auth_service: Arc<AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let user_id = match authenticate(&auth_service, auth_header) {
        Ok(user_id) => user_id,
        Err(reply) => return Ok(reply),
    };
    Ok(engine_reply(
        level_engine.level_detail(user_id, level_id).await,
    ))
}

async fn handle_start_level(
    level_id: i32,
    auth_header: Option<String>,
    level_engine: Arc<LevelEngine>,
    auth_service: Arc<AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let user_id = match authenticate(&auth_service, auth_header) {
        Ok(user_id) => user_id,
        Err(reply) => return Ok(reply),
    };
    Ok(engine_reply(
        level_engine.start_level(user_id, level_id).await,
    ))
}

async fn handle_complete_level(
    level_id: i32,
    request: CompleteLevelRequest,
    auth_header: Option<String>,
    level_engine: Arc<LevelEngine>,
    auth_service: Arc<AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let user_id = match authenticate(&auth_service, auth_header) {
        Ok(user_id) => user_id,
        Err(reply) => return Ok(reply),
    };
    Ok(engine_reply(
        level_engine.complete_level(user_id, level_id, request).await,
    ))
}

async fn handle_create_session(
    request: CreateSessionRequest,
    auth_header: Option<String>,
    session_engine: Arc<SessionEngine>,
    auth_service: Arc<AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let user_id = match authenticate(&auth_service, auth_header) {
        Ok(user_id) => user_id,
        Err(reply) => return Ok(reply),
    };
    Ok(engine_reply(
        session_engine.create_session(user_id, request).await,
    ))
}

async fn handle_my_sessions(
    query: PageQuery,
    auth_header: Option<String>,
    session_engine: Arc<SessionEngine>,
    auth_service: Arc<AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let user_id = match authenticate(&auth_service, auth_header) {
        Ok(user_id) => user_id,
        Err(reply) => return Ok(reply),
    };
    Ok(engine_reply(
        session_engine
            .my_sessions(
                user_id,
                query.page.unwrap_or(1),
                query.per_page.unwrap_or(20),
            )
            .await,
    ))
}

async fn handle_get_session(
    code: String,
    session_engine: Arc<SessionEngine>,
) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(engine_reply(session_engine.get_session(&code).await))
}

async fn handle_join_session(
    code: String,
    auth_header: Option<String>,
    session_engine: Arc<SessionEngine>,
    auth_service: Arc<AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let user_id = match authenticate(&auth_service, auth_header) {
        Ok(user_id) => user_id,
        Err(reply) => return Ok(reply),
    };
    Ok(engine_reply(
        session_engine.join_session(&code, user_id).await,
    ))
}

async fn handle_start_session(
    code: String,
    auth_header: Option<String>,
    session_engine: Arc<SessionEngine>,
    auth_service: Arc<AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let user_id = match authenticate(&auth_service, auth_header) {
        Ok(user_id) => user_id,
        Err(reply) => return Ok(reply),
    };
    Ok(engine_reply(
        session_engine.start_session(&code, user_id).await,
    ))
}

async fn handle_submit_answer(
    code: String,
    request: SubmitAnswerRequest,
    auth_header: Option<String>,
    session_engine: Arc<SessionEngine>,
    auth_service: Arc<AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let user_id = match authenticate(&auth_service, auth_header) {
        Ok(user_id) => user_id,
        Err(reply) => return Ok(reply),
    };
    Ok(engine_reply(
        session_engine.submit_answer(&code, user_id, request).await,
    ))
}

async fn handle_finish_session(
    code: String,
    auth_header: Option<String>,
    session_engine: Arc<SessionEngine>,
    auth_service: Arc<AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let user_id = match authenticate(&auth_service, auth_header) {
        Ok(user_id) => user_id,
        Err(reply) => return Ok(reply),
    };
    Ok(engine_reply(
        session_engine.finish_session(&code, user_id).await,
    ))
}

async fn handle_user_stats(
    user_id: i32,
    auth_header: Option<String>,
    user_repository: Arc<UserRepository>,
    auth_service: Arc<AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let caller_id = match authenticate(&auth_service, auth_header) {
        Ok(caller_id) => caller_id,
        Err(reply) => return Ok(reply),
    };

    // Only allow users to view their own stats
    if caller_id != user_id {
        return Ok(warp::reply::with_status(
            error_body("Not authorized to view this user's stats"),
            StatusCode::FORBIDDEN,
        ));
    }

    match user_repository.find_by_id(user_id).await {
        Ok(Some(user)) => {
            let rank = match user_repository.get_user_rank(user_id).await {
                Ok(rank) => rank,
                Err(err) => {
                    tracing::error!("Failed to get user rank: {}", err);
                    None
                }
            };
            Ok(warp::reply::with_status(
                warp::reply::json(&UserStatsResponse { user, rank }),
                StatusCode::OK,
            ))
        }
        Ok(None) => Ok(warp::reply::with_status(
            error_body("User not found"),
            StatusCode::NOT_FOUND,
        )),
        Err(err) => {
            tracing::error!("Failed to fetch user stats: {}", err);
            Ok(warp::reply::with_status(
                error_body("Failed to fetch user stats"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ))
        }
    }
}

async fn handle_leaderboard(
    query: LeaderboardQuery,
    user_repository: Arc<UserRepository>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let limit = query.limit.unwrap_or(10).min(100); // Default 10, max 100

    match user_repository.get_leaderboard(limit).await {
        Ok(leaderboard) => Ok(warp::reply::with_status(
            warp::reply::json(&leaderboard),
            StatusCode::OK,
        )),
        Err(err) => {
            tracing::error!("Failed to fetch leaderboard: {}", err);
            Ok(warp::reply::with_status(
                error_body("Failed to fetch leaderboard"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ))
        }
    }
}
