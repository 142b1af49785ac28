use std::collections::HashMap;

use chrono::Utc;
use rand::seq::SliceRandom;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};

use quest_core::{WinPolicy, accuracy, generate_session_code};
use quest_persistence::entities::{game_sessions, games, prelude::*, words};
use quest_persistence::repositories::{CompletionDelta, apply_completion_delta};
use quest_types::{
    AnswerOutcome, CreateSessionRequest, EngineError, FinishSessionResponse, GameResult,
    Pagination, SessionPlayer, SessionStatus, SessionView, SessionsPage, SubmitAnswerRequest,
};

use crate::store::{is_unique_violation, unwrap_txn_err};

/// Orchestrates the multiplayer session lifecycle: create a lobby, join
/// it, start with a drawn word set, score answers, finish with a summary.
pub struct SessionEngine {
    db: DatabaseConnection,
    base_answer_score: i32,
    accuracy_win_threshold: f64,
    code_max_attempts: u32,
}

impl SessionEngine {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            base_answer_score: 10,
            accuracy_win_threshold: 80.0,
            code_max_attempts: 16,
        }
    }

    pub fn with_settings(
        db: DatabaseConnection,
        base_answer_score: i32,
        accuracy_win_threshold: f64,
        code_max_attempts: u32,
    ) -> Self {
        Self {
            db,
            base_answer_score,
            accuracy_win_threshold,
            code_max_attempts,
        }
    }

    /// Create a waiting lobby for the given game with the caller already
    /// on the roster.
    pub async fn create_session(
        &self,
        owner_id: i32,
        request: CreateSessionRequest,
    ) -> Result<SessionView, EngineError> {
        let game = Games::find_by_id(request.game_id)
            .filter(games::Column::IsActive.eq(true))
            .one(&self.db)
            .await
            .map_err(EngineError::internal)?
            .ok_or(EngineError::NotFound("game"))?;

        let owner = Users::find_by_id(owner_id)
            .one(&self.db)
            .await
            .map_err(EngineError::internal)?
            .ok_or(EngineError::NotFound("user"))?;

        let players = vec![SessionPlayer {
            user_id: owner.id,
            username: owner.username.clone(),
            nickname: owner.nickname.clone(),
            avatar_url: owner.avatar_url.clone(),
            score: 0,
            ready: false,
        }];
        let players_json = serde_json::to_string(&players).map_err(EngineError::internal)?;

        for _ in 0..self.code_max_attempts {
            let code = generate_session_code();

            let taken = GameSessions::find()
                .filter(game_sessions::Column::SessionCode.eq(code.clone()))
                .one(&self.db)
                .await
                .map_err(EngineError::internal)?
                .is_some();
            if taken {
                continue;
            }

            let now = Utc::now();
            let session = game_sessions::ActiveModel {
                session_code: Set(code),
                game_id: Set(game.id),
                user_id: Set(owner_id),
                status: Set(SessionStatus::Waiting.as_str().to_string()),
                current_round: Set(0),
                total_rounds: Set(request.total_rounds.unwrap_or(1)),
                words_data: Set(None),
                players_data: Set(Some(players_json.clone())),
                game_result: Set(None),
                final_score: Set(0),
                correct_answers: Set(0),
                wrong_answers: Set(0),
                time_used: Set(0),
                started_at: Set(None),
                finished_at: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            };

            match session.insert(&self.db).await {
                Ok(model) => {
                    return Ok(SessionView {
                        session: model.to_session(Some(game.name.clone())),
                        players,
                        words: None,
                    });
                }
                // Lost the race on the unique code index; draw again
                Err(err) if is_unique_violation(&err) => continue,
                Err(err) => return Err(EngineError::internal(err)),
            }
        }

        Err(EngineError::Conflict("could not allocate a session code"))
    }

    pub async fn join_session(&self, code: &str, user_id: i32) -> Result<SessionView, EngineError> {
        let code = code.to_string();
        self.db
            .transaction::<_, SessionView, EngineError>(move |txn| {
                Box::pin(async move {
                    let session = find_session(txn, &code).await?;
                    if session.status() != SessionStatus::Waiting {
                        return Err(EngineError::InvalidState("session is not joinable"));
                    }

                    let game = Games::find_by_id(session.game_id)
                        .one(txn)
                        .await
                        .map_err(EngineError::internal)?
                        .ok_or(EngineError::NotFound("game"))?;

                    let mut players = session.players().map_err(EngineError::internal)?;
                    if players.iter().any(|p| p.user_id == user_id) {
                        return Err(EngineError::AlreadyJoined);
                    }
                    if players.len() as i32 >= game.max_players {
                        return Err(EngineError::Full);
                    }

                    let user = Users::find_by_id(user_id)
                        .one(txn)
                        .await
                        .map_err(EngineError::internal)?
                        .ok_or(EngineError::NotFound("user"))?;
                    players.push(SessionPlayer {
                        user_id: user.id,
                        username: user.username.clone(),
                        nickname: user.nickname.clone(),
                        avatar_url: user.avatar_url.clone(),
                        score: 0,
                        ready: false,
                    });

                    let mut updated: game_sessions::ActiveModel = session.into();
                    updated.players_data = Set(Some(
                        serde_json::to_string(&players).map_err(EngineError::internal)?,
                    ));
                    updated.updated_at = Set(Utc::now());
                    let session = updated.update(txn).await.map_err(EngineError::internal)?;

                    Ok(SessionView {
                        session: session.to_session(Some(game.name)),
                        players,
                        words: None,
                    })
                })
            })
            .await
            .map_err(unwrap_txn_err)
    }

    /// Owner-only. Draws the game's word set from the active pool and
    /// moves the session to playing.
    pub async fn start_session(
        &self,
        code: &str,
        requester_id: i32,
    ) -> Result<SessionView, EngineError> {
        let code = code.to_string();
        self.db
            .transaction::<_, SessionView, EngineError>(move |txn| {
                Box::pin(async move {
                    let session = find_session(txn, &code).await?;
                    if session.user_id != requester_id {
                        return Err(EngineError::Forbidden("only the owner can start"));
                    }
                    if session.status() != SessionStatus::Waiting {
                        return Err(EngineError::InvalidState("session already started"));
                    }

                    let game = Games::find_by_id(session.game_id)
                        .one(txn)
                        .await
                        .map_err(EngineError::internal)?
                        .ok_or(EngineError::NotFound("game"))?;

                    let pool = Words::find()
                        .filter(words::Column::IsActive.eq(true))
                        .all(txn)
                        .await
                        .map_err(EngineError::internal)?;
                    if (pool.len() as i32) < game.word_count {
                        return Err(EngineError::InsufficientContent);
                    }

                    // ThreadRng is !Send; keep it scoped away from awaits
                    let drawn: Vec<_> = {
                        let mut rng = rand::thread_rng();
                        pool.choose_multiple(&mut rng, game.word_count as usize)
                            .map(|word| word.to_session_word())
                            .collect()
                    };

                    let now = Utc::now();
                    let players = session.players().map_err(EngineError::internal)?;
                    let mut updated: game_sessions::ActiveModel = session.into();
                    updated.words_data = Set(Some(
                        serde_json::to_string(&drawn).map_err(EngineError::internal)?,
                    ));
                    updated.status = Set(SessionStatus::Playing.as_str().to_string());
                    updated.current_round = Set(1);
                    updated.started_at = Set(Some(now));
                    updated.updated_at = Set(now);
                    let session = updated.update(txn).await.map_err(EngineError::internal)?;

                    Ok(SessionView {
                        session: session.to_session(Some(game.name)),
                        players,
                        words: Some(drawn),
                    })
                })
            })
            .await
            .map_err(unwrap_txn_err)
    }

    /// Score one answer against the session's word snapshot. Matching is
    /// case-insensitive on the trimmed translation.
    pub async fn submit_answer(
        &self,
        code: &str,
        user_id: i32,
        request: SubmitAnswerRequest,
    ) -> Result<AnswerOutcome, EngineError> {
        let code = code.to_string();
        let base_score = self.base_answer_score;
        self.db
            .transaction::<_, AnswerOutcome, EngineError>(move |txn| {
                Box::pin(async move {
                    let session = find_session(txn, &code).await?;
                    if session.status() != SessionStatus::Playing {
                        return Err(EngineError::InvalidState("session is not in play"));
                    }

                    let session_words = session.words().map_err(EngineError::internal)?;
                    let word = session_words
                        .iter()
                        .find(|w| w.id == request.word_id)
                        .ok_or(EngineError::NotFound("word"))?;

                    let is_correct = request.answer.trim().to_lowercase()
                        == word.translation.trim().to_lowercase();
                    let score = if is_correct { base_score } else { 0 };

                    let mut players = session.players().map_err(EngineError::internal)?;
                    // Answers from outside the roster still count toward the
                    // session totals but move no player score
                    if let Some(player) = players.iter_mut().find(|p| p.user_id == user_id) {
                        player.score += score;
                    }

                    let total_score = session.final_score + score;
                    let correct_answer = word.translation.clone();
                    let mut updated: game_sessions::ActiveModel = session.clone().into();
                    if is_correct {
                        updated.correct_answers = Set(session.correct_answers + 1);
                    } else {
                        updated.wrong_answers = Set(session.wrong_answers + 1);
                    }
                    updated.final_score = Set(total_score);
                    updated.players_data = Set(Some(
                        serde_json::to_string(&players).map_err(EngineError::internal)?,
                    ));
                    updated.updated_at = Set(Utc::now());
                    updated.update(txn).await.map_err(EngineError::internal)?;

                    Ok(AnswerOutcome {
                        is_correct,
                        score,
                        correct_answer,
                        total_score,
                    })
                })
            })
            .await
            .map_err(unwrap_txn_err)
    }

    /// Owner-only. Seals the session with its final summary and folds the
    /// outcome into the owner's aggregate stats. The win verdict follows
    /// the game's configured policy: vocabulary-style games opt into the
    /// accuracy threshold via `rules_config`, everything else counts a
    /// simple correctness majority.
    pub async fn finish_session(
        &self,
        code: &str,
        requester_id: i32,
    ) -> Result<FinishSessionResponse, EngineError> {
        let code = code.to_string();
        let accuracy_win_threshold = self.accuracy_win_threshold;
        self.db
            .transaction::<_, FinishSessionResponse, EngineError>(move |txn| {
                Box::pin(async move {
                    let session = find_session(txn, &code).await?;
                    if session.user_id != requester_id {
                        return Err(EngineError::Forbidden("only the owner can finish"));
                    }
                    if session.status() != SessionStatus::Playing {
                        return Err(EngineError::InvalidState("session is not in play"));
                    }

                    let game = Games::find_by_id(session.game_id)
                        .one(txn)
                        .await
                        .map_err(EngineError::internal)?
                        .ok_or(EngineError::NotFound("game"))?;
                    let rules = game.rules().map_err(EngineError::internal)?;
                    let win_policy = match rules.get("win_policy").and_then(|v| v.as_str()) {
                        Some("accuracy") => WinPolicy::AccuracyThreshold(accuracy_win_threshold),
                        _ => WinPolicy::Classic,
                    };

                    let now = Utc::now();
                    let time_used = session
                        .started_at
                        .map(|started| (now - started).num_seconds().max(0) as i32)
                        .unwrap_or(0);

                    let players = session.players().map_err(EngineError::internal)?;
                    let result = GameResult {
                        final_score: session.final_score,
                        correct_answers: session.correct_answers,
                        wrong_answers: session.wrong_answers,
                        total_questions: session.correct_answers + session.wrong_answers,
                        accuracy: accuracy(session.correct_answers, session.wrong_answers),
                        time_used,
                        completed_at: now.to_rfc3339(),
                        players,
                    };

                    let won = win_policy.is_win(session.correct_answers, session.wrong_answers);
                    apply_completion_delta(
                        txn,
                        session.user_id,
                        CompletionDelta {
                            score: session.final_score,
                            won,
                            counts_game: true,
                        },
                    )
                    .await
                    .map_err(EngineError::internal)?;

                    let mut updated: game_sessions::ActiveModel = session.into();
                    updated.game_result = Set(Some(
                        serde_json::to_string(&result).map_err(EngineError::internal)?,
                    ));
                    updated.status = Set(SessionStatus::Finished.as_str().to_string());
                    updated.time_used = Set(time_used);
                    updated.finished_at = Set(Some(now));
                    updated.updated_at = Set(now);
                    updated.update(txn).await.map_err(EngineError::internal)?;

                    Ok(FinishSessionResponse { result })
                })
            })
            .await
            .map_err(unwrap_txn_err)
    }

    pub async fn get_session(&self, code: &str) -> Result<SessionView, EngineError> {
        let session = find_session(&self.db, code).await?;
        let game_name = Games::find_by_id(session.game_id)
            .one(&self.db)
            .await
            .map_err(EngineError::internal)?
            .map(|game| game.name);

        let players = session.players().map_err(EngineError::internal)?;
        // The word set stays hidden outside of active play
        let session_words = if session.status() == SessionStatus::Playing {
            Some(session.words().map_err(EngineError::internal)?)
        } else {
            None
        };

        Ok(SessionView {
            session: session.to_session(game_name),
            players,
            words: session_words,
        })
    }

    pub async fn my_sessions(
        &self,
        user_id: i32,
        page: u64,
        per_page: u64,
    ) -> Result<SessionsPage, EngineError> {
        let page = page.max(1);
        let per_page = per_page.clamp(1, 100);

        let paginator = GameSessions::find()
            .filter(game_sessions::Column::UserId.eq(user_id))
            .order_by_desc(game_sessions::Column::CreatedAt)
            .paginate(&self.db, per_page);
        let counts = paginator
            .num_items_and_pages()
            .await
            .map_err(EngineError::internal)?;
        let models = paginator
            .fetch_page(page - 1)
            .await
            .map_err(EngineError::internal)?;

        let game_ids: Vec<i32> = models.iter().map(|model| model.game_id).collect();
        let game_names: HashMap<i32, String> = Games::find()
            .filter(games::Column::Id.is_in(game_ids))
            .all(&self.db)
            .await
            .map_err(EngineError::internal)?
            .into_iter()
            .map(|game| (game.id, game.name))
            .collect();

        let sessions = models
            .iter()
            .map(|model| model.to_session(game_names.get(&model.game_id).cloned()))
            .collect();

        Ok(SessionsPage {
            sessions,
            pagination: Pagination {
                page,
                per_page,
                total: counts.number_of_items,
                pages: counts.number_of_pages,
            },
        })
    }
}

async fn find_session<C: sea_orm::ConnectionTrait>(
    db: &C,
    code: &str,
) -> Result<game_sessions::Model, EngineError> {
    GameSessions::find()
        .filter(game_sessions::Column::SessionCode.eq(code))
        .one(db)
        .await
        .map_err(EngineError::internal)?
        .ok_or(EngineError::NotFound("session"))
}
