use anyhow::Result;
use sea_orm::{
    ActiveValue, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

use crate::entities::{prelude::*, users};
use quest_types::{LeaderboardEntry, User};

pub struct UserRepository {
    db: DatabaseConnection,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub nickname: Option<String>,
    pub avatar_url: Option<String>,
}

/// Aggregate-stat change applied when a session or level attempt
/// completes. Both engines go through [`apply_completion_delta`] so the
/// counter discipline cannot drift between them: level completions carry
/// `counts_game: false` (score counters only), session finishes carry
/// `counts_game: true` plus the mode's win verdict.
#[derive(Debug, Clone, Copy)]
pub struct CompletionDelta {
    pub score: i32,
    pub won: bool,
    pub counts_game: bool,
}

/// Single write path for the per-user aggregate counters. Must run on the
/// caller's transaction so the update commits or rolls back with the rest
/// of the completion.
pub async fn apply_completion_delta<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    delta: CompletionDelta,
) -> Result<(), DbErr> {
    let user = Users::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("user {user_id}")))?;

    let mut updated = users::ActiveModel {
        id: ActiveValue::Unchanged(user.id),
        total_score: ActiveValue::Set(user.total_score + delta.score),
        updated_at: ActiveValue::Set(chrono::Utc::now()),
        ..Default::default()
    };

    // best_score is a high-water mark; strict > so ties keep the old row
    if delta.score > user.best_score {
        updated.best_score = ActiveValue::Set(delta.score);
    }
    if delta.counts_game {
        updated.total_games = ActiveValue::Set(user.total_games + 1);
    }
    if delta.won {
        updated.total_wins = ActiveValue::Set(user.total_wins + 1);
    }

    Users::update(updated).exec(db).await?;
    Ok(())
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<User>> {
        let user_model = Users::find_by_id(id).one(&self.db).await?;
        Ok(user_model.map(|model| model.to_user()))
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user_model = Users::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await?;

        Ok(user_model.map(|model| model.to_user()))
    }

    pub async fn create_user(&self, new_user: NewUser) -> Result<User> {
        let now = chrono::Utc::now();

        let user_model = users::ActiveModel {
            username: ActiveValue::Set(new_user.username),
            email: ActiveValue::Set(new_user.email),
            password_hash: ActiveValue::Set(new_user.password_hash),
            nickname: ActiveValue::Set(new_user.nickname),
            avatar_url: ActiveValue::Set(new_user.avatar_url),
            total_games: ActiveValue::Set(0),
            total_wins: ActiveValue::Set(0),
            best_score: ActiveValue::Set(0),
            total_score: ActiveValue::Set(0),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        };

        let saved_model = Users::insert(user_model).exec(&self.db).await?;

        let created_user = Users::find_by_id(saved_model.last_insert_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to retrieve created user"))?;

        Ok(created_user.to_user())
    }

    pub async fn get_leaderboard(&self, limit: u64) -> Result<Vec<LeaderboardEntry>> {
        let users = Users::find()
            .order_by_desc(users::Column::TotalScore)
            .limit(limit)
            .all(&self.db)
            .await?;

        let leaderboard = users
            .into_iter()
            .enumerate()
            .map(|(index, model)| LeaderboardEntry {
                user: model.to_user(),
                rank: (index + 1) as u32,
            })
            .collect();

        Ok(leaderboard)
    }

    pub async fn get_user_rank(&self, user_id: i32) -> Result<Option<u32>> {
        let user = Users::find_by_id(user_id).one(&self.db).await?;

        if let Some(user_model) = user {
            let users_above = Users::find()
                .filter(users::Column::TotalScore.gt(user_model.total_score))
                .count(&self.db)
                .await?;

            Ok(Some(users_above as u32 + 1))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::connect_to_memory_database;
    use migration::{Migrator, MigratorTrait};

    async fn setup_test_db() -> UserRepository {
        let db = connect_to_memory_database().await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        UserRepository::new(db)
    }

    fn test_user(name: &str) -> NewUser {
        NewUser {
            username: name.to_string(),
            email: format!("{name}@example.com"),
            password_hash: "hash".to_string(),
            nickname: None,
            avatar_url: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let repo = setup_test_db().await;

        let created = repo.create_user(test_user("alice")).await.unwrap();
        assert_eq!(created.username, "alice");
        assert_eq!(created.total_games, 0);
        assert_eq!(created.win_rate, 0.0);

        let found = repo.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found.email, "alice@example.com");

        let by_name = repo.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(by_name.id, created.id);

        assert!(repo.find_by_username("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_session_delta_counts_game_and_win() {
        let repo = setup_test_db().await;
        let user = repo.create_user(test_user("bob")).await.unwrap();

        apply_completion_delta(
            &repo.db,
            user.id,
            CompletionDelta {
                score: 120,
                won: true,
                counts_game: true,
            },
        )
        .await
        .unwrap();

        let updated = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(updated.total_games, 1);
        assert_eq!(updated.total_wins, 1);
        assert_eq!(updated.total_score, 120);
        assert_eq!(updated.best_score, 120);
    }

    #[tokio::test]
    async fn test_level_delta_leaves_game_counters_alone() {
        let repo = setup_test_db().await;
        let user = repo.create_user(test_user("carol")).await.unwrap();

        for score in [300, 200] {
            apply_completion_delta(
                &repo.db,
                user.id,
                CompletionDelta {
                    score,
                    won: false,
                    counts_game: false,
                },
            )
            .await
            .unwrap();
        }

        let updated = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(updated.total_games, 0);
        assert_eq!(updated.total_wins, 0);
        assert_eq!(updated.total_score, 500);
        // best_score never regresses on the lower second score
        assert_eq!(updated.best_score, 300);
    }

    #[tokio::test]
    async fn test_leaderboard_orders_by_total_score() {
        let repo = setup_test_db().await;

        for (name, score) in [("one", 100), ("two", 200), ("three", 50)] {
            let user = repo.create_user(test_user(name)).await.unwrap();
            apply_completion_delta(
                &repo.db,
                user.id,
                CompletionDelta {
                    score,
                    won: false,
                    counts_game: true,
                },
            )
            .await
            .unwrap();
        }

        let leaderboard = repo.get_leaderboard(10).await.unwrap();
        assert_eq!(leaderboard.len(), 3);
        assert_eq!(leaderboard[0].user.username, "two");
        assert_eq!(leaderboard[0].rank, 1);
        assert_eq!(leaderboard[2].user.total_score, 50);
        assert_eq!(leaderboard[2].rank, 3);

        let top_two = repo.get_leaderboard(2).await.unwrap();
        assert_eq!(top_two.len(), 2);
    }

    #[tokio::test]
    async fn test_user_rank() {
        let repo = setup_test_db().await;

        let first = repo.create_user(test_user("first")).await.unwrap();
        let second = repo.create_user(test_user("second")).await.unwrap();

        apply_completion_delta(
            &repo.db,
            first.id,
            CompletionDelta {
                score: 100,
                won: false,
                counts_game: true,
            },
        )
        .await
        .unwrap();
        apply_completion_delta(
            &repo.db,
            second.id,
            CompletionDelta {
                score: 200,
                won: false,
                counts_game: true,
            },
        )
        .await
        .unwrap();

        assert_eq!(repo.get_user_rank(second.id).await.unwrap(), Some(1));
        assert_eq!(repo.get_user_rank(first.id).await.unwrap(), Some(2));
        assert_eq!(repo.get_user_rank(9999).await.unwrap(), None);
    }
}
