use sea_orm::entity::prelude::*;

use quest_types::User;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub nickname: Option<String>,
    pub avatar_url: Option<String>,
    pub total_games: i32,
    pub total_wins: i32,
    pub best_score: i32,
    pub total_score: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn win_rate(&self) -> f64 {
        if self.total_games == 0 {
            return 0.0;
        }
        (self.total_wins as f64 / self.total_games as f64 * 100.0 * 100.0).round() / 100.0
    }

    pub fn average_score(&self) -> f64 {
        if self.total_games == 0 {
            return 0.0;
        }
        (self.total_score as f64 / self.total_games as f64 * 100.0).round() / 100.0
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            nickname: self.nickname.clone(),
            avatar_url: self.avatar_url.clone(),
            total_games: self.total_games,
            total_wins: self.total_wins,
            best_score: self.best_score,
            total_score: self.total_score,
            win_rate: self.win_rate(),
            average_score: self.average_score(),
            created_at: self.created_at.to_rfc3339(),
        }
    }
}
