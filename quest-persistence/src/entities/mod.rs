pub mod game_histories;
pub mod game_sessions;
pub mod games;
pub mod level_records;
pub mod levels;
pub mod users;
pub mod words;

pub mod prelude {
    pub use super::game_histories::Entity as GameHistories;
    pub use super::game_sessions::Entity as GameSessions;
    pub use super::games::Entity as Games;
    pub use super::level_records::Entity as LevelRecords;
    pub use super::levels::Entity as Levels;
    pub use super::users::Entity as Users;
    pub use super::words::Entity as Words;
}
