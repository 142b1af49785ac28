use sea_orm::entity::prelude::*;

use quest_types::SessionWord;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "words")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub word: String,
    pub translation: String,
    pub pronunciation: Option<String>,
    pub difficulty_level: i32,
    pub example_sentence: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Snapshot shape stored inside a session's `words_data`.
    pub fn to_session_word(&self) -> SessionWord {
        SessionWord {
            id: self.id,
            word: self.word.clone(),
            translation: self.translation.clone(),
            pronunciation: self.pronunciation.clone(),
            difficulty_level: self.difficulty_level,
        }
    }
}
