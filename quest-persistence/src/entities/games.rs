use sea_orm::entity::prelude::*;

use quest_types::Game;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "games")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub max_players: i32,
    pub time_limit: i32,
    pub word_count: i32,
    pub difficulty_level: i32,
    pub rules_config: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Free-form rules object; opaque to the engines.
    pub fn rules(&self) -> Result<serde_json::Value, serde_json::Error> {
        match &self.rules_config {
            Some(raw) => serde_json::from_str(raw),
            None => Ok(serde_json::Value::Object(Default::default())),
        }
    }

    pub fn to_game(&self) -> Result<Game, serde_json::Error> {
        Ok(Game {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            max_players: self.max_players,
            time_limit: self.time_limit,
            word_count: self.word_count,
            difficulty_level: self.difficulty_level,
            rules_config: self.rules()?,
            is_active: self.is_active,
        })
    }
}
