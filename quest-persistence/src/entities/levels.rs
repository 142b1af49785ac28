use sea_orm::entity::prelude::*;

use quest_types::{Level, TaskSpec};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "levels")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub difficulty: String,
    pub estimated_time_minutes: i32,
    pub max_score: i32,
    pub tasks_config: Option<String>,
    pub unlock_level_id: Option<i32>,
    pub unlock_stars_required: i32,
    pub reward_coins: i32,
    pub reward_exp: i32,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Decode the configured task list. An absent column means no tasks.
    pub fn tasks(&self) -> Result<Vec<TaskSpec>, serde_json::Error> {
        match &self.tasks_config {
            Some(raw) => serde_json::from_str(raw),
            None => Ok(Vec::new()),
        }
    }

    pub fn to_level(&self) -> Result<Level, serde_json::Error> {
        Ok(Level {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            difficulty: self.difficulty.clone(),
            estimated_time_minutes: self.estimated_time_minutes,
            max_score: self.max_score,
            tasks_config: self.tasks()?,
            unlock_level_id: self.unlock_level_id,
            unlock_stars_required: self.unlock_stars_required,
            reward_coins: self.reward_coins,
            reward_exp: self.reward_exp,
            is_active: self.is_active,
            sort_order: self.sort_order,
        })
    }
}
