use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{condition, validation};

pub const TITLE_MAX: usize = 160;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "app_topics")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub summary: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Condition }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Condition => Entity::has_many(condition::Entity).into() }
    }
}

impl Related<condition::Entity> for Entity {
    fn to() -> RelationDef { Relation::Condition.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_title(title: &str) -> Result<(), String> {
    validation::required_text(title, TITLE_MAX)
}
