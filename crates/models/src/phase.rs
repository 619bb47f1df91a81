use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{condition, validation};

pub const TITLE_MAX: usize = 160;
/// Generous ceiling so a runaway payload cannot be stored as step text.
pub const DETAILS_MAX: usize = 20_000;

/// A step of a condition. `position` is stored as given; it is neither unique
/// nor contiguous within a condition.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "app_phases")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub position: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub details: String,
    pub condition_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Condition }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Condition => Entity::belongs_to(condition::Entity)
                .from(Column::ConditionId)
                .to(condition::Column::Id)
                .into(),
        }
    }
}

impl Related<condition::Entity> for Entity {
    fn to() -> RelationDef { Relation::Condition.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_title(title: &str) -> Result<(), String> {
    validation::required_text(title, TITLE_MAX)
}

pub fn validate_details(details: &str) -> Result<(), String> {
    validation::required_text(details, DETAILS_MAX)
}
