use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{condition, condition_indicator, validation};

pub const LABEL_MAX: usize = 160;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "app_indicators")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub label: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { ConditionIndicator }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::ConditionIndicator => Entity::has_many(condition_indicator::Entity).into() }
    }
}

impl Related<condition_indicator::Entity> for Entity {
    fn to() -> RelationDef { Relation::ConditionIndicator.def() }
}

impl Related<condition::Entity> for Entity {
    fn to() -> RelationDef { condition_indicator::Relation::Condition.def() }
    fn via() -> Option<RelationDef> { Some(condition_indicator::Relation::Indicator.def().rev()) }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_label(label: &str) -> Result<(), String> {
    validation::required_text(label, LABEL_MAX)
}
