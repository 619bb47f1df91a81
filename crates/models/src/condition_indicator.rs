//! Pure link between conditions and indicators; the pair is the key.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{condition, indicator};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "app_condition_indicator")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub condition_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub indicator_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Condition, Indicator }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Condition => Entity::belongs_to(condition::Entity)
                .from(Column::ConditionId)
                .to(condition::Column::Id)
                .into(),
            Relation::Indicator => Entity::belongs_to(indicator::Entity)
                .from(Column::IndicatorId)
                .to(indicator::Column::Id)
                .into(),
        }
    }
}

impl Related<condition::Entity> for Entity {
    fn to() -> RelationDef { Relation::Condition.def() }
}

impl Related<indicator::Entity> for Entity {
    fn to() -> RelationDef { Relation::Indicator.def() }
}

impl ActiveModelBehavior for ActiveModel {}
