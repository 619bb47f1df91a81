use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{condition_indicator, group, indicator, phase, topic, validation};

pub const NAME_MAX: usize = 160;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "app_conditions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub overview: Option<String>,
    pub topic_id: i32,
    pub group_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Topic, Group, Phase, ConditionIndicator }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Topic => Entity::belongs_to(topic::Entity).from(Column::TopicId).to(topic::Column::Id).into(),
            Relation::Group => Entity::belongs_to(group::Entity).from(Column::GroupId).to(group::Column::Id).into(),
            Relation::Phase => Entity::has_many(phase::Entity).into(),
            Relation::ConditionIndicator => Entity::has_many(condition_indicator::Entity).into(),
        }
    }
}

impl Related<topic::Entity> for Entity {
    fn to() -> RelationDef { Relation::Topic.def() }
}

impl Related<group::Entity> for Entity {
    fn to() -> RelationDef { Relation::Group.def() }
}

impl Related<phase::Entity> for Entity {
    fn to() -> RelationDef { Relation::Phase.def() }
}

impl Related<condition_indicator::Entity> for Entity {
    fn to() -> RelationDef { Relation::ConditionIndicator.def() }
}

impl Related<indicator::Entity> for Entity {
    fn to() -> RelationDef { condition_indicator::Relation::Indicator.def() }
    fn via() -> Option<RelationDef> { Some(condition_indicator::Relation::Condition.def().rev()) }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), String> {
    validation::required_text(name, NAME_MAX)
}
