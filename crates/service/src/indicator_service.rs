use models::{condition, condition_indicator, errors::FieldErrors, indicator};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Set, TransactionTrait,
};
use sea_orm::sea_query::JoinType;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::errors::ServiceError;
use crate::expand::Expansion;
use crate::input::double_option;
use crate::pagination::{apply_sort, fetch_page, ListOptions, Page};

pub const EXPANSIONS: &[&str] = &["conditions"];
pub const SORT_FIELDS: &[(&str, indicator::Column)] =
    &[("id", indicator::Column::Id), ("label", indicator::Column::Label)];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewIndicator {
    pub label: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndicatorChanges {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct IndicatorFilter {
    /// Only indicators linked to this condition.
    pub condition_id: Option<i32>,
}

impl NewIndicator {
    pub fn validate(&self) -> Result<(), ServiceError> {
        let mut errs = FieldErrors::new();
        errs.check("label", indicator::validate_label(&self.label));
        Ok(errs.finish()?)
    }
}

impl IndicatorChanges {
    pub fn validate(&self) -> Result<(), ServiceError> {
        let mut errs = FieldErrors::new();
        if let Some(label) = &self.label {
            errs.check("label", indicator::validate_label(label));
        }
        Ok(errs.finish()?)
    }
}

impl From<NewIndicator> for IndicatorChanges {
    fn from(i: NewIndicator) -> Self { Self { label: Some(i.label), notes: Some(i.notes) } }
}

#[derive(Debug, Clone, Serialize)]
pub struct IndicatorDetail {
    #[serde(flatten)]
    pub indicator: indicator::Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<condition::Model>>,
}

#[instrument(skip(db, input), fields(label = %input.label))]
pub async fn create_indicator(db: &DatabaseConnection, input: NewIndicator) -> Result<indicator::Model, ServiceError> {
    input.validate()?;
    let created = indicator::ActiveModel { label: Set(input.label), notes: Set(input.notes), ..Default::default() }
        .insert(db)
        .await?;
    info!(id = created.id, "indicator_created");
    Ok(created)
}

pub async fn get_indicator(db: &DatabaseConnection, id: i32) -> Result<Option<indicator::Model>, ServiceError> {
    Ok(indicator::Entity::find_by_id(id).one(db).await?)
}

/// Conditions linked to an indicator, by id.
pub async fn conditions_of_indicator(db: &DatabaseConnection, indicator: &indicator::Model) -> Result<Vec<condition::Model>, ServiceError> {
    Ok(indicator.find_related(condition::Entity).order_by_asc(condition::Column::Id).all(db).await?)
}

pub async fn get_indicator_detail(db: &DatabaseConnection, id: i32, expand: &Expansion) -> Result<IndicatorDetail, ServiceError> {
    let indicator = get_indicator(db, id).await?.ok_or_else(|| ServiceError::not_found("indicator", id))?;
    let conditions = if expand.has("conditions") { Some(conditions_of_indicator(db, &indicator).await?) } else { None };
    Ok(IndicatorDetail { indicator, conditions })
}

pub async fn list_indicators(
    db: &DatabaseConnection,
    filter: IndicatorFilter,
    opts: &ListOptions,
) -> Result<Page<indicator::Model>, ServiceError> {
    let mut select = indicator::Entity::find();
    if let Some(condition_id) = filter.condition_id {
        select = select
            .join(JoinType::InnerJoin, indicator::Relation::ConditionIndicator.def())
            .filter(condition_indicator::Column::ConditionId.eq(condition_id));
    }
    let select = apply_sort(select, opts.sort.as_ref(), SORT_FIELDS, indicator::Column::Id)?;
    fetch_page(db, select, opts.pagination).await
}

#[instrument(skip(db, changes))]
pub async fn update_indicator(db: &DatabaseConnection, id: i32, changes: IndicatorChanges) -> Result<indicator::Model, ServiceError> {
    changes.validate()?;
    let txn = db.begin().await?;
    let existing =
        indicator::Entity::find_by_id(id).one(&txn).await?.ok_or_else(|| ServiceError::not_found("indicator", id))?;
    let mut am: indicator::ActiveModel = existing.clone().into();
    if let Some(label) = changes.label {
        am.label = Set(label);
    }
    if let Some(notes) = changes.notes {
        am.notes = Set(notes);
    }
    let updated = if am.is_changed() { am.update(&txn).await? } else { existing };
    txn.commit().await?;
    info!(id, "indicator_updated");
    Ok(updated)
}

pub async fn replace_indicator(db: &DatabaseConnection, id: i32, input: NewIndicator) -> Result<indicator::Model, ServiceError> {
    input.validate()?;
    update_indicator(db, id, input.into()).await
}

/// Delete an indicator and its links; linked conditions are kept.
#[instrument(skip(db))]
pub async fn delete_indicator(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
    let txn = db.begin().await?;
    if indicator::Entity::find_by_id(id).one(&txn).await?.is_none() {
        return Err(ServiceError::not_found("indicator", id));
    }
    let links = condition_indicator::Entity::delete_many()
        .filter(condition_indicator::Column::IndicatorId.eq(id))
        .exec(&txn)
        .await?;
    indicator::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;
    info!(id, links = links.rows_affected, "indicator_deleted");
    Ok(())
}
