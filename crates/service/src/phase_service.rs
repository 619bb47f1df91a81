use models::{condition, errors::FieldErrors, phase};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::errors::ServiceError;
use crate::expand::Expansion;
use crate::input::double_option;
use crate::pagination::{apply_sort, fetch_page, ListOptions, Page};

pub const EXPANSIONS: &[&str] = &["condition"];
pub const SORT_FIELDS: &[(&str, phase::Column)] = &[
    ("id", phase::Column::Id),
    ("position", phase::Column::Position),
    ("title", phase::Column::Title),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPhase {
    pub position: i32,
    pub title: String,
    pub details: String,
    #[serde(default)]
    pub condition_id: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhaseChanges {
    #[serde(default)]
    pub position: Option<i32>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub condition_id: Option<Option<i32>>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PhaseFilter {
    pub condition_id: Option<i32>,
}

impl NewPhase {
    pub fn validate(&self) -> Result<(), ServiceError> {
        let mut errs = FieldErrors::new();
        errs.check("title", phase::validate_title(&self.title));
        errs.check("details", phase::validate_details(&self.details));
        Ok(errs.finish()?)
    }
}

impl PhaseChanges {
    pub fn validate(&self) -> Result<(), ServiceError> {
        let mut errs = FieldErrors::new();
        if let Some(title) = &self.title {
            errs.check("title", phase::validate_title(title));
        }
        if let Some(details) = &self.details {
            errs.check("details", phase::validate_details(details));
        }
        Ok(errs.finish()?)
    }
}

impl From<NewPhase> for PhaseChanges {
    fn from(p: NewPhase) -> Self {
        Self { position: Some(p.position), title: Some(p.title), details: Some(p.details), condition_id: Some(p.condition_id) }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PhaseDetail {
    #[serde(flatten)]
    pub phase: phase::Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Option<condition::Model>>,
}

async fn ensure_condition<C: ConnectionTrait>(conn: &C, condition_id: Option<i32>) -> Result<(), ServiceError> {
    if let Some(id) = condition_id {
        if condition::Entity::find_by_id(id).one(conn).await?.is_none() {
            return Err(ServiceError::missing_reference("condition_id", "condition", id));
        }
    }
    Ok(())
}

#[instrument(skip(db, input), fields(position = input.position, condition_id = ?input.condition_id))]
pub async fn create_phase(db: &DatabaseConnection, input: NewPhase) -> Result<phase::Model, ServiceError> {
    input.validate()?;
    let txn = db.begin().await?;
    ensure_condition(&txn, input.condition_id).await?;
    let created = phase::ActiveModel {
        position: Set(input.position),
        title: Set(input.title),
        details: Set(input.details),
        condition_id: Set(input.condition_id),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;
    info!(id = created.id, "phase_created");
    Ok(created)
}

pub async fn get_phase(db: &DatabaseConnection, id: i32) -> Result<Option<phase::Model>, ServiceError> {
    Ok(phase::Entity::find_by_id(id).one(db).await?)
}

pub async fn get_phase_detail(db: &DatabaseConnection, id: i32, expand: &Expansion) -> Result<PhaseDetail, ServiceError> {
    let phase = get_phase(db, id).await?.ok_or_else(|| ServiceError::not_found("phase", id))?;
    let condition = if expand.has("condition") { Some(phase.find_related(condition::Entity).one(db).await?) } else { None };
    Ok(PhaseDetail { phase, condition })
}

pub async fn list_phases(db: &DatabaseConnection, filter: PhaseFilter, opts: &ListOptions) -> Result<Page<phase::Model>, ServiceError> {
    let mut select = phase::Entity::find();
    if let Some(condition_id) = filter.condition_id {
        select = select.filter(phase::Column::ConditionId.eq(condition_id));
    }
    let select = apply_sort(select, opts.sort.as_ref(), SORT_FIELDS, phase::Column::Id)?;
    fetch_page(db, select, opts.pagination).await
}

#[instrument(skip(db, changes))]
pub async fn update_phase(db: &DatabaseConnection, id: i32, changes: PhaseChanges) -> Result<phase::Model, ServiceError> {
    changes.validate()?;
    let txn = db.begin().await?;
    let existing = phase::Entity::find_by_id(id).one(&txn).await?.ok_or_else(|| ServiceError::not_found("phase", id))?;
    let mut am: phase::ActiveModel = existing.clone().into();
    if let Some(position) = changes.position {
        am.position = Set(position);
    }
    if let Some(title) = changes.title {
        am.title = Set(title);
    }
    if let Some(details) = changes.details {
        am.details = Set(details);
    }
    if let Some(condition_id) = changes.condition_id {
        ensure_condition(&txn, condition_id).await?;
        am.condition_id = Set(condition_id);
    }
    let updated = if am.is_changed() { am.update(&txn).await? } else { existing };
    txn.commit().await?;
    info!(id, "phase_updated");
    Ok(updated)
}

pub async fn replace_phase(db: &DatabaseConnection, id: i32, input: NewPhase) -> Result<phase::Model, ServiceError> {
    input.validate()?;
    update_phase(db, id, input.into()).await
}

#[instrument(skip(db))]
pub async fn delete_phase(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
    let res = phase::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("phase", id));
    }
    info!(id, "phase_deleted");
    Ok(())
}
