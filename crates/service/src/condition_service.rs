//! Conditions: CRUD, indicator links and relationship expansion.
//!
//! A condition always belongs to one topic and optionally to one group. Its
//! phases and indicator links are removed with it.

use std::collections::BTreeSet;

use models::{condition, condition_indicator, errors::FieldErrors, group, indicator, phase, topic};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::errors::ServiceError;
use crate::expand::Expansion;
use crate::input::double_option;
use crate::pagination::{apply_sort, fetch_page, ListOptions, Page};

pub const EXPANSIONS: &[&str] = &["phases", "indicators", "topic", "group"];
pub const SORT_FIELDS: &[(&str, condition::Column)] = &[
    ("id", condition::Column::Id),
    ("name", condition::Column::Name),
    ("topic_id", condition::Column::TopicId),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCondition {
    pub name: String,
    #[serde(default)]
    pub overview: Option<String>,
    pub topic_id: i32,
    #[serde(default)]
    pub group_id: Option<i32>,
    /// When present, the exact set of indicators linked to the condition.
    #[serde(default)]
    pub indicator_ids: Option<Vec<i32>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConditionChanges {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub overview: Option<Option<String>>,
    #[serde(default)]
    pub topic_id: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    pub group_id: Option<Option<i32>>,
    #[serde(default)]
    pub indicator_ids: Option<Vec<i32>>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ConditionFilter {
    pub topic_id: Option<i32>,
    pub group_id: Option<i32>,
}

impl NewCondition {
    pub fn validate(&self) -> Result<(), ServiceError> {
        let mut errs = FieldErrors::new();
        errs.check("name", condition::validate_name(&self.name));
        Ok(errs.finish()?)
    }
}

impl ConditionChanges {
    pub fn validate(&self) -> Result<(), ServiceError> {
        let mut errs = FieldErrors::new();
        if let Some(name) = &self.name {
            errs.check("name", condition::validate_name(name));
        }
        Ok(errs.finish()?)
    }
}

impl From<NewCondition> for ConditionChanges {
    fn from(c: NewCondition) -> Self {
        Self {
            name: Some(c.name),
            overview: Some(c.overview),
            topic_id: Some(c.topic_id),
            group_id: Some(c.group_id),
            indicator_ids: c.indicator_ids,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConditionDetail {
    #[serde(flatten)]
    pub condition: condition::Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phases: Option<Vec<phase::Model>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indicators: Option<Vec<indicator::Model>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<topic::Model>,
    /// `Some(None)` when expanded on a condition without a group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<Option<group::Model>>,
}

async fn ensure_topic<C: ConnectionTrait>(conn: &C, topic_id: i32) -> Result<(), ServiceError> {
    if topic::Entity::find_by_id(topic_id).one(conn).await?.is_none() {
        return Err(ServiceError::missing_reference("topic_id", "topic", topic_id));
    }
    Ok(())
}

async fn ensure_group<C: ConnectionTrait>(conn: &C, group_id: Option<i32>) -> Result<(), ServiceError> {
    if let Some(id) = group_id {
        if group::Entity::find_by_id(id).one(conn).await?.is_none() {
            return Err(ServiceError::missing_reference("group_id", "group", id));
        }
    }
    Ok(())
}

/// Replace the condition's links with exactly `indicator_ids`.
async fn set_links<C: ConnectionTrait>(conn: &C, condition_id: i32, indicator_ids: &[i32]) -> Result<(), ServiceError> {
    let wanted: BTreeSet<i32> = indicator_ids.iter().copied().collect();
    for &id in &wanted {
        if indicator::Entity::find_by_id(id).one(conn).await?.is_none() {
            return Err(ServiceError::missing_reference("indicator_ids", "indicator", id));
        }
    }
    condition_indicator::Entity::delete_many()
        .filter(condition_indicator::Column::ConditionId.eq(condition_id))
        .exec(conn)
        .await?;
    if wanted.is_empty() {
        return Ok(());
    }
    let rows = wanted.into_iter().map(|indicator_id| condition_indicator::ActiveModel {
        condition_id: Set(condition_id),
        indicator_id: Set(indicator_id),
    });
    condition_indicator::Entity::insert_many(rows).exec_without_returning(conn).await?;
    Ok(())
}

#[instrument(skip(db, input), fields(name = %input.name, topic_id = input.topic_id))]
pub async fn create_condition(db: &DatabaseConnection, input: NewCondition) -> Result<condition::Model, ServiceError> {
    input.validate()?;
    let txn = db.begin().await?;
    ensure_topic(&txn, input.topic_id).await?;
    ensure_group(&txn, input.group_id).await?;
    let created = condition::ActiveModel {
        name: Set(input.name),
        overview: Set(input.overview),
        topic_id: Set(input.topic_id),
        group_id: Set(input.group_id),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    if let Some(ids) = &input.indicator_ids {
        set_links(&txn, created.id, ids).await?;
    }
    txn.commit().await?;
    info!(id = created.id, "condition_created");
    Ok(created)
}

pub async fn get_condition(db: &DatabaseConnection, id: i32) -> Result<Option<condition::Model>, ServiceError> {
    Ok(condition::Entity::find_by_id(id).one(db).await?)
}

/// Phases of a condition in display order.
pub async fn phases_of_condition(db: &DatabaseConnection, condition_id: i32) -> Result<Vec<phase::Model>, ServiceError> {
    Ok(phase::Entity::find()
        .filter(phase::Column::ConditionId.eq(condition_id))
        .order_by_asc(phase::Column::Position)
        .order_by_asc(phase::Column::Id)
        .all(db)
        .await?)
}

pub async fn indicators_of_condition(db: &DatabaseConnection, condition: &condition::Model) -> Result<Vec<indicator::Model>, ServiceError> {
    Ok(condition.find_related(indicator::Entity).order_by_asc(indicator::Column::Id).all(db).await?)
}

pub async fn get_condition_detail(db: &DatabaseConnection, id: i32, expand: &Expansion) -> Result<ConditionDetail, ServiceError> {
    let condition = get_condition(db, id).await?.ok_or_else(|| ServiceError::not_found("condition", id))?;
    let phases = if expand.has("phases") { Some(phases_of_condition(db, id).await?) } else { None };
    let indicators = if expand.has("indicators") { Some(indicators_of_condition(db, &condition).await?) } else { None };
    let topic = if expand.has("topic") { condition.find_related(topic::Entity).one(db).await? } else { None };
    let group = if expand.has("group") { Some(condition.find_related(group::Entity).one(db).await?) } else { None };
    Ok(ConditionDetail { condition, phases, indicators, topic, group })
}

pub async fn list_conditions(
    db: &DatabaseConnection,
    filter: ConditionFilter,
    opts: &ListOptions,
) -> Result<Page<condition::Model>, ServiceError> {
    let mut select = condition::Entity::find();
    if let Some(topic_id) = filter.topic_id {
        select = select.filter(condition::Column::TopicId.eq(topic_id));
    }
    if let Some(group_id) = filter.group_id {
        select = select.filter(condition::Column::GroupId.eq(group_id));
    }
    let select = apply_sort(select, opts.sort.as_ref(), SORT_FIELDS, condition::Column::Id)?;
    fetch_page(db, select, opts.pagination).await
}

#[instrument(skip(db, changes))]
pub async fn update_condition(db: &DatabaseConnection, id: i32, changes: ConditionChanges) -> Result<condition::Model, ServiceError> {
    changes.validate()?;
    let txn = db.begin().await?;
    let existing =
        condition::Entity::find_by_id(id).one(&txn).await?.ok_or_else(|| ServiceError::not_found("condition", id))?;
    let mut am: condition::ActiveModel = existing.clone().into();
    if let Some(name) = changes.name {
        am.name = Set(name);
    }
    if let Some(overview) = changes.overview {
        am.overview = Set(overview);
    }
    if let Some(topic_id) = changes.topic_id {
        ensure_topic(&txn, topic_id).await?;
        am.topic_id = Set(topic_id);
    }
    if let Some(group_id) = changes.group_id {
        ensure_group(&txn, group_id).await?;
        am.group_id = Set(group_id);
    }
    let updated = if am.is_changed() { am.update(&txn).await? } else { existing };
    if let Some(ids) = &changes.indicator_ids {
        set_links(&txn, id, ids).await?;
    }
    txn.commit().await?;
    info!(id, "condition_updated");
    Ok(updated)
}

pub async fn replace_condition(db: &DatabaseConnection, id: i32, input: NewCondition) -> Result<condition::Model, ServiceError> {
    input.validate()?;
    update_condition(db, id, input.into()).await
}

/// Delete a condition together with its phases and indicator links.
#[instrument(skip(db))]
pub async fn delete_condition(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
    let txn = db.begin().await?;
    if condition::Entity::find_by_id(id).one(&txn).await?.is_none() {
        return Err(ServiceError::not_found("condition", id));
    }
    let phases = phase::Entity::delete_many().filter(phase::Column::ConditionId.eq(id)).exec(&txn).await?;
    let links = condition_indicator::Entity::delete_many()
        .filter(condition_indicator::Column::ConditionId.eq(id))
        .exec(&txn)
        .await?;
    condition::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;
    info!(id, phases = phases.rows_affected, links = links.rows_affected, "condition_deleted");
    Ok(())
}

/// Link an indicator to a condition. Linking an existing pair is a no-op.
#[instrument(skip(db))]
pub async fn link_indicator(db: &DatabaseConnection, condition_id: i32, indicator_id: i32) -> Result<(), ServiceError> {
    let txn = db.begin().await?;
    if condition::Entity::find_by_id(condition_id).one(&txn).await?.is_none() {
        return Err(ServiceError::not_found("condition", condition_id));
    }
    if indicator::Entity::find_by_id(indicator_id).one(&txn).await?.is_none() {
        return Err(ServiceError::missing_reference("indicator_id", "indicator", indicator_id));
    }
    let exists = condition_indicator::Entity::find_by_id((condition_id, indicator_id)).count(&txn).await? > 0;
    if !exists {
        condition_indicator::ActiveModel { condition_id: Set(condition_id), indicator_id: Set(indicator_id) }
            .insert(&txn)
            .await?;
        info!(condition_id, indicator_id, "indicator_linked");
    }
    txn.commit().await?;
    Ok(())
}

#[instrument(skip(db))]
pub async fn unlink_indicator(db: &DatabaseConnection, condition_id: i32, indicator_id: i32) -> Result<(), ServiceError> {
    let res = condition_indicator::Entity::delete_by_id((condition_id, indicator_id)).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::NotFound(format!("condition {condition_id} is not linked to indicator {indicator_id}")));
    }
    info!(condition_id, indicator_id, "indicator_unlinked");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group_service::{create_group, NewGroup};
    use crate::indicator_service::{create_indicator, NewIndicator};
    use crate::phase_service::{create_phase, get_phase, NewPhase};
    use crate::topic_service::{create_topic, NewTopic};
    use crate::test_support::get_db;

    async fn topic(db: &DatabaseConnection, title: &str) -> anyhow::Result<topic::Model> {
        Ok(create_topic(db, NewTopic { title: title.into(), summary: None }).await?)
    }

    async fn indicator(db: &DatabaseConnection, label: &str) -> anyhow::Result<indicator::Model> {
        Ok(create_indicator(db, NewIndicator { label: label.into(), notes: None }).await?)
    }

    fn new_condition(name: &str, topic_id: i32) -> NewCondition {
        NewCondition { name: name.into(), overview: None, topic_id, group_id: None, indicator_ids: None }
    }

    #[tokio::test]
    async fn create_round_trips_fields() -> anyhow::Result<()> {
        let db = get_db().await?;
        let t = topic(&db, "Mood Disorders").await?;
        let g = create_group(&db, NewGroup { label: "Chronic".into(), description: None }).await?;
        let input = NewCondition {
            name: "Persistent Low Mood".into(),
            overview: Some("  spaced  ".into()),
            topic_id: t.id,
            group_id: Some(g.id),
            indicator_ids: None,
        };
        let created = create_condition(&db, input.clone()).await?;
        let fetched = get_condition(&db, created.id).await?.unwrap();
        assert_eq!(fetched.name, input.name);
        assert_eq!(fetched.overview, input.overview);
        assert_eq!(fetched.topic_id, t.id);
        assert_eq!(fetched.group_id, Some(g.id));
        Ok(())
    }

    #[tokio::test]
    async fn unknown_topic_is_a_foreign_key_violation() -> anyhow::Result<()> {
        let db = get_db().await?;
        match create_condition(&db, new_condition("X", 999)).await {
            Err(ServiceError::ForeignKeyViolation { fields, .. }) => assert!(fields.get("topic_id").is_some()),
            other => panic!("unexpected {other:?}"),
        }
        let t = topic(&db, "Mood Disorders").await?;
        let mut input = new_condition("X", t.id);
        input.group_id = Some(5);
        assert!(matches!(create_condition(&db, input).await, Err(ServiceError::ForeignKeyViolation { .. })));
        assert_eq!(list_conditions(&db, ConditionFilter::default(), &ListOptions::default()).await?.meta.total, 0);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_indicator_rolls_back_create() -> anyhow::Result<()> {
        let db = get_db().await?;
        let t = topic(&db, "Mood Disorders").await?;
        let mut input = new_condition("X", t.id);
        input.indicator_ids = Some(vec![77]);
        assert!(matches!(create_condition(&db, input).await, Err(ServiceError::ForeignKeyViolation { .. })));
        assert_eq!(list_conditions(&db, ConditionFilter::default(), &ListOptions::default()).await?.meta.total, 0);
        Ok(())
    }

    #[tokio::test]
    async fn expansion_returns_exact_related_sets() -> anyhow::Result<()> {
        let db = get_db().await?;
        let t = topic(&db, "Mood Disorders").await?;
        let i1 = indicator(&db, "fatigue").await?;
        let i2 = indicator(&db, "insomnia").await?;
        indicator(&db, "unrelated").await?;
        let mut input = new_condition("Sample", t.id);
        input.indicator_ids = Some(vec![i2.id, i1.id, i2.id]);
        let c = create_condition(&db, input).await?;

        let later = create_phase(&db, NewPhase { position: 2, title: "B".into(), details: "b".into(), condition_id: Some(c.id) }).await?;
        let early = create_phase(&db, NewPhase { position: 1, title: "A".into(), details: "a".into(), condition_id: Some(c.id) }).await?;

        let expand = Expansion::parse(Some("phases,indicators,topic,group"), EXPANSIONS)?;
        let detail = get_condition_detail(&db, c.id, &expand).await?;
        assert_eq!(detail.phases.unwrap().iter().map(|p| p.id).collect::<Vec<_>>(), vec![early.id, later.id]);
        assert_eq!(detail.indicators.unwrap().iter().map(|i| i.id).collect::<Vec<_>>(), vec![i1.id, i2.id]);
        assert_eq!(detail.topic, Some(t));
        assert_eq!(detail.group, Some(None));

        let plain = get_condition_detail(&db, c.id, &Expansion::none()).await?;
        let json = serde_json::to_value(&plain)?;
        assert!(json.get("phases").is_none());
        assert_eq!(json["name"], "Sample");
        Ok(())
    }

    #[tokio::test]
    async fn linking_is_idempotent_and_unlink_reports_missing() -> anyhow::Result<()> {
        let db = get_db().await?;
        let t = topic(&db, "Mood Disorders").await?;
        let c = create_condition(&db, new_condition("Sample", t.id)).await?;
        let i = indicator(&db, "fatigue").await?;

        link_indicator(&db, c.id, i.id).await?;
        link_indicator(&db, c.id, i.id).await?;
        assert_eq!(indicators_of_condition(&db, &c).await?.len(), 1);

        unlink_indicator(&db, c.id, i.id).await?;
        assert!(matches!(unlink_indicator(&db, c.id, i.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(link_indicator(&db, 99, i.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(link_indicator(&db, c.id, 99).await, Err(ServiceError::ForeignKeyViolation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn patch_clears_group_and_keeps_links() -> anyhow::Result<()> {
        let db = get_db().await?;
        let t = topic(&db, "Mood Disorders").await?;
        let g = create_group(&db, NewGroup { label: "Chronic".into(), description: None }).await?;
        let i = indicator(&db, "fatigue").await?;
        let mut input = new_condition("Sample", t.id);
        input.group_id = Some(g.id);
        input.indicator_ids = Some(vec![i.id]);
        let c = create_condition(&db, input).await?;

        let patched = update_condition(&db, c.id, ConditionChanges { group_id: Some(None), ..Default::default() }).await?;
        assert_eq!(patched.group_id, None);
        assert_eq!(indicators_of_condition(&db, &patched).await?.len(), 1);

        let replaced = replace_condition(&db, c.id, new_condition("Renamed", t.id)).await?;
        assert_eq!(replaced.name, "Renamed");
        assert_eq!(indicators_of_condition(&db, &replaced).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn delete_cascades_phases_and_links() -> anyhow::Result<()> {
        let db = get_db().await?;
        let t = topic(&db, "Mood Disorders").await?;
        let i = indicator(&db, "fatigue").await?;
        let mut input = new_condition("Sample", t.id);
        input.indicator_ids = Some(vec![i.id]);
        let c = create_condition(&db, input).await?;
        let p = create_phase(&db, NewPhase { position: 1, title: "A".into(), details: "a".into(), condition_id: Some(c.id) }).await?;

        delete_condition(&db, c.id).await?;
        assert!(get_condition(&db, c.id).await?.is_none());
        assert!(get_phase(&db, p.id).await?.is_none());
        assert_eq!(condition_indicator::Entity::find().count(&db).await?, 0);
        assert!(crate::indicator_service::get_indicator(&db, i.id).await?.is_some());
        assert!(matches!(delete_condition(&db, c.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn filters_by_topic_and_group() -> anyhow::Result<()> {
        let db = get_db().await?;
        let a = topic(&db, "A").await?;
        let b = topic(&db, "B").await?;
        let g = create_group(&db, NewGroup { label: "G".into(), description: None }).await?;
        create_condition(&db, new_condition("a1", a.id)).await?;
        let mut grouped = new_condition("a2", a.id);
        grouped.group_id = Some(g.id);
        create_condition(&db, grouped).await?;
        create_condition(&db, new_condition("b1", b.id)).await?;

        let by_topic = list_conditions(&db, ConditionFilter { topic_id: Some(a.id), group_id: None }, &ListOptions::default()).await?;
        assert_eq!(by_topic.meta.total, 2);
        let by_both = list_conditions(&db, ConditionFilter { topic_id: Some(a.id), group_id: Some(g.id) }, &ListOptions::default()).await?;
        assert_eq!(by_both.items.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(), vec!["a2"]);
        Ok(())
    }
}
