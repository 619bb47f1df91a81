use models::{condition, errors::FieldErrors, group};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::errors::ServiceError;
use crate::expand::Expansion;
use crate::input::double_option;
use crate::pagination::{apply_sort, fetch_page, ListOptions, Page};

pub const EXPANSIONS: &[&str] = &["conditions"];
pub const SORT_FIELDS: &[(&str, group::Column)] = &[("id", group::Column::Id), ("label", group::Column::Label)];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGroup {
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupChanges {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
}

impl NewGroup {
    pub fn validate(&self) -> Result<(), ServiceError> {
        let mut errs = FieldErrors::new();
        errs.check("label", group::validate_label(&self.label));
        Ok(errs.finish()?)
    }
}

impl GroupChanges {
    pub fn validate(&self) -> Result<(), ServiceError> {
        let mut errs = FieldErrors::new();
        if let Some(label) = &self.label {
            errs.check("label", group::validate_label(label));
        }
        Ok(errs.finish()?)
    }
}

impl From<NewGroup> for GroupChanges {
    fn from(g: NewGroup) -> Self { Self { label: Some(g.label), description: Some(g.description) } }
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupDetail {
    #[serde(flatten)]
    pub group: group::Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<condition::Model>>,
}

async fn ensure_label_free<C: ConnectionTrait>(conn: &C, label: &str, except: Option<i32>) -> Result<(), ServiceError> {
    let mut q = group::Entity::find().filter(group::Column::Label.eq(label));
    if let Some(id) = except {
        q = q.filter(group::Column::Id.ne(id));
    }
    if q.one(conn).await?.is_some() {
        return Err(ServiceError::duplicate("group", "label", label));
    }
    Ok(())
}

#[instrument(skip(db, input), fields(label = %input.label))]
pub async fn create_group(db: &DatabaseConnection, input: NewGroup) -> Result<group::Model, ServiceError> {
    input.validate()?;
    let txn = db.begin().await?;
    ensure_label_free(&txn, &input.label, None).await?;
    let created = group::ActiveModel { label: Set(input.label), description: Set(input.description), ..Default::default() }
        .insert(&txn)
        .await?;
    txn.commit().await?;
    info!(id = created.id, "group_created");
    Ok(created)
}

pub async fn get_group(db: &DatabaseConnection, id: i32) -> Result<Option<group::Model>, ServiceError> {
    Ok(group::Entity::find_by_id(id).one(db).await?)
}

pub async fn find_group_by_label(db: &DatabaseConnection, label: &str) -> Result<Option<group::Model>, ServiceError> {
    Ok(group::Entity::find().filter(group::Column::Label.eq(label)).one(db).await?)
}

pub async fn conditions_of_group<C: ConnectionTrait>(conn: &C, group_id: i32) -> Result<Vec<condition::Model>, ServiceError> {
    Ok(condition::Entity::find()
        .filter(condition::Column::GroupId.eq(group_id))
        .order_by_asc(condition::Column::Id)
        .all(conn)
        .await?)
}

pub async fn get_group_detail(db: &DatabaseConnection, id: i32, expand: &Expansion) -> Result<GroupDetail, ServiceError> {
    let group = get_group(db, id).await?.ok_or_else(|| ServiceError::not_found("group", id))?;
    let conditions = if expand.has("conditions") { Some(conditions_of_group(db, id).await?) } else { None };
    Ok(GroupDetail { group, conditions })
}

pub async fn list_groups(db: &DatabaseConnection, opts: &ListOptions) -> Result<Page<group::Model>, ServiceError> {
    let select = apply_sort(group::Entity::find(), opts.sort.as_ref(), SORT_FIELDS, group::Column::Id)?;
    fetch_page(db, select, opts.pagination).await
}

#[instrument(skip(db, changes))]
pub async fn update_group(db: &DatabaseConnection, id: i32, changes: GroupChanges) -> Result<group::Model, ServiceError> {
    changes.validate()?;
    let txn = db.begin().await?;
    let existing = group::Entity::find_by_id(id).one(&txn).await?.ok_or_else(|| ServiceError::not_found("group", id))?;
    let mut am: group::ActiveModel = existing.clone().into();
    if let Some(label) = changes.label {
        if label != existing.label {
            ensure_label_free(&txn, &label, Some(id)).await?;
        }
        am.label = Set(label);
    }
    if let Some(description) = changes.description {
        am.description = Set(description);
    }
    let updated = if am.is_changed() { am.update(&txn).await? } else { existing };
    txn.commit().await?;
    info!(id, "group_updated");
    Ok(updated)
}

pub async fn replace_group(db: &DatabaseConnection, id: i32, input: NewGroup) -> Result<group::Model, ServiceError> {
    input.validate()?;
    update_group(db, id, input.into()).await
}

/// Delete a group. Its conditions survive with `group_id` cleared.
#[instrument(skip(db))]
pub async fn delete_group(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
    let txn = db.begin().await?;
    if group::Entity::find_by_id(id).one(&txn).await?.is_none() {
        return Err(ServiceError::not_found("group", id));
    }
    let detached = condition::Entity::update_many()
        .col_expr(condition::Column::GroupId, Expr::value(Option::<i32>::None))
        .filter(condition::Column::GroupId.eq(id))
        .exec(&txn)
        .await?;
    group::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;
    info!(id, detached = detached.rows_affected, "group_deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition_service::{create_condition, get_condition, NewCondition};
    use crate::test_support::get_db;
    use crate::topic_service::{create_topic, NewTopic};

    fn new_group(label: &str) -> NewGroup { NewGroup { label: label.into(), description: None } }

    #[tokio::test]
    async fn group_crud_service() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let g = create_group(&db, NewGroup { label: "Chronic".into(), description: Some("long term".into()) }).await?;
        assert_eq!(find_group_by_label(&db, "Chronic").await?, Some(g.clone()));

        let replaced = replace_group(&db, g.id, new_group("Acute")).await?;
        assert_eq!(replaced.label, "Acute");
        assert_eq!(replaced.description, None);

        let patched = update_group(&db, g.id, GroupChanges { description: Some(Some("short".into())), ..Default::default() }).await?;
        assert_eq!(patched.label, "Acute");
        assert_eq!(patched.description.as_deref(), Some("short"));

        delete_group(&db, g.id).await?;
        assert!(get_group(&db, g.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_label_is_rejected() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        create_group(&db, new_group("Chronic")).await?;
        assert!(matches!(create_group(&db, new_group("Chronic")).await, Err(ServiceError::DuplicateKey { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn delete_detaches_conditions() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let t = create_topic(&db, NewTopic { title: "Mood Disorders".into(), summary: None }).await?;
        let g = create_group(&db, new_group("Chronic")).await?;
        let c = create_condition(
            &db,
            NewCondition { name: "Sample".into(), overview: None, topic_id: t.id, group_id: Some(g.id), indicator_ids: None },
        )
        .await?;

        let detail = get_group_detail(&db, g.id, &Expansion::parse(Some("conditions"), EXPANSIONS)?).await?;
        assert_eq!(detail.conditions.map(|cs| cs.len()), Some(1));

        delete_group(&db, g.id).await?;
        let survivor = get_condition(&db, c.id).await?.unwrap();
        assert_eq!(survivor.group_id, None);
        Ok(())
    }
}
