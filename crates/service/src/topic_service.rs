use models::{condition, errors::FieldErrors, topic};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::errors::ServiceError;
use crate::expand::Expansion;
use crate::input::double_option;
use crate::pagination::{apply_sort, fetch_page, ListOptions, Page};

pub const EXPANSIONS: &[&str] = &["conditions"];
pub const SORT_FIELDS: &[(&str, topic::Column)] = &[("id", topic::Column::Id), ("title", topic::Column::Title)];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTopic {
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
}

/// Partial update; `summary: null` clears the summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopicChanges {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub summary: Option<Option<String>>,
}

impl NewTopic {
    pub fn validate(&self) -> Result<(), ServiceError> {
        let mut errs = FieldErrors::new();
        errs.check("title", topic::validate_title(&self.title));
        Ok(errs.finish()?)
    }
}

impl TopicChanges {
    pub fn validate(&self) -> Result<(), ServiceError> {
        let mut errs = FieldErrors::new();
        if let Some(title) = &self.title {
            errs.check("title", topic::validate_title(title));
        }
        Ok(errs.finish()?)
    }
}

impl From<NewTopic> for TopicChanges {
    fn from(t: NewTopic) -> Self { Self { title: Some(t.title), summary: Some(t.summary) } }
}

#[derive(Debug, Clone, Serialize)]
pub struct TopicDetail {
    #[serde(flatten)]
    pub topic: topic::Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<condition::Model>>,
}

async fn ensure_title_free<C: ConnectionTrait>(conn: &C, title: &str, except: Option<i32>) -> Result<(), ServiceError> {
    let mut q = topic::Entity::find().filter(topic::Column::Title.eq(title));
    if let Some(id) = except {
        q = q.filter(topic::Column::Id.ne(id));
    }
    if q.one(conn).await?.is_some() {
        return Err(ServiceError::duplicate("topic", "title", title));
    }
    Ok(())
}

/// Create a topic.
#[instrument(skip(db, input), fields(title = %input.title))]
pub async fn create_topic(db: &DatabaseConnection, input: NewTopic) -> Result<topic::Model, ServiceError> {
    input.validate()?;
    let txn = db.begin().await?;
    ensure_title_free(&txn, &input.title, None).await?;
    let created = topic::ActiveModel { title: Set(input.title), summary: Set(input.summary), ..Default::default() }
        .insert(&txn)
        .await?;
    txn.commit().await?;
    info!(id = created.id, "topic_created");
    Ok(created)
}

/// Get topic by id.
pub async fn get_topic(db: &DatabaseConnection, id: i32) -> Result<Option<topic::Model>, ServiceError> {
    Ok(topic::Entity::find_by_id(id).one(db).await?)
}

/// Look a topic up by its unique title.
pub async fn find_topic_by_title(db: &DatabaseConnection, title: &str) -> Result<Option<topic::Model>, ServiceError> {
    Ok(topic::Entity::find().filter(topic::Column::Title.eq(title)).one(db).await?)
}

/// Conditions under a topic, by id.
pub async fn conditions_of_topic<C: ConnectionTrait>(conn: &C, topic_id: i32) -> Result<Vec<condition::Model>, ServiceError> {
    Ok(condition::Entity::find()
        .filter(condition::Column::TopicId.eq(topic_id))
        .order_by_asc(condition::Column::Id)
        .all(conn)
        .await?)
}

pub async fn get_topic_detail(db: &DatabaseConnection, id: i32, expand: &Expansion) -> Result<TopicDetail, ServiceError> {
    let topic = get_topic(db, id).await?.ok_or_else(|| ServiceError::not_found("topic", id))?;
    let conditions = if expand.has("conditions") { Some(conditions_of_topic(db, id).await?) } else { None };
    Ok(TopicDetail { topic, conditions })
}

/// List topics with pagination.
pub async fn list_topics(db: &DatabaseConnection, opts: &ListOptions) -> Result<Page<topic::Model>, ServiceError> {
    let select = apply_sort(topic::Entity::find(), opts.sort.as_ref(), SORT_FIELDS, topic::Column::Id)?;
    fetch_page(db, select, opts.pagination).await
}

/// Apply a partial update.
#[instrument(skip(db, changes))]
pub async fn update_topic(db: &DatabaseConnection, id: i32, changes: TopicChanges) -> Result<topic::Model, ServiceError> {
    changes.validate()?;
    let txn = db.begin().await?;
    let existing = topic::Entity::find_by_id(id).one(&txn).await?.ok_or_else(|| ServiceError::not_found("topic", id))?;
    let mut am: topic::ActiveModel = existing.clone().into();
    if let Some(title) = changes.title {
        if title != existing.title {
            ensure_title_free(&txn, &title, Some(id)).await?;
        }
        am.title = Set(title);
    }
    if let Some(summary) = changes.summary {
        am.summary = Set(summary);
    }
    let updated = if am.is_changed() { am.update(&txn).await? } else { existing };
    txn.commit().await?;
    info!(id, "topic_updated");
    Ok(updated)
}

/// Replace every writable field.
pub async fn replace_topic(db: &DatabaseConnection, id: i32, input: NewTopic) -> Result<topic::Model, ServiceError> {
    input.validate()?;
    update_topic(db, id, input.into()).await
}

/// Delete a topic. Rejected with `Conflict` while conditions reference it.
#[instrument(skip(db))]
pub async fn delete_topic(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
    let txn = db.begin().await?;
    if topic::Entity::find_by_id(id).one(&txn).await?.is_none() {
        return Err(ServiceError::not_found("topic", id));
    }
    let dependents = condition::Entity::find().filter(condition::Column::TopicId.eq(id)).count(&txn).await?;
    if dependents > 0 {
        return Err(ServiceError::Conflict(format!("topic {id} still has {dependents} condition(s)")));
    }
    topic::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;
    info!(id, "topic_deleted");
    Ok(())
}
