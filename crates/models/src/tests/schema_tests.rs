use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use anyhow::Result;

use super::migrated_db;
use crate::{account, condition, group, topic};

#[tokio::test]
async fn topic_title_is_unique_at_storage_level() -> Result<()> {
    let db = migrated_db().await?;
    topic::ActiveModel { title: Set("Mood Disorders".into()), ..Default::default() }.insert(&db).await?;
    let dup = topic::ActiveModel { title: Set("Mood Disorders".into()), ..Default::default() }.insert(&db).await;
    assert!(dup.is_err());
    Ok(())
}

#[tokio::test]
async fn account_email_is_unique_at_storage_level() -> Result<()> {
    let db = migrated_db().await?;
    let first = account::ActiveModel {
        handle: Set("first".into()),
        email_address: Set("same@example.com".into()),
        pass_hash: Set("opaque".into()),
        ..Default::default()
    };
    first.insert(&db).await?;
    let second = account::ActiveModel {
        handle: Set("second".into()),
        email_address: Set("same@example.com".into()),
        pass_hash: Set("opaque".into()),
        ..Default::default()
    };
    assert!(second.insert(&db).await.is_err());
    Ok(())
}

#[tokio::test]
async fn condition_requires_existing_topic() -> Result<()> {
    let db = migrated_db().await?;
    let orphan = condition::ActiveModel {
        name: Set("Orphan".into()),
        topic_id: Set(999),
        group_id: Set(None),
        ..Default::default()
    };
    assert!(orphan.insert(&db).await.is_err());
    assert!(condition::Entity::find().all(&db).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn ids_are_assigned_in_insert_order() -> Result<()> {
    let db = migrated_db().await?;
    let a = group::ActiveModel { label: Set("A".into()), ..Default::default() }.insert(&db).await?;
    let b = group::ActiveModel { label: Set("B".into()), ..Default::default() }.insert(&db).await?;
    assert!(b.id > a.id);
    Ok(())
}
