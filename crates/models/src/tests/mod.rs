/// Schema and constraint tests against a migrated in-memory database
pub mod schema_tests;


use sea_orm::DatabaseConnection;
use migration::MigratorTrait;

pub(crate) async fn migrated_db() -> anyhow::Result<DatabaseConnection> {
    let db = crate::db::connect_in_memory().await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}
