#![cfg(test)]
use sea_orm::DatabaseConnection;

use crate::storage::Storage;

/// Every test gets its own migrated in-memory database.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let storage = Storage::in_memory().await?;
    Ok(storage.conn().clone())
}
