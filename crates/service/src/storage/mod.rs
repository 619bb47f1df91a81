//! Storage context handed to the API layer at construction time.
//!
//! Owns the pooled connection; `open` connects and migrates, `close` drains
//! the pool on shutdown.

use configs::DatabaseConfig;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tracing::{info, instrument};

use crate::errors::ServiceError;

#[derive(Clone, Debug)]
pub struct Storage {
    db: DatabaseConnection,
}

impl Storage {
    #[instrument(skip(cfg), fields(sqlite = cfg.is_sqlite(), run_migrations = cfg.run_migrations))]
    pub async fn open(cfg: &DatabaseConfig) -> anyhow::Result<Self> {
        let db = models::db::connect_with_config(cfg).await?;
        if cfg.run_migrations {
            migration::Migrator::up(&db, None).await?;
            info!("migrations_applied");
        }
        info!("storage_opened");
        Ok(Self { db })
    }

    /// Fresh, migrated in-memory SQLite storage.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let db = models::db::connect_in_memory().await?;
        migration::Migrator::up(&db, None).await?;
        Ok(Self { db })
    }

    pub fn conn(&self) -> &DatabaseConnection { &self.db }

    pub async fn ping(&self) -> Result<(), ServiceError> {
        self.db.ping().await?;
        Ok(())
    }

    pub async fn close(self) -> Result<(), ServiceError> {
        self.db.close().await?;
        info!("storage_closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_migrates_and_closes() -> anyhow::Result<()> {
        let cfg = DatabaseConfig { url: "sqlite::memory:".into(), ..Default::default() };
        let storage = Storage::open(&cfg).await?;
        storage.ping().await?;
        let page = crate::topic_service::list_topics(storage.conn(), &Default::default()).await?;
        assert_eq!(page.meta.total, 0);
        storage.close().await?;
        Ok(())
    }
}
