//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_account;
mod m20240101_000002_create_topic;
mod m20240101_000003_create_group;
mod m20240101_000004_create_condition;
mod m20240101_000005_create_phase;
mod m20240101_000006_create_indicator;
mod m20240101_000007_create_condition_indicator;
mod m20240101_000008_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_account::Migration),
            Box::new(m20240101_000002_create_topic::Migration),
            Box::new(m20240101_000003_create_group::Migration),
            Box::new(m20240101_000004_create_condition::Migration),
            Box::new(m20240101_000005_create_phase::Migration),
            Box::new(m20240101_000006_create_indicator::Migration),
            Box::new(m20240101_000007_create_condition_indicator::Migration),
            // Indexes should always be applied last
            Box::new(m20240101_000008_add_indexes::Migration),
        ]
    }
}
