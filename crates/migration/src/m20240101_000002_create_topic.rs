//! Create `app_topics` table.
//!
//! Top-level category; conditions reference it.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Topic::Table)
                    .if_not_exists()
                    .col(pk_auto(Topic::Id))
                    .col(string_len(Topic::Title, 160).unique_key().not_null())
                    .col(text_null(Topic::Summary))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Topic::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Topic {
    #[sea_orm(iden = "app_topics")]
    Table,
    Id,
    Title,
    Summary,
}
