//! Create `app_indicators` table.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Indicator::Table)
                    .if_not_exists()
                    .col(pk_auto(Indicator::Id))
                    .col(string_len(Indicator::Label, 160).not_null())
                    .col(text_null(Indicator::Notes))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Indicator::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Indicator {
    #[sea_orm(iden = "app_indicators")]
    Table,
    Id,
    Label,
    Notes,
}
