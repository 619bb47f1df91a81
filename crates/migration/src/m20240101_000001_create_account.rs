//! Create `app_accounts` table.
//!
//! Registered users; isolated from the catalog tables. `pass_hash` is opaque.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Account::Table)
                    .if_not_exists()
                    .col(pk_auto(Account::Id))
                    .col(string_len(Account::Handle, 80).unique_key().not_null())
                    .col(string_len(Account::EmailAddress, 180).unique_key().not_null())
                    .col(string_len(Account::PassHash, 200).not_null())
                    .col(string_len_null(Account::GivenName, 80))
                    .col(string_len_null(Account::FamilyName, 80))
                    .col(string_len_null(Account::AvatarUrl, 300))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Account::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Account {
    #[sea_orm(iden = "app_accounts")]
    Table,
    Id,
    Handle,
    EmailAddress,
    PassHash,
    GivenName,
    FamilyName,
    AvatarUrl,
}
