//! Create `app_phases` table.
//!
//! Steps of a condition; removed together with their condition.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Phase::Table)
                    .if_not_exists()
                    .col(pk_auto(Phase::Id))
                    .col(integer(Phase::Position).not_null())
                    .col(string_len(Phase::Title, 160).not_null())
                    .col(text(Phase::Details).not_null())
                    .col(integer_null(Phase::ConditionId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_phase_condition")
                            .from(Phase::Table, Phase::ConditionId)
                            .to(Condition::Table, Condition::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Phase::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Phase {
    #[sea_orm(iden = "app_phases")]
    Table,
    Id,
    Position,
    Title,
    Details,
    ConditionId,
}

#[derive(DeriveIden)]
enum Condition {
    #[sea_orm(iden = "app_conditions")]
    Table,
    Id,
}
