//! Create `app_condition_indicator` link table.
//!
//! Holds only the FK pair; the composite primary key makes links unique.
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ConditionIndicator::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ConditionIndicator::ConditionId).integer().not_null())
                    .col(ColumnDef::new(ConditionIndicator::IndicatorId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .name("pk_condition_indicator")
                            .col(ConditionIndicator::ConditionId)
                            .col(ConditionIndicator::IndicatorId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_condition_indicator_condition")
                            .from(ConditionIndicator::Table, ConditionIndicator::ConditionId)
                            .to(Condition::Table, Condition::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_condition_indicator_indicator")
                            .from(ConditionIndicator::Table, ConditionIndicator::IndicatorId)
                            .to(Indicator::Table, Indicator::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ConditionIndicator::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ConditionIndicator {
    #[sea_orm(iden = "app_condition_indicator")]
    Table,
    ConditionId,
    IndicatorId,
}

#[derive(DeriveIden)]
enum Condition {
    #[sea_orm(iden = "app_conditions")]
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Indicator {
    #[sea_orm(iden = "app_indicators")]
    Table,
    Id,
}
