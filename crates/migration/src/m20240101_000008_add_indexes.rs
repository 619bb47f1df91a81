use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Conditions: filtered by topic and group
        manager
            .create_index(
                Index::create()
                    .name("idx_condition_topic")
                    .table(Condition::Table)
                    .col(Condition::TopicId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_condition_group")
                    .table(Condition::Table)
                    .col(Condition::GroupId)
                    .to_owned(),
            )
            .await?;

        // Phases: listed per condition in position order
        manager
            .create_index(
                Index::create()
                    .name("idx_phase_condition_position")
                    .table(Phase::Table)
                    .col(Phase::ConditionId)
                    .col(Phase::Position)
                    .to_owned(),
            )
            .await?;

        // Links: reverse lookup indicator -> conditions
        manager
            .create_index(
                Index::create()
                    .name("idx_condition_indicator_indicator")
                    .table(ConditionIndicator::Table)
                    .col(ConditionIndicator::IndicatorId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_condition_topic").table(Condition::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_condition_group").table(Condition::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_phase_condition_position").table(Phase::Table).to_owned())
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_condition_indicator_indicator")
                    .table(ConditionIndicator::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Condition {
    #[sea_orm(iden = "app_conditions")]
    Table,
    TopicId,
    GroupId,
}

#[derive(DeriveIden)]
enum Phase {
    #[sea_orm(iden = "app_phases")]
    Table,
    ConditionId,
    Position,
}

#[derive(DeriveIden)]
enum ConditionIndicator {
    #[sea_orm(iden = "app_condition_indicator")]
    Table,
    IndicatorId,
}
