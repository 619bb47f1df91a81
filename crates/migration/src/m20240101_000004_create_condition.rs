//! Create `app_conditions` table with FKs to `app_topics` and `app_groups`.
//!
//! Topic deletes are restricted while conditions exist; group deletes detach.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Condition::Table)
                    .if_not_exists()
                    .col(pk_auto(Condition::Id))
                    .col(string_len(Condition::Name, 160).not_null())
                    .col(text_null(Condition::Overview))
                    .col(integer(Condition::TopicId).not_null())
                    .col(integer_null(Condition::GroupId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_condition_topic")
                            .from(Condition::Table, Condition::TopicId)
                            .to(Topic::Table, Topic::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_condition_group")
                            .from(Condition::Table, Condition::GroupId)
                            .to(Group::Table, Group::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Condition::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Condition {
    #[sea_orm(iden = "app_conditions")]
    Table,
    Id,
    Name,
    Overview,
    TopicId,
    GroupId,
}

#[derive(DeriveIden)]
enum Topic {
    #[sea_orm(iden = "app_topics")]
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Group {
    #[sea_orm(iden = "app_groups")]
    Table,
    Id,
}
