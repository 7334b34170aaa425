use sea_orm_migration::{prelude::*, schema::*};

use super::m20260801_000001_create_ticket_table::Ticket;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TicketQuestion::Table)
                    .if_not_exists()
                    .col(pk_auto(TicketQuestion::Id))
                    .col(big_integer(TicketQuestion::TicketId))
                    .col(integer(TicketQuestion::Position))
                    .col(string(TicketQuestion::Question))
                    .col(text(TicketQuestion::Answer))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_question_ticket_id")
                            .from(TicketQuestion::Table, TicketQuestion::TicketId)
                            .to(Ticket::Table, Ticket::TicketId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TicketQuestion::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum TicketQuestion {
    Table,
    Id,
    TicketId,
    Position,
    Question,
    Answer,
}
