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
                    .table(TicketMessage::Table)
                    .if_not_exists()
                    .col(pk_auto(TicketMessage::Id))
                    .col(big_integer(TicketMessage::TicketId))
                    .col(string(TicketMessage::AuthorId))
                    .col(string(TicketMessage::AuthorName))
                    .col(text(TicketMessage::Content))
                    .col(timestamp(TicketMessage::SentAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_message_ticket_id")
                            .from(TicketMessage::Table, TicketMessage::TicketId)
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
            .drop_table(Table::drop().table(TicketMessage::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum TicketMessage {
    Table,
    Id,
    TicketId,
    AuthorId,
    AuthorName,
    Content,
    SentAt,
}
