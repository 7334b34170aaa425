use sea_orm_migration::{prelude::*, schema::*};

use super::m20260801_000002_create_ticket_message_table::TicketMessage;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TicketAttachment::Table)
                    .if_not_exists()
                    .col(pk_auto(TicketAttachment::Id))
                    .col(integer(TicketAttachment::MessageId))
                    .col(string(TicketAttachment::FileName))
                    .col(string(TicketAttachment::Url))
                    .col(string_null(TicketAttachment::ContentType))
                    .col(blob_null(TicketAttachment::Data))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_attachment_message_id")
                            .from(TicketAttachment::Table, TicketAttachment::MessageId)
                            .to(TicketMessage::Table, TicketMessage::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TicketAttachment::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum TicketAttachment {
    Table,
    Id,
    MessageId,
    FileName,
    Url,
    ContentType,
    Data,
}
