use sea_orm_migration::prelude::*;

use super::m20260801_000001_create_ticket_table::Ticket;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_ticket_status_created_at")
                    .table(Ticket::Table)
                    .col(Ticket::Status)
                    .col(Ticket::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ticket_user_created_at")
                    .table(Ticket::Table)
                    .col(Ticket::UserId)
                    .col(Ticket::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ticket_type_status")
                    .table(Ticket::Table)
                    .col(Ticket::TicketType)
                    .col(Ticket::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ticket_priority_status")
                    .table(Ticket::Table)
                    .col(Ticket::Priority)
                    .col(Ticket::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ticket_claimed_claimed_by")
                    .table(Ticket::Table)
                    .col(Ticket::Claimed)
                    .col(Ticket::ClaimedBy)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_ticket_status_created_at",
            "idx_ticket_user_created_at",
            "idx_ticket_type_status",
            "idx_ticket_priority_status",
            "idx_ticket_claimed_claimed_by",
        ] {
            manager
                .drop_index(Index::drop().name(name).table(Ticket::Table).to_owned())
                .await?;
        }

        Ok(())
    }
}
