use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Ticket::Table)
                    .if_not_exists()
                    .col(big_integer(Ticket::TicketId).primary_key())
                    .col(string(Ticket::GuildId))
                    .col(string(Ticket::ChannelId))
                    .col(string(Ticket::UserId))
                    .col(string(Ticket::UserName))
                    .col(string(Ticket::TicketType))
                    .col(string(Ticket::Priority))
                    .col(string(Ticket::Status))
                    .col(boolean(Ticket::Claimed).default(false))
                    .col(string_null(Ticket::ClaimedBy))
                    .col(boolean(Ticket::ClaimGuard).default(false))
                    .col(string_null(Ticket::CloseReason))
                    .col(string_null(Ticket::CustomCloseReason))
                    .col(timestamp_null(Ticket::ClosedAt))
                    .col(string_null(Ticket::Rating))
                    .col(text_null(Ticket::ReviewFeedback))
                    .col(timestamp_null(Ticket::AlertTime))
                    .col(string_null(Ticket::AlertReason))
                    .col(string_null(Ticket::AlertMessageId))
                    .col(string_null(Ticket::FirstMessageId))
                    .col(string_null(Ticket::ArchiveMessageId))
                    .col(string_null(Ticket::LogMessageId))
                    .col(string_null(Ticket::ChannelTopic))
                    .col(integer(Ticket::MessageCount).default(0))
                    .col(timestamp_null(Ticket::LastPriorityChange))
                    .col(
                        timestamp(Ticket::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .col(timestamp_null(Ticket::DeletedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Ticket::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Ticket {
    Table,
    TicketId,
    GuildId,
    ChannelId,
    UserId,
    UserName,
    TicketType,
    Priority,
    Status,
    Claimed,
    ClaimedBy,
    ClaimGuard,
    CloseReason,
    CustomCloseReason,
    ClosedAt,
    Rating,
    ReviewFeedback,
    AlertTime,
    AlertReason,
    AlertMessageId,
    FirstMessageId,
    ArchiveMessageId,
    LogMessageId,
    ChannelTopic,
    MessageCount,
    LastPriorityChange,
    CreatedAt,
    DeletedAt,
}
