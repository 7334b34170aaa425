use std::collections::HashMap;

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    ExprTrait, PaginatorTrait, QueryFilter, QueryOrder,
};

use crate::model::message::{RecordMessageParams, TicketMessage};

/// Repository for recorded ticket messages and their attachments.
pub struct TicketMessageRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> TicketMessageRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records one channel message and its attachments against a ticket.
    ///
    /// Also bumps the ticket's `message_count`, which gates transcript
    /// generation at close time.
    ///
    /// # Arguments
    /// - `params` - Message author, content, timestamp and attachments
    ///
    /// # Returns
    /// - `Ok(())` - Message recorded
    /// - `Err(DbErr)` - Database error
    pub async fn record(&self, params: RecordMessageParams) -> Result<(), DbErr> {
        let message = entity::ticket_message::ActiveModel {
            ticket_id: ActiveValue::Set(params.ticket_id),
            author_id: ActiveValue::Set(params.author_id.to_string()),
            author_name: ActiveValue::Set(params.author_name),
            content: ActiveValue::Set(params.content),
            sent_at: ActiveValue::Set(params.sent_at),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        for attachment in params.attachments {
            entity::ticket_attachment::ActiveModel {
                message_id: ActiveValue::Set(message.id),
                file_name: ActiveValue::Set(attachment.file_name),
                url: ActiveValue::Set(attachment.url),
                content_type: ActiveValue::Set(attachment.content_type),
                data: ActiveValue::Set(attachment.data),
                ..Default::default()
            }
            .insert(self.db)
            .await?;
        }

        entity::prelude::Ticket::update_many()
            .col_expr(
                entity::ticket::Column::MessageCount,
                Expr::col(entity::ticket::Column::MessageCount).add(1),
            )
            .filter(entity::ticket::Column::TicketId.eq(params.ticket_id))
            .exec(self.db)
            .await?;

        Ok(())
    }

    /// Gets a ticket's messages in chronological order, with attachments.
    ///
    /// # Arguments
    /// - `ticket_id` - Ticket whose history to fetch
    ///
    /// # Returns
    /// - `Ok(messages)` - Messages oldest-first
    /// - `Err(DbErr)` - Database error
    pub async fn messages_for_ticket(&self, ticket_id: i64) -> Result<Vec<TicketMessage>, DbErr> {
        let messages = entity::prelude::TicketMessage::find()
            .filter(entity::ticket_message::Column::TicketId.eq(ticket_id))
            .order_by_asc(entity::ticket_message::Column::SentAt)
            .order_by_asc(entity::ticket_message::Column::Id)
            .all(self.db)
            .await?;

        let message_ids: Vec<i32> = messages.iter().map(|m| m.id).collect();

        let mut attachments: HashMap<i32, Vec<entity::ticket_attachment::Model>> = HashMap::new();
        if !message_ids.is_empty() {
            for attachment in entity::prelude::TicketAttachment::find()
                .filter(entity::ticket_attachment::Column::MessageId.is_in(message_ids))
                .all(self.db)
                .await?
            {
                attachments
                    .entry(attachment.message_id)
                    .or_default()
                    .push(attachment);
            }
        }

        Ok(messages
            .into_iter()
            .map(|m| {
                let atts = attachments.remove(&m.id).unwrap_or_default();
                TicketMessage::from_entity(m, atts)
            })
            .collect())
    }

    /// Counts the recorded messages of a ticket.
    pub async fn count_for_ticket(&self, ticket_id: i64) -> Result<u64, DbErr> {
        entity::prelude::TicketMessage::find()
            .filter(entity::ticket_message::Column::TicketId.eq(ticket_id))
            .count(self.db)
            .await
    }
}
