use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

use entity::ticket::Column;

use crate::model::ticket::{Ticket, TicketStatus};

/// Read-only aggregation queries over the ticket store.
///
/// Statistics are a reporting view; nothing here participates in the
/// lifecycle state machine.
pub struct StatsRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> StatsRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Counts tickets per lifecycle status.
    ///
    /// # Returns
    /// - `Ok(map)` - Status string to count, including zero entries
    /// - `Err(DbErr)` - Database error
    pub async fn count_by_status(&self) -> Result<BTreeMap<String, u64>, DbErr> {
        let mut counts = BTreeMap::new();

        for status in [
            TicketStatus::Open,
            TicketStatus::Closed,
            TicketStatus::Deleting,
            TicketStatus::Deleted,
        ] {
            let count = entity::prelude::Ticket::find()
                .filter(Column::Status.eq(status.as_str()))
                .count(self.db)
                .await?;

            counts.insert(status.as_str().to_string(), count);
        }

        Ok(counts)
    }

    /// Counts non-deleted tickets per priority level.
    ///
    /// # Returns
    /// - `Ok(map)` - Priority name to count
    /// - `Err(DbErr)` - Database error
    pub async fn count_by_priority(&self) -> Result<BTreeMap<String, u64>, DbErr> {
        let rows: Vec<(String, i64)> = entity::prelude::Ticket::find()
            .select_only()
            .column(Column::Priority)
            .column_as(Column::TicketId.count(), "count")
            .filter(Column::Status.ne(TicketStatus::Deleted.as_str()))
            .group_by(Column::Priority)
            .into_tuple()
            .all(self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(priority, count)| (priority, count as u64))
            .collect())
    }

    /// Counts tickets created at or after the given instant.
    pub async fn created_since(&self, since: DateTime<Utc>) -> Result<u64, DbErr> {
        entity::prelude::Ticket::find()
            .filter(Column::CreatedAt.gte(since))
            .count(self.db)
            .await
    }

    /// Counts review ratings by their stored star string.
    ///
    /// # Returns
    /// - `Ok(map)` - Rating string to count; unrated tickets are excluded
    /// - `Err(DbErr)` - Database error
    pub async fn rating_counts(&self) -> Result<BTreeMap<String, u64>, DbErr> {
        let rows: Vec<(String, i64)> = entity::prelude::Ticket::find()
            .select_only()
            .column(Column::Rating)
            .column_as(Column::TicketId.count(), "count")
            .filter(Column::Rating.is_not_null())
            .group_by(Column::Rating)
            .into_tuple()
            .all(self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(rating, count)| (rating, count as u64))
            .collect())
    }

    /// Gets the most recently closed tickets for duration averages.
    ///
    /// # Arguments
    /// - `limit` - Maximum number of tickets to sample
    ///
    /// # Returns
    /// - `Ok(tickets)` - Tickets with a closure timestamp, newest first
    /// - `Err(DbErr)` - Database error
    pub async fn recently_closed(&self, limit: u64) -> Result<Vec<Ticket>, DbErr> {
        let tickets = entity::prelude::Ticket::find()
            .filter(Column::ClosedAt.is_not_null())
            .order_by_desc(Column::ClosedAt)
            .limit(limit)
            .all(self.db)
            .await?;

        Ok(tickets.into_iter().map(Ticket::from_entity).collect())
    }

    /// Gets the timestamp of the first response by someone other than the creator.
    ///
    /// # Arguments
    /// - `ticket_id` - Ticket to inspect
    /// - `creator_id` - Creator's Discord ID as string
    ///
    /// # Returns
    /// - `Ok(Some(at))` - First non-creator message time
    /// - `Ok(None)` - Nobody other than the creator wrote
    /// - `Err(DbErr)` - Database error
    pub async fn first_response_at(
        &self,
        ticket_id: i64,
        creator_id: &str,
    ) -> Result<Option<DateTime<Utc>>, DbErr> {
        let message = entity::prelude::TicketMessage::find()
            .filter(entity::ticket_message::Column::TicketId.eq(ticket_id))
            .filter(entity::ticket_message::Column::AuthorId.ne(creator_id))
            .order_by_asc(entity::ticket_message::Column::SentAt)
            .one(self.db)
            .await?;

        Ok(message.map(|m| m.sent_at))
    }
}
