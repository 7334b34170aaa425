//! Ticket factory for creating test ticket entities.
//!
//! This module provides factory methods for creating ticket entities with
//! sensible defaults, reducing boilerplate in tests. The factory supports
//! customization through a builder pattern.

use crate::factory::helpers::next_id;
use crate::fixture;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Factory for creating test tickets with customizable fields.
///
/// Provides a builder pattern for creating ticket entities with default values
/// that can be overridden as needed for specific test scenarios. Default values
/// are sourced from the ticket fixture with a unique ticket id and channel id
/// to prevent conflicts when creating multiple tickets.
///
/// # Example
///
/// ```rust,ignore
/// use test_utils::factory::ticket::TicketFactory;
///
/// let ticket = TicketFactory::new(&db)
///     .status("closed")
///     .priority("High")
///     .build()
///     .await?;
/// ```
pub struct TicketFactory<'a> {
    db: &'a DatabaseConnection,
    entity: entity::ticket::Model,
}

impl<'a> TicketFactory<'a> {
    /// Creates a new TicketFactory with default values from the fixture.
    ///
    /// Defaults are sourced from `fixture::ticket::entity_builder()` with a unique
    /// auto-incremented ticket id and channel id to prevent conflicts when creating
    /// multiple tickets.
    ///
    /// # Arguments
    /// - `db` - Database connection for inserting the entity
    ///
    /// # Returns
    /// - `TicketFactory` - New factory instance with defaults
    pub fn new(db: &'a DatabaseConnection) -> Self {
        let id = next_id();
        let entity = fixture::ticket::entity_builder()
            .ticket_id(id as i64)
            .channel_id((900_000_000_000_000_000u64 + id).to_string())
            .build();

        Self { db, entity }
    }

    /// Sets the creator's user ID.
    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.entity.user_id = user_id.into();
        self
    }

    /// Sets the guild ID.
    pub fn guild_id(mut self, guild_id: impl Into<String>) -> Self {
        self.entity.guild_id = guild_id.into();
        self
    }

    /// Sets the channel ID.
    pub fn channel_id(mut self, channel_id: impl Into<String>) -> Self {
        self.entity.channel_id = channel_id.into();
        self
    }

    /// Sets the ticket type key.
    pub fn ticket_type(mut self, ticket_type: impl Into<String>) -> Self {
        self.entity.ticket_type = ticket_type.into();
        self
    }

    /// Sets the priority level.
    pub fn priority(mut self, priority: impl Into<String>) -> Self {
        self.entity.priority = priority.into();
        self
    }

    /// Sets the lifecycle status.
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.entity.status = status.into();
        self
    }

    /// Sets the claim state. A `Some` claimer implies `claimed = true`.
    pub fn claimed_by(mut self, claimed_by: Option<String>) -> Self {
        self.entity.claimed = claimed_by.is_some();
        self.entity.claimed_by = claimed_by;
        self
    }

    /// Sets the pending alert deadline.
    pub fn alert_time(mut self, alert_time: Option<DateTime<Utc>>) -> Self {
        self.entity.alert_time = alert_time;
        self
    }

    /// Sets the alert message id, marking an alert as already posted.
    pub fn alert_message_id(mut self, alert_message_id: Option<String>) -> Self {
        self.entity.alert_message_id = alert_message_id;
        self
    }

    /// Sets the recorded message count.
    pub fn message_count(mut self, message_count: i32) -> Self {
        self.entity.message_count = message_count;
        self
    }

    /// Sets the closure timestamp.
    pub fn closed_at(mut self, closed_at: Option<DateTime<Utc>>) -> Self {
        self.entity.closed_at = closed_at;
        self
    }

    /// Sets the review rating.
    pub fn rating(mut self, rating: Option<String>) -> Self {
        self.entity.rating = rating;
        self
    }

    /// Sets the last priority change timestamp.
    pub fn last_priority_change(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.entity.last_priority_change = at;
        self
    }

    /// Sets the creation timestamp.
    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.entity.created_at = created_at;
        self
    }

    /// Builds and inserts the ticket entity into the database.
    ///
    /// # Returns
    /// - `Ok(entity::ticket::Model)` - Created ticket entity
    /// - `Err(DbErr)` - Database error during insert
    pub async fn build(self) -> Result<entity::ticket::Model, DbErr> {
        entity::ticket::ActiveModel {
            ticket_id: ActiveValue::Set(self.entity.ticket_id),
            guild_id: ActiveValue::Set(self.entity.guild_id),
            channel_id: ActiveValue::Set(self.entity.channel_id),
            user_id: ActiveValue::Set(self.entity.user_id),
            user_name: ActiveValue::Set(self.entity.user_name),
            ticket_type: ActiveValue::Set(self.entity.ticket_type),
            priority: ActiveValue::Set(self.entity.priority),
            status: ActiveValue::Set(self.entity.status),
            claimed: ActiveValue::Set(self.entity.claimed),
            claimed_by: ActiveValue::Set(self.entity.claimed_by),
            claim_guard: ActiveValue::Set(self.entity.claim_guard),
            close_reason: ActiveValue::Set(self.entity.close_reason),
            custom_close_reason: ActiveValue::Set(self.entity.custom_close_reason),
            closed_at: ActiveValue::Set(self.entity.closed_at),
            rating: ActiveValue::Set(self.entity.rating),
            review_feedback: ActiveValue::Set(self.entity.review_feedback),
            alert_time: ActiveValue::Set(self.entity.alert_time),
            alert_reason: ActiveValue::Set(self.entity.alert_reason),
            alert_message_id: ActiveValue::Set(self.entity.alert_message_id),
            first_message_id: ActiveValue::Set(self.entity.first_message_id),
            archive_message_id: ActiveValue::Set(self.entity.archive_message_id),
            log_message_id: ActiveValue::Set(self.entity.log_message_id),
            channel_topic: ActiveValue::Set(self.entity.channel_topic),
            message_count: ActiveValue::Set(self.entity.message_count),
            last_priority_change: ActiveValue::Set(self.entity.last_priority_change),
            created_at: ActiveValue::Set(self.entity.created_at),
            deleted_at: ActiveValue::Set(self.entity.deleted_at),
        }
        .insert(self.db)
        .await
    }
}

/// Creates a ticket with default values.
///
/// Shorthand for `TicketFactory::new(db).build().await`.
///
/// # Arguments
/// - `db` - Database connection
///
/// # Returns
/// - `Ok(entity::ticket::Model)` - Created ticket entity
/// - `Err(DbErr)` - Database error during insert
pub async fn create_ticket(db: &DatabaseConnection) -> Result<entity::ticket::Model, DbErr> {
    TicketFactory::new(db).build().await
}
