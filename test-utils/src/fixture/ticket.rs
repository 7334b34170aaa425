//! Ticket fixtures for creating in-memory test data.
//!
//! Provides fixture functions for creating ticket entity models without database
//! insertion. These are useful for unit testing, mocking, and providing consistent
//! default values.

use chrono::{DateTime, Utc};
use entity::ticket;

/// Default test guild ID for tickets.
pub const DEFAULT_GUILD_ID: &str = "900100200300400500";

/// Default test channel ID for tickets.
pub const DEFAULT_CHANNEL_ID: &str = "900100200300400501";

/// Default ticket creator ID.
pub const DEFAULT_USER_ID: &str = "123456789";

/// Default ticket creator display name.
pub const DEFAULT_USER_NAME: &str = "testuser";

/// Default ticket type key.
pub const DEFAULT_TICKET_TYPE: &str = "support";

/// Default ticket priority.
pub const DEFAULT_PRIORITY: &str = "Medium";

/// Default ticket status.
pub const DEFAULT_STATUS: &str = "open";

/// Creates a ticket entity model with default values.
///
/// This function creates an in-memory ticket entity without inserting into the
/// database. Use this for unit tests and mocking repository responses.
///
/// # Returns
/// - `ticket::Model` - In-memory ticket entity
///
/// # Example
///
/// ```rust,ignore
/// use test_utils::fixture;
///
/// let ticket = fixture::ticket::entity();
/// assert_eq!(ticket.status, "open");
/// ```
pub fn entity() -> ticket::Model {
    entity_builder().build()
}

/// Creates a ticket entity builder for customization.
///
/// Provides a builder pattern for creating ticket entities with custom values
/// while keeping sensible defaults for unspecified fields.
///
/// # Returns
/// - `TicketEntityBuilder` - Builder instance with default values
///
/// # Example
///
/// ```rust,ignore
/// use test_utils::fixture;
///
/// let ticket = fixture::ticket::entity_builder()
///     .status("closed")
///     .priority("High")
///     .build();
/// ```
pub fn entity_builder() -> TicketEntityBuilder {
    TicketEntityBuilder::default()
}

/// Builder for creating customized ticket entity models.
///
/// Provides a fluent interface for building ticket entities with custom values.
/// All fields have sensible defaults that can be overridden.
pub struct TicketEntityBuilder {
    ticket_id: i64,
    guild_id: String,
    channel_id: String,
    user_id: String,
    user_name: String,
    ticket_type: String,
    priority: String,
    status: String,
    claimed: bool,
    claimed_by: Option<String>,
    alert_time: Option<DateTime<Utc>>,
    message_count: i32,
    closed_at: Option<DateTime<Utc>>,
    rating: Option<String>,
    last_priority_change: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl Default for TicketEntityBuilder {
    fn default() -> Self {
        Self {
            ticket_id: 1,
            guild_id: DEFAULT_GUILD_ID.to_string(),
            channel_id: DEFAULT_CHANNEL_ID.to_string(),
            user_id: DEFAULT_USER_ID.to_string(),
            user_name: DEFAULT_USER_NAME.to_string(),
            ticket_type: DEFAULT_TICKET_TYPE.to_string(),
            priority: DEFAULT_PRIORITY.to_string(),
            status: DEFAULT_STATUS.to_string(),
            claimed: false,
            claimed_by: None,
            alert_time: None,
            message_count: 0,
            closed_at: None,
            rating: None,
            last_priority_change: None,
            created_at: Utc::now(),
        }
    }
}

impl TicketEntityBuilder {
    /// Sets the ticket ID.
    pub fn ticket_id(mut self, ticket_id: i64) -> Self {
        self.ticket_id = ticket_id;
        self
    }

    /// Sets the guild ID.
    pub fn guild_id(mut self, guild_id: impl Into<String>) -> Self {
        self.guild_id = guild_id.into();
        self
    }

    /// Sets the channel ID.
    pub fn channel_id(mut self, channel_id: impl Into<String>) -> Self {
        self.channel_id = channel_id.into();
        self
    }

    /// Sets the creator's user ID.
    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Sets the creator's display name.
    pub fn user_name(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = user_name.into();
        self
    }

    /// Sets the ticket type key.
    pub fn ticket_type(mut self, ticket_type: impl Into<String>) -> Self {
        self.ticket_type = ticket_type.into();
        self
    }

    /// Sets the priority level.
    pub fn priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = priority.into();
        self
    }

    /// Sets the lifecycle status.
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Sets the claim state. A `Some` claimer implies `claimed = true`.
    pub fn claimed_by(mut self, claimed_by: Option<String>) -> Self {
        self.claimed = claimed_by.is_some();
        self.claimed_by = claimed_by;
        self
    }

    /// Sets the pending alert deadline.
    pub fn alert_time(mut self, alert_time: Option<DateTime<Utc>>) -> Self {
        self.alert_time = alert_time;
        self
    }

    /// Sets the recorded message count.
    pub fn message_count(mut self, message_count: i32) -> Self {
        self.message_count = message_count;
        self
    }

    /// Sets the closure timestamp.
    pub fn closed_at(mut self, closed_at: Option<DateTime<Utc>>) -> Self {
        self.closed_at = closed_at;
        self
    }

    /// Sets the review rating.
    pub fn rating(mut self, rating: Option<String>) -> Self {
        self.rating = rating;
        self
    }

    /// Sets the last priority change timestamp.
    pub fn last_priority_change(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.last_priority_change = at;
        self
    }

    /// Sets the creation timestamp.
    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Builds and returns the ticket entity model.
    ///
    /// # Returns
    /// - `ticket::Model` - In-memory ticket entity with configured values
    pub fn build(self) -> ticket::Model {
        ticket::Model {
            ticket_id: self.ticket_id,
            guild_id: self.guild_id,
            channel_id: self.channel_id,
            user_id: self.user_id,
            user_name: self.user_name,
            ticket_type: self.ticket_type,
            priority: self.priority,
            status: self.status,
            claimed: self.claimed,
            claimed_by: self.claimed_by,
            claim_guard: false,
            close_reason: None,
            custom_close_reason: None,
            closed_at: self.closed_at,
            rating: self.rating,
            review_feedback: None,
            alert_time: self.alert_time,
            alert_reason: None,
            alert_message_id: None,
            first_message_id: None,
            archive_message_id: None,
            log_message_id: None,
            channel_topic: None,
            message_count: self.message_count,
            last_priority_change: self.last_priority_change,
            created_at: self.created_at,
            deleted_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_entity_with_defaults() {
        let ticket = entity();

        assert_eq!(ticket.ticket_id, 1);
        assert_eq!(ticket.guild_id, DEFAULT_GUILD_ID);
        assert_eq!(ticket.user_id, DEFAULT_USER_ID);
        assert_eq!(ticket.ticket_type, DEFAULT_TICKET_TYPE);
        assert_eq!(ticket.status, DEFAULT_STATUS);
        assert!(!ticket.claimed);
        assert!(ticket.claimed_by.is_none());
        assert!(!ticket.claim_guard);
        assert_eq!(ticket.message_count, 0);
    }

    #[test]
    fn builder_creates_entity_with_custom_values() {
        let ticket = entity_builder()
            .ticket_id(42)
            .status("closed")
            .priority("High")
            .claimed_by(Some("555".to_string()))
            .message_count(7)
            .build();

        assert_eq!(ticket.ticket_id, 42);
        assert_eq!(ticket.status, "closed");
        assert_eq!(ticket.priority, "High");
        assert!(ticket.claimed);
        assert_eq!(ticket.claimed_by, Some("555".to_string()));
        assert_eq!(ticket.message_count, 7);
    }

    #[test]
    fn claimed_by_none_clears_claim_flag() {
        let ticket = entity_builder().claimed_by(None).build();

        assert!(!ticket.claimed);
        assert!(ticket.claimed_by.is_none());
    }
}
