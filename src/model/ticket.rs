//! Domain models for ticket data operations.

use chrono::{DateTime, Utc};

/// Lifecycle state of a ticket.
///
/// `Deleting` is a transient guard state: a ticket enters it exactly once (via
/// a conditional update) and either finishes in `Deleted` or stays there while
/// a deletion countdown runs. `Deleted` is terminal; the record is kept as a
/// read-only audit artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketStatus {
    Open,
    Closed,
    Deleting,
    Deleted,
}

impl TicketStatus {
    /// Stored string form of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::Closed => "closed",
            TicketStatus::Deleting => "deleting",
            TicketStatus::Deleted => "deleted",
        }
    }

    /// Parses the stored string form.
    ///
    /// # Returns
    /// - `Some(status)` - Known status string
    /// - `None` - Unknown value
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "open" => Some(TicketStatus::Open),
            "closed" => Some(TicketStatus::Closed),
            "deleting" => Some(TicketStatus::Deleting),
            "deleted" => Some(TicketStatus::Deleted),
            _ => None,
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Support ticket with lifecycle, claim, alert and closure state.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticket {
    /// Monotonically assigned ticket number, unique across the store.
    pub ticket_id: i64,
    pub guild_id: String,
    /// Channel bound 1:1 to this ticket while it is open or closed.
    pub channel_id: String,
    /// Discord ID of the ticket creator (stored as String).
    pub user_id: String,
    pub user_name: String,
    /// Key into the ticket-type catalog.
    pub ticket_type: String,
    pub priority: String,
    pub status: TicketStatus,
    pub claimed: bool,
    pub claimed_by: Option<String>,
    pub close_reason: Option<String>,
    pub custom_close_reason: Option<String>,
    pub closed_at: Option<DateTime<Utc>>,
    pub rating: Option<String>,
    pub review_feedback: Option<String>,
    /// Deadline at which the alert scheduler acts on this ticket.
    pub alert_time: Option<DateTime<Utc>>,
    pub alert_reason: Option<String>,
    pub alert_message_id: Option<String>,
    /// Control-panel message carrying the Claim/Close buttons.
    pub first_message_id: Option<String>,
    /// Archive-control message carrying the Reopen/Delete/Transcript buttons.
    pub archive_message_id: Option<String>,
    /// Moderation-log entry, updated later with review data.
    pub log_message_id: Option<String>,
    pub channel_topic: Option<String>,
    pub message_count: i32,
    pub last_priority_change: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Ticket {
    /// Converts an entity model to a ticket domain model at the repository boundary.
    ///
    /// Unknown status strings are treated as `open` so the record stays
    /// actionable rather than wedging the engine.
    ///
    /// # Arguments
    /// - `entity` - The entity model from the database
    ///
    /// # Returns
    /// - `Ticket` - The converted ticket domain model
    pub fn from_entity(entity: entity::ticket::Model) -> Self {
        Self {
            ticket_id: entity.ticket_id,
            guild_id: entity.guild_id,
            channel_id: entity.channel_id,
            user_id: entity.user_id,
            user_name: entity.user_name,
            ticket_type: entity.ticket_type,
            priority: entity.priority,
            status: TicketStatus::parse(&entity.status).unwrap_or(TicketStatus::Open),
            claimed: entity.claimed,
            claimed_by: entity.claimed_by,
            close_reason: entity.close_reason,
            custom_close_reason: entity.custom_close_reason,
            closed_at: entity.closed_at,
            rating: entity.rating,
            review_feedback: entity.review_feedback,
            alert_time: entity.alert_time,
            alert_reason: entity.alert_reason,
            alert_message_id: entity.alert_message_id,
            first_message_id: entity.first_message_id,
            archive_message_id: entity.archive_message_id,
            log_message_id: entity.log_message_id,
            channel_topic: entity.channel_topic,
            message_count: entity.message_count,
            last_priority_change: entity.last_priority_change,
            created_at: entity.created_at,
            deleted_at: entity.deleted_at,
        }
    }
}

/// Parameters for persisting a newly created ticket.
///
/// The record is only written after the dedicated channel exists, so the
/// channel id is always known here.
#[derive(Debug, Clone)]
pub struct CreateTicketParams {
    pub guild_id: u64,
    pub channel_id: u64,
    pub user_id: u64,
    pub user_name: String,
    pub ticket_type: String,
    pub priority: String,
    pub channel_topic: Option<String>,
    /// Question/answer pairs collected during the creation flow, in order.
    pub questions: Vec<(String, String)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_string_form() {
        for status in [
            TicketStatus::Open,
            TicketStatus::Closed,
            TicketStatus::Deleting,
            TicketStatus::Deleted,
        ] {
            assert_eq!(TicketStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn unknown_status_does_not_parse() {
        assert_eq!(TicketStatus::parse("archived"), None);
    }
}
