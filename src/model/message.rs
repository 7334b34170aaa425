//! Domain models for recorded ticket messages.

use chrono::{DateTime, Utc};

/// Attachment captured alongside a recorded message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub url: String,
    pub content_type: Option<String>,
    /// Gzip-compressed bytes when the attachment was small enough to store.
    pub data: Option<Vec<u8>>,
}

/// One recorded channel message with its attachments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketMessage {
    pub id: i32,
    pub ticket_id: i64,
    pub author_id: String,
    pub author_name: String,
    pub content: String,
    pub sent_at: DateTime<Utc>,
    pub attachments: Vec<Attachment>,
}

impl TicketMessage {
    /// Converts a message entity and its attachment entities into a domain model.
    ///
    /// # Arguments
    /// - `entity` - Message entity from the database
    /// - `attachments` - Attachment entities belonging to the message
    ///
    /// # Returns
    /// - `TicketMessage` - The converted message domain model
    pub fn from_entity(
        entity: entity::ticket_message::Model,
        attachments: Vec<entity::ticket_attachment::Model>,
    ) -> Self {
        Self {
            id: entity.id,
            ticket_id: entity.ticket_id,
            author_id: entity.author_id,
            author_name: entity.author_name,
            content: entity.content,
            sent_at: entity.sent_at,
            attachments: attachments
                .into_iter()
                .map(|a| Attachment {
                    file_name: a.file_name,
                    url: a.url,
                    content_type: a.content_type,
                    data: a.data,
                })
                .collect(),
        }
    }
}

/// Parameters for recording one channel message against a ticket.
#[derive(Debug, Clone)]
pub struct RecordMessageParams {
    pub ticket_id: i64,
    pub author_id: u64,
    pub author_name: String,
    pub content: String,
    pub sent_at: DateTime<Utc>,
    pub attachments: Vec<Attachment>,
}
