//! Recording channel traffic against tickets.
//!
//! Every non-bot message in a channel that maps to an open ticket is appended
//! to the ticket's history. Small attachments are downloaded and stored
//! gzip-compressed; anything over the cap keeps only its URL. Recording is
//! best effort: the caller logs failures and the channel traffic itself is
//! never affected.

use std::io::Write;

use chrono::Utc;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::data::ticket::TicketRepository;
use crate::data::ticket_message::TicketMessageRepository;
use crate::error::AppError;
use crate::model::message::{Attachment, RecordMessageParams};
use crate::model::ticket::TicketStatus;

use super::TicketService;

/// Attachments above this size keep only their URL.
const MAX_STORED_ATTACHMENT_BYTES: u32 = 2 * 1024 * 1024;

impl TicketService<'_> {
    /// Records one channel message against the ticket bound to its channel.
    ///
    /// No-op for bot authors, channels without a ticket, and tickets that are
    /// no longer open.
    ///
    /// # Arguments
    /// - `message` - The gateway message
    ///
    /// # Returns
    /// - `Ok(())` - Recorded (or intentionally skipped)
    /// - `Err(AppError)` - Store failure; the caller logs and moves on
    pub async fn record_message(&self, message: &serenity::all::Message) -> Result<(), AppError> {
        if message.author.bot {
            return Ok(());
        }

        let repo = TicketRepository::new(self.db);
        let Some(ticket) = repo
            .find_by_channel_id(&message.channel_id.to_string())
            .await?
        else {
            return Ok(());
        };

        if ticket.status != TicketStatus::Open {
            return Ok(());
        }

        let mut attachments = Vec::with_capacity(message.attachments.len());
        for attachment in &message.attachments {
            let data = if attachment.size <= MAX_STORED_ATTACHMENT_BYTES {
                match attachment.download().await {
                    Ok(bytes) => match compress(&bytes) {
                        Ok(compressed) => Some(compressed),
                        Err(err) => {
                            tracing::error!(
                                "Failed to compress attachment {}: {}",
                                attachment.filename,
                                err
                            );
                            None
                        }
                    },
                    Err(err) => {
                        tracing::error!(
                            "Failed to download attachment {}: {}",
                            attachment.filename,
                            err
                        );
                        None
                    }
                }
            } else {
                None
            };

            attachments.push(Attachment {
                file_name: attachment.filename.clone(),
                url: attachment.url.clone(),
                content_type: attachment.content_type.clone(),
                data,
            });
        }

        TicketMessageRepository::new(self.db)
            .record(RecordMessageParams {
                ticket_id: ticket.ticket_id,
                author_id: message.author.id.get(),
                author_name: message.author.name.clone(),
                content: message.content.clone(),
                sent_at: message.timestamp.with_timezone(&Utc),
                attachments,
            })
            .await?;

        Ok(())
    }
}

/// Gzip-compresses attachment bytes for storage.
pub(crate) fn compress(bytes: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    encoder.finish()
}
