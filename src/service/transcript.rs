//! Transcript and moderation-log generation.
//!
//! Invoked from the close/delete flows through the notifier. Transcripts are
//! gated by a minimum-message threshold so instantly-closed tickets produce
//! no log noise. Text mode renders a flat chronological file saved under the
//! configured directory and attached to the log embed; web mode only emits a
//! deep link into an externally hosted viewer. The moderation-log embed is
//! posted regardless of the transcript gate.

use std::path::PathBuf;
use std::sync::Arc;

use sea_orm::DatabaseConnection;
use serenity::all::{
    ButtonStyle, ChannelId, CreateActionRow, CreateAttachment, CreateButton, CreateEmbed,
    CreateMessage, Timestamp, UserId,
};
use serenity::http::Http;

use crate::data::ticket::TicketRepository;
use crate::data::ticket_message::TicketMessageRepository;
use crate::error::AppError;
use crate::model::message::TicketMessage;
use crate::model::ticket::Ticket;
use crate::settings::{Settings, TranscriptMode};
use crate::util::parse::parse_u64_from_string;

/// Embed color for moderation-log entries.
const COLOR_LOG: u32 = 0x95a5a6;

/// A generated transcript in one of the two modes.
pub struct Transcript {
    pub file_name: String,
    /// Rendered text, present in text mode only.
    pub content: Option<String>,
    /// Viewer deep link, present in web mode only.
    pub web_url: Option<String>,
}

/// Service producing transcripts, log entries and closure DMs.
pub struct TranscriptService<'a> {
    db: &'a DatabaseConnection,
    http: Arc<Http>,
    settings: Arc<Settings>,
}

impl<'a> TranscriptService<'a> {
    pub fn new(db: &'a DatabaseConnection, http: Arc<Http>, settings: Arc<Settings>) -> Self {
        Self { db, http, settings }
    }

    /// Renders the flat chronological text transcript.
    ///
    /// # Arguments
    /// - `ticket` - The ticket being rendered
    /// - `questions` - Creation answers, in form order
    /// - `messages` - Recorded messages, oldest first
    ///
    /// # Returns
    /// - `String` - The complete transcript text
    pub fn render_text(
        ticket: &Ticket,
        questions: &[(String, String)],
        messages: &[TicketMessage],
    ) -> String {
        let mut out = String::new();

        out.push_str(&format!(
            "Ticket #{} ({})\nCreator: {} ({})\nCreated: {}\n",
            ticket.ticket_id,
            ticket.ticket_type,
            ticket.user_name,
            ticket.user_id,
            ticket.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        ));
        if let Some(closed_at) = ticket.closed_at {
            out.push_str(&format!(
                "Closed: {}\n",
                closed_at.format("%Y-%m-%d %H:%M:%S UTC")
            ));
        }
        if let Some(reason) = ticket
            .custom_close_reason
            .as_deref()
            .or(ticket.close_reason.as_deref())
        {
            out.push_str(&format!("Reason: {}\n", reason));
        }
        out.push('\n');

        for (question, answer) in questions {
            out.push_str(&format!("Q: {}\nA: {}\n", question, answer));
        }
        if !questions.is_empty() {
            out.push('\n');
        }

        for message in messages {
            out.push_str(&format!(
                "[{}] {}: {}\n",
                message.sent_at.format("%Y-%m-%d %H:%M:%S"),
                message.author_name,
                message.content
            ));
            for attachment in &message.attachments {
                out.push_str(&format!(
                    "    [attachment] {} — {}\n",
                    attachment.file_name, attachment.url
                ));
            }
        }

        out
    }

    /// Generates the transcript for a ticket, honoring mode and threshold.
    ///
    /// # Returns
    /// - `Ok(Some(Transcript))` - Transcript produced (text saved to disk, or web link)
    /// - `Ok(None)` - Transcripts disabled or below the message threshold
    /// - `Err(AppError)` - Store or filesystem failure
    pub async fn generate(&self, ticket: &Ticket) -> Result<Option<Transcript>, AppError> {
        let config = &self.settings.transcript;

        if !config.save {
            return Ok(None);
        }
        if (ticket.message_count.max(0) as u32) < config.min_messages {
            return Ok(None);
        }

        let file_name = format!("ticket-{}.txt", ticket.ticket_id);

        match config.mode {
            TranscriptMode::Web => {
                let url = config
                    .web_url_template
                    .replace("{guild}", &ticket.guild_id)
                    .replace("{ticket}", &ticket.ticket_id.to_string())
                    .replace("{channel}", &ticket.channel_id);

                Ok(Some(Transcript {
                    file_name,
                    content: None,
                    web_url: Some(url),
                }))
            }
            TranscriptMode::Text => {
                let questions = TicketRepository::new(self.db)
                    .questions_for_ticket(ticket.ticket_id)
                    .await?;
                let messages = TicketMessageRepository::new(self.db)
                    .messages_for_ticket(ticket.ticket_id)
                    .await?;

                let content = Self::render_text(ticket, &questions, &messages);

                let dir = PathBuf::from(&config.save_path);
                tokio::fs::create_dir_all(&dir).await?;
                tokio::fs::write(dir.join(&file_name), &content).await?;

                Ok(Some(Transcript {
                    file_name,
                    content: Some(content),
                    web_url: None,
                }))
            }
        }
    }

    /// Posts the moderation-log embed, attaching the transcript when present.
    ///
    /// # Arguments
    /// - `ticket` - The ticket being logged
    /// - `transcript` - Generated transcript, if the gate passed
    /// - `actor_name` - Who performed the closing/deleting action
    ///
    /// # Returns
    /// - `Ok(())` - Log posted (or no log channel configured)
    /// - `Err(AppError)` - Discord or store failure
    pub async fn post_log(
        &self,
        ticket: &Ticket,
        transcript: Option<&Transcript>,
        actor_name: &str,
    ) -> Result<(), AppError> {
        let Some(log_channel) = &self.settings.log_channel else {
            return Ok(());
        };
        let log_channel = parse_u64_from_string(log_channel.clone())?;

        let mut embed = self
            .summary_embed(ticket)
            .title(format!("Ticket #{} closed", ticket.ticket_id))
            .field("Closed by", actor_name.to_string(), true);

        if let Some(url) = transcript.and_then(|t| t.web_url.as_deref()) {
            embed = embed.field("Transcript", url.to_string(), false);
        }

        let mut message = CreateMessage::new().embed(embed);
        if let Some(content) = transcript.and_then(|t| t.content.as_deref()) {
            let name = transcript.map(|t| t.file_name.clone()).unwrap_or_default();
            message = message.add_file(CreateAttachment::bytes(content.as_bytes().to_vec(), name));
        }

        let posted = ChannelId::new(log_channel)
            .send_message(&self.http, message)
            .await?;

        TicketRepository::new(self.db)
            .set_log_message_id(ticket.ticket_id, &posted.id.to_string())
            .await?;

        Ok(())
    }

    /// DMs the closure summary (and optionally the transcript and a rating
    /// prompt) to the ticket owner.
    ///
    /// # Returns
    /// - `Ok(())` - DM sent or DMs disabled
    /// - `Err(AppError)` - Delivery failed; the caller treats this as non-fatal
    pub async fn send_closure_dm(
        &self,
        ticket: &Ticket,
        transcript: Option<&Transcript>,
    ) -> Result<(), AppError> {
        if !self.settings.closure_dm.enabled {
            return Ok(());
        }

        let user_id = parse_u64_from_string(ticket.user_id.clone())?;
        let dm = UserId::new(user_id).create_dm_channel(&self.http).await?;

        let embed = self
            .summary_embed(ticket)
            .title(format!("Your ticket #{} was closed", ticket.ticket_id));

        let mut message = CreateMessage::new().embed(embed);

        if self.settings.closure_dm.attach_transcript {
            if let Some(content) = transcript.and_then(|t| t.content.as_deref()) {
                let name = transcript.map(|t| t.file_name.clone()).unwrap_or_default();
                message =
                    message.add_file(CreateAttachment::bytes(content.as_bytes().to_vec(), name));
            }
        }

        if self.settings.reviews.enabled {
            let buttons = (1..=5)
                .map(|stars| {
                    CreateButton::new(format!("ticket-review-{}", stars))
                        .label(format!("{}★", stars))
                        .style(ButtonStyle::Secondary)
                })
                .collect();
            message = message.components(vec![CreateActionRow::Buttons(buttons)]);
        }

        dm.id.send_message(&self.http, message).await?;

        Ok(())
    }

    fn summary_embed(&self, ticket: &Ticket) -> CreateEmbed {
        let reason = ticket
            .custom_close_reason
            .as_deref()
            .or(ticket.close_reason.as_deref())
            .unwrap_or("No reason given");

        let claimer = ticket
            .claimed_by
            .as_ref()
            .map(|c| format!("<@{}>", c))
            .unwrap_or_else(|| "Nobody".to_string());

        CreateEmbed::new()
            .color(COLOR_LOG)
            .field("Owner", format!("<@{}>", ticket.user_id), true)
            .field("Type", ticket.ticket_type.clone(), true)
            .field("Priority", ticket.priority.clone(), true)
            .field("Claimed by", claimer, true)
            .field("Messages", ticket.message_count.to_string(), true)
            .field("Reason", reason.to_string(), true)
            .timestamp(Timestamp::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::message::Attachment;
    use chrono::{TimeZone, Utc};

    fn sample_ticket() -> Ticket {
        Ticket {
            ticket_id: 7,
            guild_id: "1".to_string(),
            channel_id: "2".to_string(),
            user_id: "3".to_string(),
            user_name: "alex".to_string(),
            ticket_type: "support".to_string(),
            priority: "High".to_string(),
            status: crate::model::ticket::TicketStatus::Closed,
            claimed: false,
            claimed_by: None,
            close_reason: Some("Resolved".to_string()),
            custom_close_reason: None,
            closed_at: Some(Utc.with_ymd_and_hms(2026, 8, 5, 10, 0, 0).unwrap()),
            rating: None,
            review_feedback: None,
            alert_time: None,
            alert_reason: None,
            alert_message_id: None,
            first_message_id: None,
            archive_message_id: None,
            log_message_id: None,
            channel_topic: None,
            message_count: 2,
            last_priority_change: None,
            created_at: Utc.with_ymd_and_hms(2026, 8, 5, 9, 0, 0).unwrap(),
            deleted_at: None,
        }
    }

    #[test]
    fn renders_header_questions_and_messages_in_order() {
        let questions = vec![("What broke?".to_string(), "The printer".to_string())];
        let messages = vec![
            TicketMessage {
                id: 1,
                ticket_id: 7,
                author_id: "3".to_string(),
                author_name: "alex".to_string(),
                content: "hello".to_string(),
                sent_at: Utc.with_ymd_and_hms(2026, 8, 5, 9, 1, 0).unwrap(),
                attachments: vec![],
            },
            TicketMessage {
                id: 2,
                ticket_id: 7,
                author_id: "4".to_string(),
                author_name: "sam".to_string(),
                content: "on it".to_string(),
                sent_at: Utc.with_ymd_and_hms(2026, 8, 5, 9, 2, 0).unwrap(),
                attachments: vec![Attachment {
                    file_name: "screenshot.png".to_string(),
                    url: "https://cdn.example.com/screenshot.png".to_string(),
                    content_type: None,
                    data: None,
                }],
            },
        ];

        let text = TranscriptService::render_text(&sample_ticket(), &questions, &messages);

        assert!(text.contains("Ticket #7 (support)"));
        assert!(text.contains("Reason: Resolved"));
        assert!(text.contains("Q: What broke?"));
        assert!(text.contains("A: The printer"));
        assert!(text.contains("alex: hello"));
        assert!(text.contains("sam: on it"));
        assert!(text.contains("https://cdn.example.com/screenshot.png"));

        let hello = text.find("alex: hello").unwrap();
        let reply = text.find("sam: on it").unwrap();
        assert!(hello < reply);
    }

    #[test]
    fn custom_reason_wins_over_configured_reason() {
        let mut ticket = sample_ticket();
        ticket.custom_close_reason = Some("Duplicate of #5".to_string());

        let text = TranscriptService::render_text(&ticket, &[], &[]);

        assert!(text.contains("Reason: Duplicate of #5"));
        assert!(!text.contains("Reason: Resolved"));
    }
}
