//! Post-transition notification dispatch.
//!
//! The lifecycle engine commits a state transition first and then emits a
//! [`TicketEvent`]; this module consumes it. Everything here is best effort:
//! a failed transcript, log post or DM is logged and never affects the
//! correctness of the transition that already happened.

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use serenity::all::{ChannelId, CreateMessage};
use serenity::http::Http;

use crate::model::ticket::Ticket;
use crate::service::transcript::TranscriptService;
use crate::settings::Settings;

/// Event emitted by the engine after a committed transition.
pub enum TicketEvent {
    /// A ticket is being removed; the channel still exists at dispatch time.
    Deleted {
        ticket: Ticket,
        actor_name: String,
    },
}

/// Consumer for post-transition events.
pub struct TicketNotifier<'a> {
    db: &'a DatabaseConnection,
    http: Arc<Http>,
    settings: Arc<Settings>,
}

impl<'a> TicketNotifier<'a> {
    pub fn new(db: &'a DatabaseConnection, http: Arc<Http>, settings: Arc<Settings>) -> Self {
        Self { db, http, settings }
    }

    /// Handles one event, swallowing and logging every failure.
    pub async fn dispatch(&self, event: TicketEvent) {
        match event {
            TicketEvent::Deleted { ticket, actor_name } => {
                self.on_deleted(ticket, actor_name).await;
            }
        }
    }

    async fn on_deleted(&self, ticket: Ticket, actor_name: String) {
        let transcripts =
            TranscriptService::new(self.db, self.http.clone(), self.settings.clone());

        let transcript = match transcripts.generate(&ticket).await {
            Ok(transcript) => transcript,
            Err(err) => {
                tracing::error!(
                    "Transcript generation failed for ticket {}: {}",
                    ticket.ticket_id,
                    err
                );
                None
            }
        };

        if let Err(err) = transcripts
            .post_log(&ticket, transcript.as_ref(), &actor_name)
            .await
        {
            tracing::error!(
                "Moderation log post failed for ticket {}: {}",
                ticket.ticket_id,
                err
            );
        }

        if let Err(err) = transcripts
            .send_closure_dm(&ticket, transcript.as_ref())
            .await
        {
            tracing::error!(
                "Closure DM failed for ticket {}: {}",
                ticket.ticket_id,
                err
            );

            if self.settings.closure_dm.notify_failure_in_channel {
                if let Ok(channel_id) = ticket.channel_id.parse::<u64>() {
                    let notice = CreateMessage::new().content(format!(
                        "<@{}> I couldn't DM you the ticket summary.",
                        ticket.user_id
                    ));
                    if let Err(err) = ChannelId::new(channel_id)
                        .send_message(&self.http, notice)
                        .await
                    {
                        tracing::error!("DM failure notice also failed: {}", err);
                    }
                }
            }
        }
    }
}
