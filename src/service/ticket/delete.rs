//! Guarded terminal deletion.
//!
//! Deletion is the only transition that removes the platform channel. Entry
//! is a conditional update into the transient `deleting` state, so two
//! concurrent triggers (double-click, scheduler racing a human) cannot both
//! proceed. A missing channel is treated as already-removed, not a failure.

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use serenity::all::ChannelId;
use serenity::http::Http;

use crate::actor::ActorContext;
use crate::data::ticket::TicketRepository;
use crate::error::{ticket::TicketError, AppError};
use crate::model::ticket::{Ticket, TicketStatus};
use crate::service::notify::{TicketEvent, TicketNotifier};
use crate::settings::Settings;
use crate::util::parse::parse_u64_from_string;

use super::{is_unknown_target, TicketService, COLOR_NEGATIVE};

impl TicketService<'_> {
    /// Deletes a ticket: transcript/log/DM dispatch, channel removal, terminal record.
    ///
    /// With a configured countdown the channel removal is deferred; the
    /// ticket stays in `deleting` until the timer fires and the record is
    /// finalized in the background.
    ///
    /// # Arguments
    /// - `actor` - Acting identity; support-only when the type restricts deletion
    /// - `ticket_id` - Ticket to delete
    ///
    /// # Returns
    /// - `Ok(())` - Deletion performed or scheduled
    /// - `Err(TicketError::AlreadyInProgress)` - A concurrent delete owns the transition
    /// - `Err(TicketError::AlreadyDeleted)` - Ticket already terminal
    pub async fn delete(&self, actor: &dyn ActorContext, ticket_id: i64) -> Result<(), AppError> {
        let ticket = self.require_ticket(ticket_id).await?;
        let config = self.settings.ticket_type(&ticket.ticket_type)?;

        if config.restrict_deletion {
            self.ensure_support(actor, config)?;
        }

        self.begin_delete_or_fail(ticket_id).await?;

        let countdown = self.settings.deletion_countdown_secs;
        if countdown == 0 {
            return finalize_delete(
                self.db,
                self.http.clone(),
                self.settings.clone(),
                ticket,
                actor.actor_name().to_string(),
            )
            .await;
        }

        let channel_id = parse_u64_from_string(ticket.channel_id.clone())?;
        if let Err(err) = self
            .announce(
                channel_id,
                "Ticket deletion",
                format!("This ticket will be deleted in {} seconds.", countdown),
                COLOR_NEGATIVE,
            )
            .await
        {
            tracing::error!(
                "Failed to post deletion countdown for ticket {}: {}",
                ticket_id,
                err
            );
        }

        let db = self.db.clone();
        let http = self.http.clone();
        let settings = self.settings.clone();
        let actor_name = actor.actor_name().to_string();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_secs(countdown)).await;
            if let Err(err) = finalize_delete(&db, http, settings, ticket, actor_name).await {
                tracing::error!("Deferred ticket deletion failed: {}", err);
            }
        });

        Ok(())
    }

    /// Acquires the `deleting` transition or maps the loss to a domain error.
    pub(crate) async fn begin_delete_or_fail(&self, ticket_id: i64) -> Result<(), AppError> {
        let repo = TicketRepository::new(self.db);

        if repo.try_begin_delete(ticket_id).await? {
            return Ok(());
        }

        let current = repo.find_by_ticket_id(ticket_id).await?;
        let err = match current.map(|t| t.status) {
            Some(TicketStatus::Deleted) => TicketError::AlreadyDeleted,
            _ => TicketError::AlreadyInProgress,
        };
        Err(err.into())
    }
}

/// Finishes a deletion that already owns the `deleting` state.
///
/// Dispatches the post-transition notifications (transcript, moderation log,
/// closure DM) while the channel still exists, removes the channel, then
/// finalizes the record. A channel that is already gone counts as removed.
pub(crate) async fn finalize_delete(
    db: &DatabaseConnection,
    http: Arc<Http>,
    settings: Arc<Settings>,
    ticket: Ticket,
    actor_name: String,
) -> Result<(), AppError> {
    let notifier = TicketNotifier::new(db, http.clone(), settings);
    notifier
        .dispatch(TicketEvent::Deleted {
            ticket: ticket.clone(),
            actor_name,
        })
        .await;

    let channel_id = parse_u64_from_string(ticket.channel_id.clone())?;
    match ChannelId::new(channel_id).delete(&http).await {
        Ok(_) => {}
        Err(err) if is_unknown_target(&err) => {
            tracing::info!(
                "Channel for ticket {} was already gone, finalizing record",
                ticket.ticket_id
            );
        }
        Err(err) => return Err(err.into()),
    }

    TicketRepository::new(db).mark_deleted(ticket.ticket_id).await?;

    Ok(())
}
