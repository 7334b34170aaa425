//! Closing tickets: archive or delete depending on the type.
//!
//! A type with an archive category keeps the closed channel around in a
//! restricted category with an archive control panel; a type without one
//! treats close as immediate deletion. A silent close skips every
//! announcement, log and DM and removes the channel directly.

use serenity::all::{
    ButtonStyle, ChannelId, CreateActionRow, CreateButton, CreateEmbed, CreateMessage, EditChannel,
    Timestamp,
};

use crate::actor::ActorContext;
use crate::data::ticket::TicketRepository;
use crate::error::{ticket::TicketError, AppError};
use crate::model::ticket::{Ticket, TicketStatus};
use crate::service::permission::PermissionRegime;
use crate::settings::TicketTypeConfig;
use crate::util::parse::parse_u64_from_string;

use super::{delete::finalize_delete, is_unknown_target, TicketService, COLOR_NEGATIVE};

/// Parameters for the close flow.
#[derive(Debug, Clone, Default)]
pub struct CloseRequest {
    /// Configured close reason, if one was selected.
    pub reason: Option<String>,
    /// Free-text reason, if one was given.
    pub custom_reason: Option<String>,
    /// Skip announcements, transcript, log and DM; delete directly.
    pub silent: bool,
}

impl TicketService<'_> {
    /// Closes a ticket.
    ///
    /// - Silent: straight to deletion, no side effects.
    /// - Archive category configured: status becomes `closed`, the channel
    ///   moves to the archive category with read-only creator access and an
    ///   archive control panel. The channel is NOT deleted.
    /// - No archive category: status becomes `closed`, then the deletion flow
    ///   runs synchronously with transcript/log/DM dispatch.
    ///
    /// # Arguments
    /// - `actor` - Acting identity; support-only when the type restricts closing
    /// - `ticket_id` - Ticket to close
    /// - `request` - Reason and mode
    ///
    /// # Returns
    /// - `Ok(())` - Ticket closed (and possibly deleted)
    /// - `Err(TicketError::AlreadyDeleted)` - Ticket already past closing
    pub async fn close(
        &self,
        actor: &dyn ActorContext,
        ticket_id: i64,
        request: CloseRequest,
    ) -> Result<(), AppError> {
        let ticket = self.require_ticket(ticket_id).await?;

        if matches!(
            ticket.status,
            TicketStatus::Deleting | TicketStatus::Deleted
        ) {
            return Err(TicketError::AlreadyDeleted.into());
        }

        let config = self.settings.ticket_type(&ticket.ticket_type)?;
        if config.restrict_closing {
            self.ensure_support(actor, config)?;
        }

        if request.silent {
            return self.close_silently(&ticket).await;
        }

        let repo = TicketRepository::new(self.db);

        match config.archive_category.clone() {
            Some(archive) => {
                if ticket.status == TicketStatus::Closed {
                    // Close on an archived ticket only re-asserts the archive
                    // placement; the move is skipped when already there.
                    self.ensure_archived(&ticket, config, &archive).await?;
                    return Ok(());
                }

                if !repo
                    .close(
                        ticket_id,
                        request.reason.as_deref(),
                        request.custom_reason.as_deref(),
                    )
                    .await?
                {
                    return Err(TicketError::AlreadyInProgress.into());
                }

                self.ensure_archived(&ticket, config, &archive).await?;
                self.post_archive_panel(&repo, &ticket, actor, &request)
                    .await?;

                Ok(())
            }
            None => {
                if !repo
                    .close(
                        ticket_id,
                        request.reason.as_deref(),
                        request.custom_reason.as_deref(),
                    )
                    .await?
                {
                    return Err(TicketError::AlreadyInProgress.into());
                }

                self.begin_delete_or_fail(ticket_id).await?;

                let refreshed = self.require_ticket(ticket_id).await?;
                finalize_delete(
                    self.db,
                    self.http.clone(),
                    self.settings.clone(),
                    refreshed,
                    actor.actor_name().to_string(),
                )
                .await
            }
        }
    }

    /// Silent close: no announcements, no transcript, no log, no DM.
    async fn close_silently(&self, ticket: &Ticket) -> Result<(), AppError> {
        self.begin_delete_or_fail(ticket.ticket_id).await?;

        let channel_id = parse_u64_from_string(ticket.channel_id.clone())?;
        match ChannelId::new(channel_id).delete(&self.http).await {
            Ok(_) => {}
            Err(err) if is_unknown_target(&err) => {}
            Err(err) => return Err(err.into()),
        }

        TicketRepository::new(self.db)
            .mark_deleted(ticket.ticket_id)
            .await?;

        Ok(())
    }

    /// Moves the channel into the archive category and applies the archived
    /// permission regime. The category move is skipped when the channel is
    /// already parented there; permissions are re-asserted either way.
    ///
    /// Also used by the alert scheduler's escalation path, which shelves the
    /// channel directly without the interactive close flow.
    pub(crate) async fn ensure_archived(
        &self,
        ticket: &Ticket,
        config: &TicketTypeConfig,
        archive_category: &str,
    ) -> Result<(), AppError> {
        let channel_id = parse_u64_from_string(ticket.channel_id.clone())?;
        let archive_id = parse_u64_from_string(archive_category.to_string())?;

        let already_archived = self
            .http
            .get_channel(ChannelId::new(channel_id))
            .await
            .ok()
            .and_then(|c| c.guild())
            .and_then(|c| c.parent_id)
            .map(|parent| parent.get() == archive_id)
            .unwrap_or(false);

        let guild_id = parse_u64_from_string(ticket.guild_id.clone())?;
        let creator = parse_u64_from_string(ticket.user_id.clone())?;
        let support_roles = Self::support_role_ids(config);
        let overwrites = crate::service::permission::project(
            PermissionRegime::Archived,
            &crate::service::permission::PermissionInputs {
                everyone_role: serenity::all::RoleId::new(guild_id),
                creator: serenity::all::UserId::new(creator),
                support_roles: &support_roles,
                bot: serenity::all::UserId::new(self.bot_id),
            },
        );

        let mut edit = EditChannel::new().permissions(overwrites);
        if !already_archived {
            edit = edit.category(ChannelId::new(archive_id));
        }

        ChannelId::new(channel_id).edit(&self.http, edit).await?;

        Ok(())
    }

    /// Posts the archive control panel (Reopen/Delete/Transcript).
    async fn post_archive_panel(
        &self,
        repo: &TicketRepository<'_>,
        ticket: &Ticket,
        actor: &dyn ActorContext,
        request: &CloseRequest,
    ) -> Result<(), AppError> {
        let channel_id = parse_u64_from_string(ticket.channel_id.clone())?;

        let reason = request
            .custom_reason
            .clone()
            .or_else(|| request.reason.clone())
            .unwrap_or_else(|| "No reason given".to_string());

        let embed = CreateEmbed::new()
            .title("Ticket closed")
            .description(format!(
                "Closed by **{}**.\n**Reason:** {}",
                actor.actor_name(),
                reason
            ))
            .color(COLOR_NEGATIVE)
            .timestamp(Timestamp::now());

        let buttons = vec![
            CreateButton::new("ticket-reopen")
                .label("Reopen")
                .style(ButtonStyle::Primary),
            CreateButton::new("ticket-delete")
                .label("Delete")
                .style(ButtonStyle::Danger),
            CreateButton::new("ticket-transcript")
                .label("Transcript")
                .style(ButtonStyle::Secondary),
        ];

        let panel = ChannelId::new(channel_id)
            .send_message(
                &self.http,
                CreateMessage::new()
                    .embed(embed)
                    .components(vec![CreateActionRow::Buttons(buttons)]),
            )
            .await?;

        repo.set_archive_message_id(ticket.ticket_id, &panel.id.to_string())
            .await?;

        Ok(())
    }
}
