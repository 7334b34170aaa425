//! Restoring an archived ticket.

use serenity::all::{ChannelId, EditChannel, MessageId};

use crate::actor::ActorContext;
use crate::data::ticket::TicketRepository;
use crate::error::{ticket::TicketError, AppError};
use crate::model::ticket::TicketStatus;
use crate::service::permission::PermissionRegime;
use crate::util::parse::parse_u64_from_string;

use super::{TicketService, COLOR_POSITIVE};

impl TicketService<'_> {
    /// Reopens a closed (archived) ticket.
    ///
    /// Restores `open` status, moves the channel back to the type's live
    /// category, resets the standard open-ticket permission set, removes the
    /// archive control panel and posts a reopened notice.
    ///
    /// # Arguments
    /// - `actor` - Acting identity; must hold a support role of the type
    /// - `ticket_id` - Ticket to reopen
    ///
    /// # Returns
    /// - `Ok(())` - Ticket is open again
    /// - `Err(TicketError::NotClosed)` - Ticket is not in `closed`
    /// - `Err(TicketError::AlreadyInProgress)` - Lost a race against another transition
    pub async fn reopen(&self, actor: &dyn ActorContext, ticket_id: i64) -> Result<(), AppError> {
        let ticket = self.require_ticket(ticket_id).await?;
        let config = self.settings.ticket_type(&ticket.ticket_type)?;
        self.ensure_support(actor, config)?;

        if ticket.status != TicketStatus::Closed {
            return Err(TicketError::NotClosed.into());
        }

        let repo = TicketRepository::new(self.db);
        if !repo.reopen(ticket_id).await? {
            return Err(TicketError::AlreadyInProgress.into());
        }

        let channel_id = parse_u64_from_string(ticket.channel_id.clone())?;
        let category = parse_u64_from_string(config.category_id.clone())?;

        let guild_id = parse_u64_from_string(ticket.guild_id.clone())?;
        let creator = parse_u64_from_string(ticket.user_id.clone())?;
        let support_roles = Self::support_role_ids(config);
        let overwrites = crate::service::permission::project(
            PermissionRegime::Open,
            &crate::service::permission::PermissionInputs {
                everyone_role: serenity::all::RoleId::new(guild_id),
                creator: serenity::all::UserId::new(creator),
                support_roles: &support_roles,
                bot: serenity::all::UserId::new(self.bot_id),
            },
        );

        ChannelId::new(channel_id)
            .edit(
                &self.http,
                EditChannel::new()
                    .category(ChannelId::new(category))
                    .permissions(overwrites),
            )
            .await?;

        if let Some(panel) = &ticket.archive_message_id {
            if let Ok(message_id) = panel.parse::<u64>() {
                if let Err(err) = ChannelId::new(channel_id)
                    .delete_message(&self.http, MessageId::new(message_id))
                    .await
                {
                    tracing::error!(
                        "Failed to remove archive panel for ticket {}: {}",
                        ticket_id,
                        err
                    );
                }
            }
        }

        self.announce(
            channel_id,
            "Ticket reopened",
            format!("Reopened by <@{}>.", actor.actor_id()),
            COLOR_POSITIVE,
        )
        .await?;

        Ok(())
    }
}
