//! Transferring a ticket to a different type.

use serenity::all::{ChannelId, EditChannel, RoleId, UserId};

use crate::actor::ActorContext;
use crate::data::ticket::TicketRepository;
use crate::error::{ticket::TicketError, AppError};
use crate::scheduler::rename::RenameRequest;
use crate::service::permission::{self, PermissionInputs};
use crate::util::parse::parse_u64_from_string;
use crate::util::template::{self, TemplateContext};

use super::{TicketService, COLOR_UPDATE};

impl TicketService<'_> {
    /// Moves a ticket to a different type.
    ///
    /// The channel is reparented to the new type's category with overwrites
    /// recomputed for the new support roles; the claim state carries over.
    /// The open/closed status never changes here.
    ///
    /// # Arguments
    /// - `actor` - Acting identity; must hold a support role of the *current* type
    /// - `ticket_id` - Ticket to transfer
    /// - `new_type` - Target catalog key
    ///
    /// # Returns
    /// - `Ok(())` - Ticket moved to the new type
    /// - `Err(TicketError::SameType)` - Target equals the current type
    /// - `Err(TicketError::UnknownType)` - Target not in the catalog
    pub async fn transfer(
        &self,
        actor: &dyn ActorContext,
        ticket_id: i64,
        new_type: &str,
    ) -> Result<(), AppError> {
        let ticket = self.require_ticket(ticket_id).await?;

        if ticket.ticket_type == new_type {
            return Err(TicketError::SameType.into());
        }

        let current_config = self.settings.ticket_type(&ticket.ticket_type)?;
        let new_config = self.settings.ticket_type(new_type)?;
        self.ensure_support(actor, current_config)?;

        let channel_id = parse_u64_from_string(ticket.channel_id.clone())?;
        let guild_id = parse_u64_from_string(ticket.guild_id.clone())?;
        let creator = parse_u64_from_string(ticket.user_id.clone())?;
        let category = parse_u64_from_string(new_config.category_id.clone())?;

        let support_roles = Self::support_role_ids(new_config);
        let overwrites = permission::project(
            Self::live_regime(&ticket),
            &PermissionInputs {
                everyone_role: RoleId::new(guild_id),
                creator: UserId::new(creator),
                support_roles: &support_roles,
                bot: UserId::new(self.bot_id),
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

        let repo = TicketRepository::new(self.db);
        repo.set_ticket_type(ticket_id, new_type).await?;

        let context = TemplateContext {
            ticket_id,
            ticket_type: new_type,
            priority: &ticket.priority,
            user_name: &ticket.user_name,
        };
        let name = template::render_channel_name(&new_config.channel_name, &context);
        let topic = if new_config.channel_topic.is_empty() {
            None
        } else {
            Some(template::render(&new_config.channel_topic, &context))
        };
        self.renames
            .request(RenameRequest {
                channel_id,
                name,
                topic,
            })
            .await;

        self.announce(
            channel_id,
            "Ticket transferred",
            format!(
                "Moved to **{}** by <@{}>.",
                new_config.name,
                actor.actor_id()
            ),
            COLOR_UPDATE,
        )
        .await?;

        Ok(())
    }
}
