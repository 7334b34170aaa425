//! Priority changes with a per-ticket cooldown.

use chrono::{Duration, Utc};
use serenity::all::{ChannelId, EditChannel};

use crate::actor::ActorContext;
use crate::data::ticket::TicketRepository;
use crate::error::{ticket::TicketError, AppError};
use crate::scheduler::rename::RenameRequest;
use crate::util::parse::parse_u64_from_string;
use crate::util::template::{self, TemplateContext};

use super::{TicketService, COLOR_UPDATE};

impl TicketService<'_> {
    /// Changes a ticket's priority.
    ///
    /// Rate limited per ticket: a change within the configured cooldown of
    /// the previous one is rejected with the remaining wait. The channel
    /// rename reflecting the new priority goes through the rename throttler
    /// and may land later; the persisted priority changes immediately.
    ///
    /// # Arguments
    /// - `actor` - Acting identity; must hold a support role of the type
    /// - `ticket_id` - Ticket to update
    /// - `new_priority` - Name of a configured priority level
    ///
    /// # Returns
    /// - `Ok(())` - Priority persisted and rename enqueued
    /// - `Err(TicketError::CooldownActive)` - Changed too recently, carries remaining seconds
    /// - `Err(TicketError::UnknownPriority)` - Not a configured level
    pub async fn change_priority(
        &self,
        actor: &dyn ActorContext,
        ticket_id: i64,
        new_priority: &str,
    ) -> Result<(), AppError> {
        if !self.settings.priority.enabled {
            return Err(TicketError::PermissionDenied.into());
        }

        let level = self.settings.priority_level(new_priority)?.clone();
        let ticket = self.require_ticket(ticket_id).await?;
        let config = self.settings.ticket_type(&ticket.ticket_type)?;
        self.ensure_support(actor, config)?;

        let now = Utc::now();
        if let Some(last) = ticket.last_priority_change {
            let cooldown = Duration::seconds(self.settings.priority.cooldown_secs as i64);
            let next_allowed = last + cooldown;
            if now < next_allowed {
                let remaining = (next_allowed - now).num_seconds().max(1);
                return Err(TicketError::CooldownActive(remaining).into());
            }
        }

        let repo = TicketRepository::new(self.db);
        repo.set_priority(ticket_id, &level.name, now).await?;

        let channel_id = parse_u64_from_string(ticket.channel_id.clone())?;
        let context = TemplateContext {
            ticket_id,
            ticket_type: &ticket.ticket_type,
            priority: &level.name,
            user_name: &ticket.user_name,
        };
        let name = template::render_channel_name(&config.channel_name, &context);
        let topic = if config.channel_topic.is_empty() {
            None
        } else {
            Some(template::render(&config.channel_topic, &context))
        };
        self.renames
            .request(RenameRequest {
                channel_id,
                name,
                topic,
            })
            .await;

        if level.move_to_top {
            if let Err(err) = ChannelId::new(channel_id)
                .edit(&self.http, EditChannel::new().position(0))
                .await
            {
                tracing::error!(
                    "Failed to move ticket {} channel to top: {}",
                    ticket_id,
                    err
                );
            }
        }

        let emoji = level
            .emoji
            .as_deref()
            .map(|e| format!("{} ", e))
            .unwrap_or_default();
        self.announce(
            channel_id,
            "Priority changed",
            format!(
                "{}Priority is now **{}** (set by <@{}>).",
                emoji,
                level.name,
                actor.actor_id()
            ),
            COLOR_UPDATE,
        )
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::service::ticket::testkit;
    use test_utils::{builder::TestBuilder, factory};

    #[tokio::test]
    async fn second_change_inside_the_cooldown_is_rejected() {
        let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();

        let ticket = factory::ticket::TicketFactory::new(db)
            .last_priority_change(Some(Utc::now()))
            .build()
            .await
            .unwrap();

        let service = testkit::service(db, testkit::settings());
        let actor = testkit::member(7, vec![testkit::SUPPORT_ROLE]);

        let err = service
            .change_priority(&actor, ticket.ticket_id, "High")
            .await
            .unwrap_err();

        let AppError::TicketErr(TicketError::CooldownActive(remaining)) = err else {
            panic!("expected a cooldown rejection, got {:?}", err);
        };
        assert!(remaining > 0 && remaining <= 60);

        // The stored priority is still the one from the first change.
        let stored = TicketRepository::new(db)
            .find_by_ticket_id(ticket.ticket_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.priority, ticket.priority);
    }

    #[tokio::test]
    async fn unknown_levels_are_rejected() {
        let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();

        let ticket = factory::ticket::create_ticket(db).await.unwrap();
        let service = testkit::service(db, testkit::settings());
        let actor = testkit::member(7, vec![testkit::SUPPORT_ROLE]);

        let err = service
            .change_priority(&actor, ticket.ticket_id, "Critical")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::TicketErr(TicketError::UnknownPriority(_))
        ));
    }

    #[tokio::test]
    async fn non_support_actors_are_rejected() {
        let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();

        let ticket = factory::ticket::create_ticket(db).await.unwrap();
        let service = testkit::service(db, testkit::settings());
        let actor = testkit::member(7, vec![]);

        let err = service
            .change_priority(&actor, ticket.ticket_id, "High")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::TicketErr(TicketError::PermissionDenied)
        ));
    }
}
