//! Claim and unclaim with mutual exclusion.
//!
//! Two concurrent claim requests on the same ticket resolve to exactly one
//! winner: the loser fails the conditional guard update and is answered with
//! an already-in-progress or already-claimed message. The claim state only
//! commits after the Discord side effects succeed; a platform failure
//! releases the guard and leaves the record untouched.

use serenity::all::{ButtonStyle, ChannelId, CreateActionRow, CreateButton, EditMessage, MessageId};

use crate::actor::ActorContext;
use crate::data::ticket::TicketRepository;
use crate::error::{ticket::TicketError, AppError};
use crate::model::ticket::Ticket;
use crate::service::permission::PermissionRegime;
use crate::settings::TicketTypeConfig;
use crate::util::parse::parse_u64_from_string;

use super::{TicketService, COLOR_POSITIVE, COLOR_UPDATE};

impl TicketService<'_> {
    /// Claims an unclaimed open ticket for the acting support member.
    ///
    /// # Arguments
    /// - `actor` - Acting identity; must hold a support role of the type
    /// - `ticket_id` - Ticket to claim
    ///
    /// # Returns
    /// - `Ok(())` - Ticket claimed by the actor
    /// - `Err(TicketError::AlreadyClaimed)` - Somebody else holds the claim
    /// - `Err(TicketError::AlreadyInProgress)` - A concurrent claim is in flight
    /// - `Err(TicketError::PermissionDenied)` - Claiming disabled or no support role
    pub async fn claim(&self, actor: &dyn ActorContext, ticket_id: i64) -> Result<(), AppError> {
        let repo = TicketRepository::new(self.db);
        let ticket = self.require_ticket(ticket_id).await?;
        let config = self.settings.ticket_type(&ticket.ticket_type)?;

        if !config.claiming.enabled {
            return Err(TicketError::PermissionDenied.into());
        }
        self.ensure_support(actor, config)?;

        if let Some(claimer) = &ticket.claimed_by {
            return Err(TicketError::AlreadyClaimed(claimer.clone()).into());
        }

        if !repo.try_begin_claim(ticket_id, None).await? {
            // Lost the race; report what the winner did.
            let current = repo.find_by_ticket_id(ticket_id).await?;
            let err = match current {
                Some(t) if t.claimed => {
                    TicketError::AlreadyClaimed(t.claimed_by.unwrap_or_default())
                }
                _ => TicketError::AlreadyInProgress,
            };
            return Err(err.into());
        }

        let claimer_id = actor.actor_id().to_string();
        let result = self
            .apply_claim_state(&ticket, config, Some((actor.actor_id(), actor.actor_name())))
            .await;

        match result {
            Ok(()) => {
                repo.finish_claim(ticket_id, Some(&claimer_id)).await?;

                let channel_id = parse_u64_from_string(ticket.channel_id.clone())?;
                self.announce(
                    channel_id,
                    "Ticket claimed",
                    format!("<@{}> is now handling this ticket.", claimer_id),
                    COLOR_POSITIVE,
                )
                .await?;

                Ok(())
            }
            Err(err) => {
                repo.release_claim_guard(ticket_id).await?;
                Err(err)
            }
        }
    }

    /// Releases a claim held by the acting member.
    ///
    /// # Returns
    /// - `Ok(())` - Claim released, permissions widened back to all support roles
    /// - `Err(TicketError::NotClaimer)` - Actor is not the current claimer
    /// - `Err(TicketError::AlreadyInProgress)` - A concurrent claim operation is in flight
    pub async fn unclaim(&self, actor: &dyn ActorContext, ticket_id: i64) -> Result<(), AppError> {
        let repo = TicketRepository::new(self.db);
        let ticket = self.require_ticket(ticket_id).await?;
        let config = self.settings.ticket_type(&ticket.ticket_type)?;

        let claimer = ticket
            .claimed_by
            .clone()
            .ok_or(TicketError::NotClaimer)?;
        if !actor.is_system() && claimer != actor.actor_id().to_string() {
            return Err(TicketError::NotClaimer.into());
        }

        if !repo.try_begin_claim(ticket_id, Some(&claimer)).await? {
            return Err(TicketError::AlreadyInProgress.into());
        }

        let result = self.apply_claim_state(&ticket, config, None).await;

        match result {
            Ok(()) => {
                repo.finish_claim(ticket_id, None).await?;

                let channel_id = parse_u64_from_string(ticket.channel_id.clone())?;
                self.announce(
                    channel_id,
                    "Ticket released",
                    format!("<@{}> released this ticket.", claimer),
                    COLOR_UPDATE,
                )
                .await?;

                Ok(())
            }
            Err(err) => {
                repo.release_claim_guard(ticket_id).await?;
                Err(err)
            }
        }
    }

    /// Applies the Discord side of a claim transition: channel permissions,
    /// control-panel button label and the claimer field of the info embed.
    async fn apply_claim_state(
        &self,
        ticket: &Ticket,
        config: &TicketTypeConfig,
        claimer: Option<(u64, &str)>,
    ) -> Result<(), AppError> {
        let regime = match claimer {
            Some((id, _)) => PermissionRegime::Claimed {
                claimer: serenity::all::UserId::new(id),
            },
            None => PermissionRegime::Open,
        };
        self.apply_regime(ticket, config, regime).await?;

        let Some(panel_id) = &ticket.first_message_id else {
            return Ok(());
        };

        let repo = TicketRepository::new(self.db);
        let questions = repo.questions_for_ticket(ticket.ticket_id).await?;

        let mut updated = ticket.clone();
        updated.claimed = claimer.is_some();
        updated.claimed_by = claimer.map(|(id, _)| id.to_string());
        let embed = Self::build_info_embed(&updated, config, &questions);

        let claim_button = match claimer {
            Some((_, name)) => CreateButton::new("ticket-claim")
                .label(format!("Claimed by {}", name))
                .style(ButtonStyle::Secondary)
                .disabled(true),
            None => CreateButton::new("ticket-claim")
                .label(config.claiming.button_label.clone())
                .style(ButtonStyle::Primary),
        };
        let buttons = vec![
            claim_button,
            CreateButton::new("ticket-close")
                .label("Close")
                .style(ButtonStyle::Danger),
        ];

        let channel_id = parse_u64_from_string(ticket.channel_id.clone())?;
        let panel_message = parse_u64_from_string(panel_id.clone())?;

        ChannelId::new(channel_id)
            .edit_message(
                &self.http,
                MessageId::new(panel_message),
                EditMessage::new()
                    .embed(embed)
                    .components(vec![CreateActionRow::Buttons(buttons)]),
            )
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::ticket::testkit;
    use test_utils::{builder::TestBuilder, factory};

    #[tokio::test]
    async fn claim_requires_a_support_role() {
        let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();

        let ticket = factory::ticket::create_ticket(db).await.unwrap();
        let service = testkit::service(db, testkit::settings());
        let actor = testkit::member(7, vec![]);

        let err = service.claim(&actor, ticket.ticket_id).await.unwrap_err();

        assert!(matches!(
            err,
            AppError::TicketErr(TicketError::PermissionDenied)
        ));
    }

    #[tokio::test]
    async fn claim_rejects_an_already_claimed_ticket() {
        let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();

        let ticket = factory::ticket::TicketFactory::new(db)
            .claimed_by(Some("555".to_string()))
            .build()
            .await
            .unwrap();
        let service = testkit::service(db, testkit::settings());
        let actor = testkit::member(7, vec![testkit::SUPPORT_ROLE]);

        let err = service.claim(&actor, ticket.ticket_id).await.unwrap_err();

        assert!(matches!(
            err,
            AppError::TicketErr(TicketError::AlreadyClaimed(claimer)) if claimer == "555"
        ));
    }

    #[tokio::test]
    async fn unclaim_rejects_everyone_but_the_claimer() {
        let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();

        let ticket = factory::ticket::TicketFactory::new(db)
            .claimed_by(Some("555".to_string()))
            .build()
            .await
            .unwrap();
        let service = testkit::service(db, testkit::settings());
        let actor = testkit::member(7, vec![testkit::SUPPORT_ROLE]);

        let err = service.unclaim(&actor, ticket.ticket_id).await.unwrap_err();

        assert!(matches!(
            err,
            AppError::TicketErr(TicketError::NotClaimer)
        ));
    }

    #[tokio::test]
    async fn missing_tickets_are_reported() {
        let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();

        let service = testkit::service(db, testkit::settings());
        let actor = testkit::member(7, vec![testkit::SUPPORT_ROLE]);

        let err = service.claim(&actor, 999_999).await.unwrap_err();

        assert!(matches!(err, AppError::TicketErr(TicketError::NotFound)));
    }
}
