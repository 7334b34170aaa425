//! Ticket lifecycle engine.
//!
//! This module provides the `TicketService` driving every lifecycle
//! transition: creation, claim/unclaim, priority change, transfer, close,
//! reopen, deletion and message recording. Transitions that race (claim,
//! delete, close) are guarded by conditional updates in the repository;
//! Discord side effects happen between guard acquisition and commit so a
//! failed platform call never leaves the record half-transitioned.
//!
//! The service is organized into separate modules by operation:
//! - `create` - Creation flow (channel, record, info embed, tags)
//! - `claim` - Claim and unclaim with mutual exclusion
//! - `priority` - Priority changes with per-ticket cooldown
//! - `transfer` - Moving a ticket to a different type
//! - `close` - Closing, archiving or deleting depending on the type
//! - `reopen` - Restoring an archived ticket
//! - `delete` - Guarded terminal deletion with optional countdown
//! - `message` - Recording channel traffic against the ticket

pub mod claim;
pub mod close;
pub mod create;
pub mod delete;
pub mod message;
pub mod priority;
pub mod reopen;
pub mod transfer;

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use serenity::all::{
    ChannelId, CreateEmbed, CreateEmbedFooter, CreateMessage, EditChannel, Message, RoleId,
    Timestamp, UserId,
};
use serenity::http::Http;

use crate::actor::ActorContext;
use crate::error::{ticket::TicketError, AppError};
use crate::model::ticket::Ticket;
use crate::scheduler::rename::RenameThrottler;
use crate::service::permission::{self, PermissionInputs, PermissionRegime};
use crate::settings::{Settings, TicketTypeConfig};
use crate::util::parse::parse_u64_from_string;

/// Embed color for informational posts.
pub(crate) const COLOR_INFO: u32 = 0x3498db;
/// Embed color for claim/reopen style positive updates.
pub(crate) const COLOR_POSITIVE: u32 = 0x2ecc71;
/// Embed color for priority/transfer updates.
pub(crate) const COLOR_UPDATE: u32 = 0xe67e22;
/// Embed color for close/delete posts.
pub(crate) const COLOR_NEGATIVE: u32 = 0xe74c3c;

/// Service driving ticket lifecycle transitions.
///
/// Holds the database connection, Discord HTTP client, the loaded settings
/// catalog and the rename throttler. Command handlers construct one per
/// operation; the alert scheduler constructs one with a synthetic actor.
pub struct TicketService<'a> {
    pub(crate) db: &'a DatabaseConnection,
    pub(crate) http: Arc<Http>,
    /// The bot's own user id, kept out of permission lockouts.
    pub(crate) bot_id: u64,
    pub(crate) settings: Arc<Settings>,
    pub(crate) renames: Arc<RenameThrottler>,
}

impl<'a> TicketService<'a> {
    /// Creates a new TicketService instance.
    ///
    /// # Arguments
    /// - `db` - Reference to the database connection
    /// - `http` - Arc-wrapped Discord HTTP client
    /// - `bot_id` - The bot's own user id
    /// - `settings` - Loaded ticket settings and type catalog
    /// - `renames` - Shared rename throttler
    ///
    /// # Returns
    /// - `TicketService` - New service instance
    pub fn new(
        db: &'a DatabaseConnection,
        http: Arc<Http>,
        bot_id: u64,
        settings: Arc<Settings>,
        renames: Arc<RenameThrottler>,
    ) -> Self {
        Self {
            db,
            http,
            bot_id,
            settings,
            renames,
        }
    }

    /// Verifies the actor holds one of the type's support roles.
    ///
    /// Synthetic actors (the scheduler) bypass the check; there is no member
    /// behind them to hold roles.
    ///
    /// # Returns
    /// - `Ok(())` - Actor may act on tickets of this type
    /// - `Err(TicketError::PermissionDenied)` - No support role held
    pub(crate) fn ensure_support(
        &self,
        actor: &dyn ActorContext,
        config: &TicketTypeConfig,
    ) -> Result<(), TicketError> {
        if actor.is_system() {
            return Ok(());
        }

        let required: Vec<u64> = config
            .support_roles
            .iter()
            .filter_map(|r| r.parse().ok())
            .collect();

        if required.iter().any(|r| actor.role_ids().contains(r)) {
            Ok(())
        } else {
            Err(TicketError::PermissionDenied)
        }
    }

    /// Parses a type's support roles into role ids, skipping malformed entries.
    pub(crate) fn support_role_ids(config: &TicketTypeConfig) -> Vec<RoleId> {
        config
            .support_roles
            .iter()
            .filter_map(|r| match r.parse() {
                Ok(id) => Some(RoleId::new(id)),
                Err(_) => {
                    tracing::warn!("Ignoring malformed support role id '{}'", r);
                    None
                }
            })
            .collect()
    }

    /// Recomputes and applies the channel overwrites for a regime.
    ///
    /// The whole overwrite set is computed and applied wholesale, so applying
    /// the same regime twice is a genuine no-op.
    pub(crate) async fn apply_regime(
        &self,
        ticket: &Ticket,
        config: &TicketTypeConfig,
        regime: PermissionRegime,
    ) -> Result<(), AppError> {
        let channel_id = parse_u64_from_string(ticket.channel_id.clone())?;
        let guild_id = parse_u64_from_string(ticket.guild_id.clone())?;
        let creator = parse_u64_from_string(ticket.user_id.clone())?;

        let support_roles = Self::support_role_ids(config);
        let overwrites = permission::project(
            regime,
            &PermissionInputs {
                everyone_role: RoleId::new(guild_id),
                creator: UserId::new(creator),
                support_roles: &support_roles,
                bot: UserId::new(self.bot_id),
            },
        );

        ChannelId::new(channel_id)
            .edit(&self.http, EditChannel::new().permissions(overwrites))
            .await?;

        Ok(())
    }

    /// The permission regime a ticket's current claim state maps to.
    pub(crate) fn live_regime(ticket: &Ticket) -> PermissionRegime {
        match ticket
            .claimed_by
            .as_ref()
            .and_then(|c| c.parse::<u64>().ok())
        {
            Some(claimer) if ticket.claimed => PermissionRegime::Claimed {
                claimer: UserId::new(claimer),
            },
            _ => PermissionRegime::Open,
        }
    }

    /// Posts an announcement embed in the ticket channel.
    pub(crate) async fn announce(
        &self,
        channel_id: u64,
        title: &str,
        description: String,
        color: u32,
    ) -> Result<Message, AppError> {
        let embed = CreateEmbed::new()
            .title(title)
            .description(description)
            .color(color)
            .timestamp(Timestamp::now());

        let message = ChannelId::new(channel_id)
            .send_message(&self.http, CreateMessage::new().embed(embed))
            .await?;

        Ok(message)
    }

    /// Builds the info embed shown in the control-panel message.
    ///
    /// Rebuilt whenever the claimer changes so the panel always reflects the
    /// current state.
    pub(crate) fn build_info_embed(
        ticket: &Ticket,
        config: &TicketTypeConfig,
        questions: &[(String, String)],
    ) -> CreateEmbed {
        let mut embed = CreateEmbed::new()
            .title(format!("Ticket #{}", ticket.ticket_id))
            .color(COLOR_INFO)
            .field("Creator", format!("<@{}>", ticket.user_id), true)
            .field("Type", config.name.clone(), true)
            .field("Priority", ticket.priority.clone(), true)
            .footer(CreateEmbedFooter::new(
                "Use the buttons below to manage this ticket",
            ))
            .timestamp(Timestamp::now());

        embed = match &ticket.claimed_by {
            Some(claimer) => embed.field("Claimed by", format!("<@{}>", claimer), true),
            None => embed.field("Claimed by", "Nobody", true),
        };

        for (question, answer) in questions {
            embed = embed.field(question.clone(), answer.clone(), false);
        }

        embed
    }

    /// Looks up a ticket by id, mapping absence to the domain error.
    pub(crate) async fn require_ticket(&self, ticket_id: i64) -> Result<Ticket, AppError> {
        crate::data::ticket::TicketRepository::new(self.db)
            .find_by_ticket_id(ticket_id)
            .await?
            .ok_or_else(|| TicketError::NotFound.into())
    }
}

/// Whether a Discord error means the target channel/message no longer exists.
///
/// A missing channel is an equivalent terminal state for deletion paths, not
/// a failure.
pub(crate) fn is_unknown_target(err: &serenity::Error) -> bool {
    if let serenity::Error::Http(serenity::http::HttpError::UnsuccessfulRequest(resp)) = err {
        resp.status_code.as_u16() == 404
    } else {
        false
    }
}
