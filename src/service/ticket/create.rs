//! Ticket creation flow.
//!
//! Validates the creator against the blacklist, role requirements, working
//! hours and the ticket cap, creates the dedicated channel, persists the
//! record (only once the channel id is known), posts the control panel and
//! optionally tags the support roles/creator without leaving the tag behind.

use chrono::{Duration, Utc};
use serenity::all::{
    ButtonStyle, ChannelId, ChannelType, CreateActionRow, CreateButton, CreateChannel,
    CreateMessage, GuildId,
};

use crate::data::ticket::TicketRepository;
use crate::error::AppError;
use crate::model::ticket::{CreateTicketParams, Ticket};
use crate::service::permission::PermissionRegime;
use crate::settings::TicketTypeConfig;
use crate::util::parse::parse_u64_from_string;
use crate::util::template::{self, TemplateContext};

use super::TicketService;

/// Reason recorded when a type arms its automatic inactivity alert.
const AUTO_ALERT_REASON: &str = "No activity in this ticket";

/// Parameters for the creation flow.
#[derive(Debug, Clone)]
pub struct CreateTicketRequest {
    pub guild_id: u64,
    pub user_id: u64,
    pub user_name: String,
    /// Role ids held by the creator, used for required-role and
    /// working-hours-override checks.
    pub user_roles: Vec<u64>,
    pub ticket_type: String,
    /// Answers to the type's configured questions, in order.
    pub answers: Vec<String>,
}

impl TicketService<'_> {
    /// Creates a ticket: channel, record, control panel.
    ///
    /// # Arguments
    /// - `request` - Creation parameters from the command layer
    ///
    /// # Returns
    /// - `Ok(Ticket)` - The persisted ticket
    /// - `Err(AppError::TicketErr)` - Creator blocked, capped, missing a role
    ///   or outside working hours
    /// - `Err(AppError::DiscordErr)` - Channel creation failed; nothing was
    ///   persisted
    pub async fn create_ticket(&self, request: CreateTicketRequest) -> Result<Ticket, AppError> {
        let config = self.settings.ticket_type(&request.ticket_type)?;

        self.check_creation_allowed(&request, config)?;

        let repo = TicketRepository::new(self.db);

        if repo.count_undeleted_for_user(request.user_id).await?
            >= u64::from(self.settings.max_tickets)
        {
            return Err(crate::error::ticket::TicketError::MaxTicketsReached(
                self.settings.max_tickets,
            )
            .into());
        }

        let ticket_id = repo.next_ticket_id().await?;
        let priority = self.settings.priority.default_priority.clone();

        let context = TemplateContext {
            ticket_id,
            ticket_type: &request.ticket_type,
            priority: &priority,
            user_name: &request.user_name,
        };
        let channel_name = template::render_channel_name(&config.channel_name, &context);
        let channel_topic = if config.channel_topic.is_empty() {
            None
        } else {
            Some(template::render(&config.channel_topic, &context))
        };

        // The record is only persisted after this succeeds, so a failed
        // channel creation cannot leave an orphan ticket behind.
        let channel = self
            .create_ticket_channel(&request, config, &channel_name, channel_topic.as_deref())
            .await?;

        let questions = config
            .questions
            .iter()
            .cloned()
            .zip(request.answers.iter().cloned())
            .collect();

        let ticket = repo
            .create(
                ticket_id,
                CreateTicketParams {
                    guild_id: request.guild_id,
                    channel_id: channel.get(),
                    user_id: request.user_id,
                    user_name: request.user_name.clone(),
                    ticket_type: request.ticket_type.clone(),
                    priority,
                    channel_topic,
                    questions,
                },
            )
            .await?;

        self.post_control_panel(&repo, &ticket, config).await?;

        if let Some(opening) = &config.opening_message {
            if let Err(err) = channel
                .send_message(&self.http, CreateMessage::new().content(opening.clone()))
                .await
            {
                tracing::error!(
                    "Failed to post opening message for ticket {}: {}",
                    ticket.ticket_id,
                    err
                );
            }
        }

        if let Err(err) = self.tag_and_retract(channel, config, request.user_id).await {
            tracing::error!(
                "Failed to tag participants for ticket {}: {}",
                ticket.ticket_id,
                err
            );
        }

        if let Some(secs) = config.auto_alert_secs {
            repo.set_alert(
                ticket.ticket_id,
                Utc::now() + Duration::seconds(secs as i64),
                AUTO_ALERT_REASON,
                None,
            )
            .await?;
        }

        Ok(ticket)
    }

    fn check_creation_allowed(
        &self,
        request: &CreateTicketRequest,
        config: &TicketTypeConfig,
    ) -> Result<(), AppError> {
        use crate::error::ticket::TicketError;

        if self.settings.is_blacklisted(request.user_id) {
            return Err(TicketError::Blacklisted.into());
        }

        if !config.user_roles.is_empty() {
            let required: Vec<u64> = config
                .user_roles
                .iter()
                .filter_map(|r| r.parse().ok())
                .collect();

            if !required.iter().any(|r| request.user_roles.contains(r)) {
                return Err(TicketError::MissingRequiredRole.into());
            }
        }

        if !self.settings.working_hours.is_within(Utc::now())? {
            let support: Vec<u64> = config
                .support_roles
                .iter()
                .filter_map(|r| r.parse().ok())
                .collect();
            let overrides = self.settings.working_hours.allow_override
                && support.iter().any(|r| request.user_roles.contains(r));

            if !overrides {
                return Err(TicketError::OutsideWorkingHours.into());
            }
        }

        Ok(())
    }

    async fn create_ticket_channel(
        &self,
        request: &CreateTicketRequest,
        config: &TicketTypeConfig,
        name: &str,
        topic: Option<&str>,
    ) -> Result<ChannelId, AppError> {
        let support_roles = Self::support_role_ids(config);
        let overwrites = crate::service::permission::project(
            PermissionRegime::Open,
            &crate::service::permission::PermissionInputs {
                everyone_role: serenity::all::RoleId::new(request.guild_id),
                creator: serenity::all::UserId::new(request.user_id),
                support_roles: &support_roles,
                bot: serenity::all::UserId::new(self.bot_id),
            },
        );

        let mut builder = CreateChannel::new(name)
            .kind(ChannelType::Text)
            .permissions(overwrites);

        let category = parse_u64_from_string(config.category_id.clone())?;
        builder = builder.category(ChannelId::new(category));

        if let Some(topic) = topic {
            builder = builder.topic(topic);
        }

        let channel = GuildId::new(request.guild_id)
            .create_channel(&self.http, builder)
            .await?;

        Ok(channel.id)
    }

    async fn post_control_panel(
        &self,
        repo: &TicketRepository<'_>,
        ticket: &Ticket,
        config: &TicketTypeConfig,
    ) -> Result<(), AppError> {
        let questions = repo.questions_for_ticket(ticket.ticket_id).await?;
        let embed = Self::build_info_embed(ticket, config, &questions);

        let mut buttons = Vec::new();
        if config.claiming.enabled {
            buttons.push(
                CreateButton::new("ticket-claim")
                    .label(config.claiming.button_label.clone())
                    .style(ButtonStyle::Primary),
            );
        }
        buttons.push(
            CreateButton::new("ticket-close")
                .label("Close")
                .style(ButtonStyle::Danger),
        );

        let channel_id = parse_u64_from_string(ticket.channel_id.clone())?;
        let panel = ChannelId::new(channel_id)
            .send_message(
                &self.http,
                CreateMessage::new()
                    .embed(embed)
                    .components(vec![CreateActionRow::Buttons(buttons)]),
            )
            .await?;

        repo.set_first_message_id(ticket.ticket_id, &panel.id.to_string())
            .await?;

        Ok(())
    }

    /// Tags the configured participants and removes the tag right away.
    ///
    /// The ping notifies; the deletion keeps the fresh channel clean.
    async fn tag_and_retract(
        &self,
        channel: ChannelId,
        config: &TicketTypeConfig,
        creator: u64,
    ) -> Result<(), AppError> {
        let mut mentions = String::new();

        if config.tag_support {
            for role in Self::support_role_ids(config) {
                mentions.push_str(&format!("<@&{}> ", role));
            }
        }
        if config.tag_creator {
            mentions.push_str(&format!("<@{}>", creator));
        }

        if mentions.is_empty() {
            return Ok(());
        }

        let message = channel
            .send_message(&self.http, CreateMessage::new().content(mentions))
            .await?;
        channel.delete_message(&self.http, message.id).await?;

        Ok(())
    }
}
