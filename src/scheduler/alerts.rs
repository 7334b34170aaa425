//! Inactivity alert polling.
//!
//! A fixed-interval job inspects every open ticket with a pending alert
//! deadline or an already-posted alert. Each ticket is processed inside its
//! own catch boundary so one failure never halts the poll for the rest.
//!
//! The decision itself is the pure [`evaluate`] function:
//! - owner responded after the alert: the alert is retracted
//! - deadline passed with no alert posted yet: the alert goes out and the
//!   escalation deadline is armed
//! - the escalation deadline passed too: the ticket is archived directly
//!   when its type has an archive category, otherwise a full close runs with
//!   a synthetic actor standing in for a moderator.

use std::sync::Arc;

use chrono::{Duration, Utc};
use sea_orm::DatabaseConnection;
use serenity::all::{
    ButtonStyle, ChannelId, CreateActionRow, CreateButton, CreateEmbed, CreateMessage,
    GetMessages, MessageId, Timestamp, UserId,
};
use serenity::http::Http;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::actor::SystemActor;
use crate::data::ticket::TicketRepository;
use crate::error::AppError;
use crate::model::ticket::Ticket;
use crate::scheduler::rename::RenameThrottler;
use crate::service::ticket::close::CloseRequest;
use crate::service::ticket::{is_unknown_target, TicketService};
use crate::settings::Settings;
use crate::util::parse::parse_u64_from_string;

/// Embed color for alert prompts.
const COLOR_ALERT: u32 = 0xf1c40f;

/// Reason used when the scheduler escalates without a human actor.
const ESCALATION_REASON: &str = "No response from the ticket owner";

/// Starts the ticket alert scheduler
///
/// This scheduler runs every 10 seconds and checks open tickets for:
/// - Owners who responded after an alert (the alert is retracted)
/// - Alert deadlines that passed (the alert prompt is posted)
/// - Escalation deadlines that passed (the ticket is archived or closed)
///
/// # Arguments
/// - `db`: Database connection
/// - `http`: Discord HTTP client for channel inspection and posting
/// - `settings`: Loaded ticket settings and type catalog
/// - `renames`: Shared rename throttler, needed by the programmatic close
pub async fn start_scheduler(
    db: DatabaseConnection,
    http: Arc<Http>,
    settings: Arc<Settings>,
    renames: Arc<RenameThrottler>,
) -> Result<(), AppError> {
    let scheduler = JobScheduler::new().await?;

    let bot_id = http.get_current_user().await?.id.get();

    // Clone resources for the job
    let job_db = db.clone();
    let job_http = http.clone();
    let job_settings = settings.clone();
    let job_renames = renames.clone();

    let job = Job::new_async("1/10 * * * * *", move |_uuid, _lock| {
        let db = job_db.clone();
        let http = job_http.clone();
        let settings = job_settings.clone();
        let renames = job_renames.clone();

        Box::pin(async move {
            if let Err(e) = process_alerts(&db, http, settings, renames, bot_id).await {
                tracing::error!("Error processing ticket alerts: {}", e);
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    tracing::info!("Ticket alert scheduler started");

    Ok(())
}

/// Processes every alert candidate, isolating failures per ticket.
async fn process_alerts(
    db: &DatabaseConnection,
    http: Arc<Http>,
    settings: Arc<Settings>,
    renames: Arc<RenameThrottler>,
    bot_id: u64,
) -> Result<(), AppError> {
    if !settings.alert.enabled {
        return Ok(());
    }

    let tickets = TicketRepository::new(db).open_with_alerts().await?;

    for ticket in tickets {
        if let Err(e) = process_ticket(
            db,
            http.clone(),
            settings.clone(),
            renames.clone(),
            bot_id,
            &ticket,
        )
        .await
        {
            tracing::error!(
                "Error processing alert for ticket {}: {}",
                ticket.ticket_id,
                e
            );
        }
    }

    Ok(())
}

/// What the scheduler should do with one alert candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AlertAction {
    /// Nothing due yet.
    Wait,
    /// Owner responded: retract the alert and return to normal monitoring.
    Clear,
    /// Deadline passed with no alert posted: post the prompt and arm the
    /// escalation deadline.
    Post,
    /// Escalation deadline passed with no response: archive or close.
    Escalate,
}

/// Pure decision over one candidate's alert state.
pub(crate) fn evaluate(
    alert_posted: bool,
    deadline_passed: bool,
    owner_responded: bool,
) -> AlertAction {
    if alert_posted && owner_responded {
        return AlertAction::Clear;
    }
    if !alert_posted && deadline_passed {
        return AlertAction::Post;
    }
    if alert_posted && deadline_passed {
        return AlertAction::Escalate;
    }

    AlertAction::Wait
}

async fn process_ticket(
    db: &DatabaseConnection,
    http: Arc<Http>,
    settings: Arc<Settings>,
    renames: Arc<RenameThrottler>,
    bot_id: u64,
    ticket: &Ticket,
) -> Result<(), AppError> {
    let now = Utc::now();
    let channel_id = parse_u64_from_string(ticket.channel_id.clone())?;
    let channel = ChannelId::new(channel_id);

    let history = match channel.messages(&http, GetMessages::new().limit(50)).await {
        Ok(history) => history,
        // Channel is gone; the channel_delete handler owns the cleanup.
        Err(err) if is_unknown_target(&err) => return Ok(()),
        Err(err) => return Err(err.into()),
    };

    let alert_posted_at = ticket
        .alert_message_id
        .as_deref()
        .and_then(|id| id.parse::<u64>().ok())
        .map(|id| MessageId::new(id).created_at().with_timezone(&Utc));

    let owner_responded = match alert_posted_at {
        Some(posted_at) => history.iter().any(|m| {
            m.author.id.to_string() == ticket.user_id
                && m.timestamp.with_timezone(&Utc) > posted_at
        }),
        None => false,
    };
    let deadline_passed = ticket.alert_time.map(|t| t <= now).unwrap_or(false);

    let repo = TicketRepository::new(db);

    match evaluate(alert_posted_at.is_some(), deadline_passed, owner_responded) {
        AlertAction::Wait => {}
        AlertAction::Clear => {
            if let Some(id) = ticket.alert_message_id.as_deref().and_then(|i| i.parse().ok()) {
                if let Err(err) = channel.delete_message(&http, MessageId::new(id)).await {
                    tracing::error!(
                        "Failed to retract alert message for ticket {}: {}",
                        ticket.ticket_id,
                        err
                    );
                }
            }
            repo.clear_alert(ticket.ticket_id).await?;
        }
        AlertAction::Post => {
            post_alert(&repo, &http, &settings, ticket, channel).await?;
        }
        AlertAction::Escalate => {
            escalate(db, http, settings, renames, bot_id, ticket).await?;
        }
    }

    Ok(())
}

/// Posts the alert prompt, optionally DMs the owner, and arms the
/// escalation deadline.
async fn post_alert(
    repo: &TicketRepository<'_>,
    http: &Arc<Http>,
    settings: &Settings,
    ticket: &Ticket,
    channel: ChannelId,
) -> Result<(), AppError> {
    let deadline = Utc::now() + Duration::seconds(settings.alert.time_secs as i64);
    let reason = ticket
        .alert_reason
        .clone()
        .unwrap_or_else(|| "No recent activity".to_string());

    let embed = CreateEmbed::new()
        .title("Are you still there?")
        .description(format!(
            "This ticket will be closed <t:{}:R> without a response.\n**Reason:** {}",
            deadline.timestamp(),
            reason
        ))
        .color(COLOR_ALERT)
        .timestamp(Timestamp::now());

    let message = channel
        .send_message(
            http,
            CreateMessage::new()
                .content(format!("<@{}>", ticket.user_id))
                .embed(embed.clone())
                .components(vec![CreateActionRow::Buttons(vec![CreateButton::new(
                    "ticket-close",
                )
                .label("Close")
                .style(ButtonStyle::Danger)])]),
        )
        .await?;

    if settings.alert.dm_user {
        if let Ok(user_id) = ticket.user_id.parse::<u64>() {
            let dm = async {
                UserId::new(user_id)
                    .create_dm_channel(http)
                    .await?
                    .id
                    .send_message(http, CreateMessage::new().embed(embed))
                    .await
            };
            if let Err(err) = dm.await {
                tracing::error!(
                    "Failed to DM alert for ticket {}: {}",
                    ticket.ticket_id,
                    err
                );
            }
        }
    }

    repo.set_alert(
        ticket.ticket_id,
        deadline,
        &reason,
        Some(&message.id.to_string()),
    )
    .await?;

    Ok(())
}

/// Escalates an expired alert.
///
/// Types with an archive category get a direct archive move (there is no
/// interactive actor to drive the close flow); types without one get a full
/// programmatic close with a synthetic actor.
async fn escalate(
    db: &DatabaseConnection,
    http: Arc<Http>,
    settings: Arc<Settings>,
    renames: Arc<RenameThrottler>,
    bot_id: u64,
    ticket: &Ticket,
) -> Result<(), AppError> {
    let config = settings.ticket_type(&ticket.ticket_type)?;

    match config.archive_category.clone() {
        Some(archive) => {
            let repo = TicketRepository::new(db);
            if !repo
                .close(ticket.ticket_id, Some(ESCALATION_REASON), None)
                .await?
            {
                // Someone transitioned the ticket first; nothing to do.
                return Ok(());
            }

            let service = TicketService::new(db, http, bot_id, settings.clone(), renames);
            service.ensure_archived(ticket, config, &archive).await?;
        }
        None => {
            let actor = SystemActor::new();
            let service = TicketService::new(db, http, bot_id, settings.clone(), renames);
            service
                .close(
                    &actor,
                    ticket.ticket_id,
                    CloseRequest {
                        reason: Some(ESCALATION_REASON.to_string()),
                        custom_reason: None,
                        silent: false,
                    },
                )
                .await?;
        }
    }

    Ok(())
}
