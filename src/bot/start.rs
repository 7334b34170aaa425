use std::sync::Arc;

use sea_orm::DatabaseConnection;
use serenity::all::{Client, Context, EventHandler, GatewayIntents, GuildChannel, Message, Ready};
use serenity::async_trait;

use crate::config::Config;
use crate::data::ticket::TicketRepository;
use crate::error::AppError;
use crate::scheduler::rename::RenameThrottler;
use crate::service::ticket::TicketService;
use crate::settings::Settings;

/// Discord bot event handler
struct Handler {
    db: DatabaseConnection,
    settings: Arc<Settings>,
    renames: Arc<RenameThrottler>,
}

#[async_trait]
impl EventHandler for Handler {
    /// Called when the bot is ready and connected to Discord
    async fn ready(&self, _ctx: Context, ready: Ready) {
        tracing::info!("{} is connected to Discord!", ready.user.name);
    }

    /// Called for every message the bot can see.
    ///
    /// Records traffic in ticket channels. Recording is best effort: a store
    /// failure is logged and never affects the channel.
    async fn message(&self, ctx: Context, message: Message) {
        if message.author.bot {
            return;
        }

        let bot_id = ctx.cache.current_user().id.get();
        let service = TicketService::new(
            &self.db,
            ctx.http.clone(),
            bot_id,
            self.settings.clone(),
            self.renames.clone(),
        );

        if let Err(e) = service.record_message(&message).await {
            tracing::error!(
                "Failed to record message {} in channel {}: {}",
                message.id,
                message.channel_id,
                e
            );
        }
    }

    /// Called when a channel is deleted.
    ///
    /// Self-healing: a ticket whose channel was removed externally is
    /// finalized as deleted, the same terminal state a normal deletion
    /// reaches.
    async fn channel_delete(
        &self,
        _ctx: Context,
        channel: GuildChannel,
        _messages: Option<Vec<Message>>,
    ) {
        let repo = TicketRepository::new(&self.db);

        match repo.mark_deleted_by_channel(&channel.id.to_string()).await {
            Ok(true) => {
                tracing::info!(
                    "Channel {} was removed externally, its ticket is now deleted",
                    channel.id
                );
            }
            Ok(false) => {}
            Err(e) => {
                tracing::error!(
                    "Failed to finalize ticket for removed channel {}: {}",
                    channel.id,
                    e
                );
            }
        }
    }
}

/// Builds the Discord client with the ticket event handler.
///
/// # Arguments
/// - `config` - Application configuration with the bot token
/// - `db` - Database connection for the handler to use
/// - `settings` - Loaded ticket settings and type catalog
/// - `renames` - Shared rename throttler
///
/// # Returns
/// - `Ok(Client)` - Configured client, not yet started
/// - `Err(AppError)` - Client initialization failed
pub async fn init_bot(
    config: &Config,
    db: DatabaseConnection,
    settings: Arc<Settings>,
    renames: Arc<RenameThrottler>,
) -> Result<Client, AppError> {
    // MESSAGE_CONTENT is a privileged intent - must be enabled in the
    // Discord Developer Portal for message recording to see content.
    let intents =
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT;

    let handler = Handler {
        db,
        settings,
        renames,
    };

    let client = Client::builder(&config.discord_bot_token, intents)
        .event_handler(handler)
        .await?;

    Ok(client)
}

/// Starts the Discord bot in a blocking manner
///
/// This function starts the Discord bot client and blocks until the bot
/// shuts down.
pub async fn start_bot(client: &mut Client) -> Result<(), AppError> {
    tracing::info!("Starting Discord bot...");

    client.start().await?;

    Ok(())
}
