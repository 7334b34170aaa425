//! Actor contexts for lifecycle operations.
//!
//! Every engine entry point takes an [`ActorContext`]: the acting identity
//! plus a way to answer it. Command handlers wrap the interacting member in a
//! [`MemberActor`]; the alert scheduler drives the very same code paths with a
//! [`SystemActor`], so the engine never special-cases "is this a real user".

use std::sync::Arc;

use async_trait::async_trait;
use serenity::all::{ChannelId, CreateMessage};
use serenity::http::Http;

use crate::error::AppError;

#[async_trait]
pub trait ActorContext: Send + Sync {
    /// Discord ID of the acting identity.
    fn actor_id(&self) -> u64;

    /// Display name used in announcements and logs.
    fn actor_name(&self) -> &str;

    /// Role IDs held by the actor. Empty for synthetic actors.
    fn role_ids(&self) -> &[u64];

    /// Whether this actor is the scheduler rather than a member.
    ///
    /// Synthetic actors bypass role checks; there is no member to hold roles.
    fn is_system(&self) -> bool {
        false
    }

    /// Delivers a user-visible response for the operation outcome.
    async fn respond(&self, content: String) -> Result<(), AppError>;
}

/// Actor backed by a real guild member acting in a ticket channel.
pub struct MemberActor {
    pub user_id: u64,
    pub user_name: String,
    pub roles: Vec<u64>,
    pub channel_id: u64,
    pub http: Arc<Http>,
}

#[async_trait]
impl ActorContext for MemberActor {
    fn actor_id(&self) -> u64 {
        self.user_id
    }

    fn actor_name(&self) -> &str {
        &self.user_name
    }

    fn role_ids(&self) -> &[u64] {
        &self.roles
    }

    async fn respond(&self, content: String) -> Result<(), AppError> {
        ChannelId::new(self.channel_id)
            .send_message(&self.http, CreateMessage::new().content(content))
            .await?;

        Ok(())
    }
}

/// Actor standing in for the alert scheduler.
///
/// Responses are logged instead of posted; the ticket channel may already be
/// gone by the time the scheduler acts.
pub struct SystemActor {
    pub name: String,
}

impl SystemActor {
    pub fn new() -> Self {
        Self {
            name: "Ticket Alerts".to_string(),
        }
    }
}

#[async_trait]
impl ActorContext for SystemActor {
    fn actor_id(&self) -> u64 {
        0
    }

    fn actor_name(&self) -> &str {
        &self.name
    }

    fn role_ids(&self) -> &[u64] {
        &[]
    }

    fn is_system(&self) -> bool {
        true
    }

    async fn respond(&self, content: String) -> Result<(), AppError> {
        tracing::info!("scheduler ticket action: {}", content);

        Ok(())
    }
}
