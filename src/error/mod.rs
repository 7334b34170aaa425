//! Error types for the ticket service.
//!
//! This module provides the application's error hierarchy. The `AppError` enum
//! serves as the top-level error type that wraps domain-specific errors
//! (`TicketError`, `ConfigError`) and infrastructure failures (database,
//! Discord API, scheduler, I/O). Every engine entry point converts the final
//! error into a user-visible message via [`AppError::user_message`] so no
//! actor interaction is ever left unanswered.

pub mod config;
pub mod internal;
pub mod ticket;

use thiserror::Error;

use crate::error::{config::ConfigError, internal::InternalError, ticket::TicketError};

/// Top-level application error type.
///
/// Aggregates all possible error types that can occur in the application. Most
/// variants use `#[from]` for automatic conversion. Domain errors like
/// `TicketError` carry their own user-facing text, while infrastructure
/// variants map to a generic message and are logged server-side.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error during startup, environment variable loading or
    /// settings parsing.
    #[error(transparent)]
    ConfigErr(#[from] ConfigError),

    /// Domain error from the ticket lifecycle engine.
    ///
    /// Carries user-facing text; surfaced to the acting user verbatim.
    #[error(transparent)]
    TicketErr(#[from] TicketError),

    /// Internal invariant violation indicating a possible bug.
    #[error(transparent)]
    Internal(#[from] InternalError),

    /// Database operation error from SeaORM.
    #[error(transparent)]
    DbErr(#[from] sea_orm::DbErr),

    /// Discord API error from Serenity.
    ///
    /// Boxed due to large size.
    #[error(transparent)]
    DiscordErr(#[from] Box<serenity::Error>),

    /// Cron scheduler error.
    #[error(transparent)]
    SchedulerErr(#[from] tokio_cron_scheduler::JobSchedulerError),

    /// Filesystem error while writing transcripts.
    #[error(transparent)]
    IoErr(#[from] std::io::Error),

    /// Resource not found error.
    #[error("{0}")]
    NotFound(String),
}

/// Manual conversion from serenity::Error to AppError.
///
/// Boxes the error to reduce the size of the AppError enum, as serenity::Error
/// is very large and would make all AppError variants larger if not boxed.
impl From<serenity::Error> for AppError {
    fn from(err: serenity::Error) -> Self {
        AppError::DiscordErr(Box::new(err))
    }
}

impl AppError {
    /// Text shown to the acting user when an engine operation fails.
    ///
    /// Domain errors explain themselves; infrastructure errors collapse into a
    /// generic line so internals are not leaked into the channel.
    pub fn user_message(&self) -> String {
        match self {
            Self::TicketErr(err) => err.to_string(),
            Self::NotFound(msg) => msg.clone(),
            _ => "Something went wrong while processing this ticket.".to_string(),
        }
    }
}
