use crate::error::{config::ConfigError, AppError};

const DEFAULT_SETTINGS_PATH: &str = "tickets.yaml";

pub struct Config {
    pub database_url: String,
    pub discord_bot_token: String,
    /// Path to the YAML document holding the ticket-type catalog and global
    /// ticket settings.
    pub settings_path: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .map_err(|_| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?,
            discord_bot_token: std::env::var("DISCORD_BOT_TOKEN")
                .map_err(|_| ConfigError::MissingEnvVar("DISCORD_BOT_TOKEN".to_string()))?,
            settings_path: std::env::var("TICKET_SETTINGS_PATH")
                .unwrap_or_else(|_| DEFAULT_SETTINGS_PATH.to_string()),
        })
    }
}
