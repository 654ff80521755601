//! Environment-backed configuration
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::{Context, Result};

/// Runtime configuration, loaded once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// Discord bot token.
    pub discord_token: String,
    /// Path to the SQLite database file.
    pub database_path: String,
    /// Guild to register commands against in development mode.
    /// When unset, commands are registered globally.
    pub discord_guild_id: Option<String>,
    /// Default log filter for env_logger.
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// `DISCORD_TOKEN` is required; everything else has a default.
    pub fn from_env() -> Result<Self> {
        let discord_token = std::env::var("DISCORD_TOKEN")
            .context("DISCORD_TOKEN environment variable is required")?;

        let database_path =
            std::env::var("DATABASE_PATH").unwrap_or_else(|_| "reminders.db".to_string());

        let discord_guild_id = std::env::var("DISCORD_GUILD_ID").ok().filter(|s| !s.is_empty());

        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Config {
            discord_token,
            database_path,
            discord_guild_id,
            log_level,
        })
    }
}
