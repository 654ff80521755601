//! Utility command handlers
//!
//! Handles: ping
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.0.0: Initial implementation

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use log::info;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::prelude::Context;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::handler::SlashCommandHandler;

/// Discord epoch offset, milliseconds since the Unix epoch.
const DISCORD_EPOCH_MS: u64 = 1_420_070_400_000;

/// Handler for utility commands: ping
pub struct UtilityHandler;

#[async_trait]
impl SlashCommandHandler for UtilityHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["ping"]
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        match command.data.name.as_str() {
            "ping" => self.handle_ping(&ctx, serenity_ctx, command).await,
            _ => Ok(()),
        }
    }
}

impl UtilityHandler {
    /// Handle /ping command
    ///
    /// Latency is derived from the interaction snowflake's embedded
    /// timestamp rather than a gateway heartbeat.
    async fn handle_ping(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let sent_at_ms = (command.id.0 >> 22) + DISCORD_EPOCH_MS;
        let now_ms = Utc::now().timestamp_millis().max(0) as u64;
        let latency_ms = now_ms.saturating_sub(sent_at_ms);

        let uptime = ctx.start_time.elapsed();
        let hours = uptime.as_secs() / 3600;
        let minutes = (uptime.as_secs() % 3600) / 60;
        let seconds = uptime.as_secs() % 60;

        let response = format!("Pong! Latency: {latency_ms}ms, uptime: {hours}h {minutes}m {seconds}s");

        command
            .create_interaction_response(&serenity_ctx.http, |r| {
                r.kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|m| m.content(response).ephemeral(true))
            })
            .await?;

        info!("Ping command completed for user {}", command.user.id);
        Ok(())
    }
}
