//! Reminder list command handler
//!
//! Handles: listreminders
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.0.0: Initial implementation

use anyhow::Result;
use async_trait::async_trait;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::prelude::Context;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::handler::SlashCommandHandler;
use crate::features::reminders::reminder_list_payload;

/// Handler for the reminder list
pub struct ListHandler;

#[async_trait]
impl SlashCommandHandler for ListHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["listreminders"]
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let payload = reminder_list_payload(&ctx.engine, command.user.id.0, 0).await?;

        command
            .create_interaction_response(&serenity_ctx.http, |r| {
                r.kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|m| {
                        match &payload {
                            Some(payload) => {
                                payload.apply_to_response_data(m);
                            }
                            None => {
                                m.content("No currently active reminders.");
                            }
                        }
                        m.ephemeral(true)
                    })
            })
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_handler_commands() {
        let handler = ListHandler;
        assert_eq!(handler.command_names(), &["listreminders"]);
    }
}
