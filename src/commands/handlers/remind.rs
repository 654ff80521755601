//! Reminder command handlers
//!
//! Handles: remindme, and the "Remind Me" message command
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.0.0: Initial implementation

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use log::{info, warn};
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::model::channel::MessageFlags;
use serenity::prelude::Context;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::handler::SlashCommandHandler;
use crate::commands::slash::{get_bool_option, get_string_option, REMIND_ME_COMMAND};
use crate::features::reminders::{MessageReference, ReminderError};
use crate::interactions::keys;
use crate::message_components;

/// Handler for reminder creation commands
pub struct RemindHandler;

#[async_trait]
impl SlashCommandHandler for RemindHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["remindme", REMIND_ME_COMMAND]
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        match command.data.name.as_str() {
            "remindme" => self.handle_remindme(&ctx, serenity_ctx, command).await,
            REMIND_ME_COMMAND => self.handle_remind_me_menu(serenity_ctx, command).await,
            _ => Ok(()),
        }
    }
}

impl RemindHandler {
    /// Handle /remindme command - create a reminder from options
    async fn handle_remindme(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let options = &command.data.options;
        let when = get_string_option(options, "when").context("missing 'when' option")?;
        let description = get_string_option(options, "description");
        let public_ack = get_bool_option(options, "public_ack").unwrap_or(true);

        let reminder = match ctx
            .engine
            .create_reminder(command.user.id.0, &when, description.as_deref(), None)
            .await
        {
            Ok(reminder) => reminder,
            Err(ReminderError::UnparsableTime(_)) => {
                command
                    .create_interaction_response(&serenity_ctx.http, |r| {
                        r.kind(InteractionResponseType::ChannelMessageWithSource)
                            .interaction_response_data(|m| {
                                m.content("Unknown time format").ephemeral(true)
                            })
                    })
                    .await?;
                return Ok(());
            }
            Err(error) => return Err(error.into()),
        };

        let payload = message_components::reminder_ack(&reminder, false);
        command
            .create_interaction_response(&serenity_ctx.http, |r| {
                r.kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|m| {
                        payload.apply_to_response_data(m);
                        m.ephemeral(!public_ack)
                    })
            })
            .await?;

        // Best-effort back-link so the delivered reminder can jump to where
        // it was created. Ephemeral acknowledgements cannot be linked
        // directly, so those link to the surrounding conversation via the
        // interaction id.
        match command.get_interaction_response(&serenity_ctx.http).await {
            Ok(response) => {
                let ephemeral = response
                    .flags
                    .is_some_and(|flags| flags.contains(MessageFlags::EPHEMERAL));
                let linked_message_id = if ephemeral { command.id.0 } else { response.id.0 };
                ctx.engine
                    .add_ack_reference(
                        reminder.id,
                        MessageReference {
                            message_id: linked_message_id,
                            channel_id: command.channel_id.0,
                            guild_id: command.guild_id.map(|id| id.0),
                        },
                    )
                    .await;
            }
            Err(error) => {
                warn!(
                    "Could not fetch acknowledgement for reminder {}: {error}",
                    reminder.id
                );
            }
        }

        info!(
            "Created reminder {} via /remindme for user {}",
            reminder.id, command.user.id
        );
        Ok(())
    }

    /// Handle the "Remind Me" message command - open a creation modal
    /// pre-filled with the target message.
    async fn handle_remind_me_menu(
        &self,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let target = command
            .data
            .resolved
            .messages
            .values()
            .next()
            .context("message command without a resolved target")?;

        let custom_id = keys::make_key(
            keys::REMINDER_CREATE_MODAL,
            &[
                command.guild_id.map_or(0, |id| id.0),
                target.channel_id.0,
                target.id.0,
            ],
        );
        let components = message_components::create_from_message_modal(&target.content);

        command
            .create_interaction_response(&serenity_ctx.http, |r| {
                r.kind(InteractionResponseType::Modal)
                    .interaction_response_data(|m| {
                        m.custom_id(custom_id)
                            .title("Create a reminder")
                            .set_components(components)
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
    fn test_remind_handler_commands() {
        let handler = RemindHandler;
        let names = handler.command_names();

        assert!(names.contains(&"remindme"));
        assert!(names.contains(&REMIND_ME_COMMAND));
        assert_eq!(names.len(), 2);
    }
}
