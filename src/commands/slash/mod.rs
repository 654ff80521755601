//! # Slash Commands (/)
//!
//! Discord native application command definitions and registration.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.0.0: Initial command set (remindme, listreminders, ping, Remind Me)

mod context_menu;
mod list;
mod remind;
mod utility;

use anyhow::Result;
use log::info;
use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::Command;
use serenity::model::application::interaction::application_command::CommandDataOption;
use serenity::model::id::GuildId;
use serenity::prelude::Context;

pub use context_menu::REMIND_ME_COMMAND;

/// Creates all slash command definitions
pub fn create_slash_commands() -> Vec<CreateApplicationCommand> {
    let mut commands = Vec::new();

    // Utility commands
    commands.extend(utility::create_commands());

    // Reminder commands
    commands.extend(remind::create_commands());
    commands.extend(list::create_commands());

    commands
}

/// Creates all context menu commands
pub fn create_context_menu_commands() -> Vec<CreateApplicationCommand> {
    context_menu::create_commands()
}

/// Registers all application commands globally
pub async fn register_global_commands(ctx: &Context) -> Result<()> {
    let slash_commands = create_slash_commands();
    let context_commands = create_context_menu_commands();
    let total = slash_commands.len() + context_commands.len();

    Command::set_global_application_commands(&ctx.http, |commands| {
        for command in slash_commands {
            commands.add_application_command(command);
        }
        for command in context_commands {
            commands.add_application_command(command);
        }
        commands
    })
    .await?;

    info!("Global commands registered successfully ({total} commands)");
    Ok(())
}

/// Registers all application commands for a specific guild (faster for testing)
pub async fn register_guild_commands(ctx: &Context, guild_id: GuildId) -> Result<()> {
    let slash_commands = create_slash_commands();
    let context_commands = create_context_menu_commands();
    let total = slash_commands.len() + context_commands.len();

    guild_id
        .set_application_commands(&ctx.http, |commands| {
            for command in slash_commands {
                commands.add_application_command(command);
            }
            for command in context_commands {
                commands.add_application_command(command);
            }
            commands
        })
        .await?;

    info!("Guild commands registered for guild {guild_id} ({total} commands)");
    Ok(())
}

/// Utility function to get string option from slash command
pub fn get_string_option(options: &[CommandDataOption], name: &str) -> Option<String> {
    options
        .iter()
        .find(|opt| opt.name == name)
        .and_then(|opt| opt.value.as_ref())
        .and_then(|val| val.as_str())
        .map(|s| s.to_string())
}

/// Utility function to get boolean option from slash command
pub fn get_bool_option(options: &[CommandDataOption], name: &str) -> Option<bool> {
    options
        .iter()
        .find(|opt| opt.name == name)
        .and_then(|opt| opt.value.as_ref())
        .and_then(|val| val.as_bool())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_slash_commands() {
        let commands = create_slash_commands();

        let command_names: Vec<String> = commands
            .iter()
            .map(|cmd| cmd.0.get("name").unwrap().as_str().unwrap().to_string())
            .collect();

        for expected in ["ping", "remindme", "listreminders"] {
            assert!(
                command_names.contains(&expected.to_string()),
                "Missing command: {expected}"
            );
        }
    }

    #[test]
    fn test_create_context_menu_commands() {
        let commands = create_context_menu_commands();
        assert_eq!(commands.len(), 1, "Should have 1 context menu command");
    }
}
