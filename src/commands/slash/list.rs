//! # ListReminders Command
//!
//! Browse active reminders.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.0.0: Initial implementation

use serenity::builder::CreateApplicationCommand;

pub fn create_commands() -> Vec<CreateApplicationCommand> {
    vec![create_listreminders_command()]
}

fn create_listreminders_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("listreminders")
        .description("List active reminders");
    command
}
