//! # Utility Commands
//!
//! Basic bot health commands.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.0.0: Initial implementation

use serenity::builder::CreateApplicationCommand;

pub fn create_commands() -> Vec<CreateApplicationCommand> {
    vec![create_ping_command()]
}

fn create_ping_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("ping")
        .description("Check bot latency and uptime");
    command
}
