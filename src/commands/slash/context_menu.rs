//! # Context Menu Commands
//!
//! Message context menu entries. These have no description; Discord
//! shows only the name in the right-click menu.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.0.0: Initial implementation

use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::CommandType;

/// Name of the message command that creates a reminder about a message.
pub const REMIND_ME_COMMAND: &str = "Remind Me";

pub fn create_commands() -> Vec<CreateApplicationCommand> {
    vec![create_remind_me_command()]
}

fn create_remind_me_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command.name(REMIND_ME_COMMAND).kind(CommandType::Message);
    command
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_remind_me_command() {
        let commands = create_commands();
        assert_eq!(commands.len(), 1);

        let name = commands[0].0.get("name").unwrap().as_str().unwrap();
        assert_eq!(name, REMIND_ME_COMMAND);
        // CommandType::Message
        assert_eq!(commands[0].0.get("type").unwrap().as_u64().unwrap(), 3);
    }
}
