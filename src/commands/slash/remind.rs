//! # RemindMe Command
//!
//! Create a reminder from a slash command.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.0.0: Initial implementation

use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::CommandOptionType;

pub fn create_commands() -> Vec<CreateApplicationCommand> {
    vec![create_remindme_command()]
}

fn create_remindme_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("remindme")
        .description("Create a reminder")
        .create_option(|option| {
            option
                .name("when")
                .description("When do you want to be reminded?")
                .kind(CommandOptionType::String)
                .required(true)
                .max_length(100)
        })
        .create_option(|option| {
            option
                .name("description")
                .description("What do you want to be reminded about?")
                .kind(CommandOptionType::String)
                .required(false)
                .max_length(4000)
        })
        .create_option(|option| {
            option
                .name("public_ack")
                .description("Whether to send a public acknowledgement")
                .kind(CommandOptionType::Boolean)
                .required(false)
        });
    command
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_remindme_command() {
        let commands = create_commands();
        assert_eq!(commands.len(), 1);

        let remindme = &commands[0];
        let name = remindme.0.get("name").unwrap().as_str().unwrap();
        assert_eq!(name, "remindme");

        let options = remindme.0.get("options").unwrap().as_array().unwrap();
        assert_eq!(options.len(), 3);
        assert_eq!(options[0].get("name").unwrap().as_str().unwrap(), "when");
        assert!(options[0].get("required").unwrap().as_bool().unwrap());
    }
}
