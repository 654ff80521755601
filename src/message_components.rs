//! Reminder message rendering
//!
//! Pure builders turning reminder records into Discord UI payloads:
//! the delivered DM (with snooze menu and jump link), creation/snooze
//! acknowledgements, the paginated list and the single-reminder view.

use chrono::{DateTime, Utc};
use serenity::builder::{
    CreateComponents, CreateEmbed, CreateInteractionResponseData, CreateMessage, EditMessage,
};
use serenity::model::application::component::{ButtonStyle, InputTextStyle};

use crate::database::Reminder;
use crate::interactions::keys;

/// Reminders shown per list page.
pub const REMINDERS_PER_PAGE: i64 = 5;

/// Embed accent color.
const EMBED_COLOR: u32 = 0x5865F2;

/// A rendered message, independent of which API call will carry it.
#[derive(Clone, Default)]
pub struct MessagePayload {
    pub content: Option<String>,
    pub embed: Option<CreateEmbed>,
    pub components: Option<CreateComponents>,
}

impl MessagePayload {
    /// Plain text payload.
    pub fn text(content: impl Into<String>) -> Self {
        MessagePayload {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn apply_to_response_data<'a, 'b>(
        &self,
        data: &'b mut CreateInteractionResponseData<'a>,
    ) -> &'b mut CreateInteractionResponseData<'a> {
        if let Some(content) = &self.content {
            data.content(content);
        }
        if let Some(embed) = &self.embed {
            data.add_embed(embed.clone());
        }
        if let Some(components) = &self.components {
            data.set_components(components.clone());
        }
        data
    }

    pub fn apply_to_message<'a, 'b>(
        &self,
        message: &'b mut CreateMessage<'a>,
    ) -> &'b mut CreateMessage<'a> {
        if let Some(content) = &self.content {
            message.content(content);
        }
        if let Some(embed) = &self.embed {
            message.set_embed(embed.clone());
        }
        if let Some(components) = &self.components {
            message.set_components(components.clone());
        }
        message
    }

    pub fn apply_to_edit<'a, 'b>(
        &self,
        message: &'b mut EditMessage<'a>,
    ) -> &'b mut EditMessage<'a> {
        if let Some(content) = &self.content {
            message.content(content);
        }
        if let Some(embed) = &self.embed {
            message.set_embed(embed.clone());
        }
        if let Some(components) = &self.components {
            message.set_components(components.clone());
        }
        message
    }
}

/// `<t:..:F> (<t:..:R>)`, absolute time plus relative countdown.
pub fn timestamp_pair(at: DateTime<Utc>) -> String {
    let ts = at.timestamp();
    format!("<t:{ts}:F> (<t:{ts}:R>)")
}

fn jump_url(reminder: &Reminder) -> Option<String> {
    let message_id = reminder.reference_message_id?;
    let channel_id = reminder.reference_channel_id?;
    let guild_part = reminder
        .reference_guild_id
        .map_or_else(|| "@me".to_string(), |id| id.to_string());
    Some(format!(
        "https://discord.com/channels/{guild_part}/{channel_id}/{message_id}"
    ))
}

/// The message delivered to the user's DM channel when a reminder fires.
///
/// With `snoozed_until` set this renders the post-snooze replacement of an
/// already-delivered reminder: same body, snooze menu removed.
pub fn reminder_message(
    reminder: &Reminder,
    snoozed_until: Option<DateTime<Utc>>,
) -> MessagePayload {
    let content = match snoozed_until {
        Some(at) => format!("*Snoozed until {}*", timestamp_pair(at)),
        None => "**Reminder!**".to_string(),
    };

    let mut embed = CreateEmbed::default();
    embed.color(EMBED_COLOR).description(&reminder.description);

    let mut components = CreateComponents::default();
    if let Some(url) = jump_url(reminder) {
        components.create_action_row(|row| {
            row.create_button(|button| {
                button
                    .style(ButtonStyle::Link)
                    .url(url)
                    .label("Jump to message")
            })
        });
    }
    if snoozed_until.is_none() {
        let custom_id = keys::make_key(keys::REMINDER_SNOOZE_SELECT, &[reminder.id]);
        components.create_action_row(|row| {
            row.create_select_menu(|menu| {
                menu.custom_id(custom_id)
                    .placeholder("Snooze")
                    .options(|options| {
                        for choice in ["10 minutes", "30 minutes", "1 hour", "6 hours", "1 day"] {
                            options.create_option(|option| option.label(choice).value(choice));
                        }
                        options.create_option(|option| option.label("Custom").value("custom"))
                    })
            })
        });
    }

    MessagePayload {
        content: Some(content),
        embed: Some(embed),
        components: (!components.0.is_empty()).then_some(components),
    }
}

/// Acknowledgement shown right after a reminder is created or snoozed.
pub fn reminder_ack(reminder: &Reminder, snoozed: bool) -> MessagePayload {
    let action = if snoozed { "snoozed" } else { "created" };

    let mut embed = CreateEmbed::default();
    embed
        .color(EMBED_COLOR)
        .description(&reminder.description)
        .field("When", timestamp_pair(reminder.expire_at), false);

    MessagePayload {
        content: Some(format!("**Reminder {action}!**")),
        embed: Some(embed),
        components: None,
    }
}

/// One page of a user's reminders with per-reminder view buttons and
/// pagination controls.
pub fn reminder_list(reminders: &[Reminder], offset: i64, total_count: i64) -> MessagePayload {
    let mut lines = Vec::with_capacity(reminders.len());
    for reminder in reminders {
        let description: String = reminder.description.chars().take(80).collect();
        lines.push(format!(
            "**#{}** {} {}",
            reminder.id,
            timestamp_pair(reminder.expire_at),
            description
        ));
    }
    let description = if lines.is_empty() {
        "You have no reminders.".to_string()
    } else {
        lines.join("\n")
    };

    let last_page_start = ((total_count - 1).max(0) / REMINDERS_PER_PAGE) * REMINDERS_PER_PAGE;
    let page = offset / REMINDERS_PER_PAGE + 1;
    let pages = last_page_start / REMINDERS_PER_PAGE + 1;

    let mut embed = CreateEmbed::default();
    embed
        .color(EMBED_COLOR)
        .title("Your reminders")
        .description(description)
        .footer(|footer| footer.text(format!("Page {page}/{pages} ({total_count} total)")));

    let mut components = CreateComponents::default();
    if !reminders.is_empty() {
        components.create_action_row(|row| {
            for reminder in reminders {
                row.create_button(|button| {
                    button
                        .custom_id(keys::make_key(keys::REMINDER_VIEW, &[reminder.id, offset]))
                        .label(format!("#{}", reminder.id))
                        .style(ButtonStyle::Secondary)
                });
            }
            row
        });
    }
    components.create_action_row(|row| {
        row.create_button(|button| {
            button
                .custom_id(keys::make_key(
                    keys::REMINDER_LIST_MOVE,
                    &[(offset - REMINDERS_PER_PAGE).max(0)],
                ))
                .label("Previous")
                .style(ButtonStyle::Secondary)
                .disabled(offset == 0)
        })
        .create_button(|button| {
            button
                .custom_id(keys::make_key(
                    keys::REMINDER_LIST_MOVE,
                    &[(offset + REMINDERS_PER_PAGE).min(last_page_start)],
                ))
                .label("Next")
                .style(ButtonStyle::Secondary)
                .disabled(offset >= last_page_start)
        })
    });

    MessagePayload {
        content: None,
        embed: Some(embed),
        components: Some(components),
    }
}

/// Detail view for a single reminder, reached from the list.
pub fn reminder_view(reminder: &Reminder, offset: i64) -> MessagePayload {
    let mut embed = CreateEmbed::default();
    embed
        .color(EMBED_COLOR)
        .title(format!("Reminder #{}", reminder.id))
        .description(&reminder.description)
        .field("When", timestamp_pair(reminder.expire_at), false);

    let mut components = CreateComponents::default();
    components.create_action_row(|row| {
        if let Some(url) = jump_url(reminder) {
            row.create_button(|button| {
                button
                    .style(ButtonStyle::Link)
                    .url(url)
                    .label("Jump to message")
            });
        }
        row.create_button(|button| {
            button
                .custom_id(keys::make_key(keys::REMINDER_DELETE, &[reminder.id, offset]))
                .label("Delete")
                .style(ButtonStyle::Danger)
        })
        .create_button(|button| {
            button
                .custom_id(keys::make_key(keys::REMINDER_LIST_MOVE, &[offset]))
                .label("Back")
                .style(ButtonStyle::Secondary)
        })
    });

    MessagePayload {
        content: None,
        embed: Some(embed),
        components: Some(components),
    }
}

/// Input rows for the custom snooze time modal.
pub fn snooze_custom_modal() -> CreateComponents {
    let mut components = CreateComponents::default();
    components.create_action_row(|row| {
        row.create_input_text(|input| {
            input
                .custom_id("when")
                .label("When to get reminded")
                .style(InputTextStyle::Short)
                .required(true)
                .max_length(100)
        })
    });
    components
}

/// Input rows for the create-from-message modal. The description field is
/// pre-filled with the target message's content.
pub fn create_from_message_modal(content: &str) -> CreateComponents {
    let mut components = CreateComponents::default();
    components
        .create_action_row(|row| {
            row.create_input_text(|input| {
                input
                    .custom_id("when")
                    .label("When to get reminded")
                    .style(InputTextStyle::Short)
                    .required(true)
                    .max_length(100)
            })
        })
        .create_action_row(|row| {
            row.create_input_text(|input| {
                input
                    .custom_id("description")
                    .label("Description")
                    .style(InputTextStyle::Paragraph)
                    .required(false)
                    .max_length(4000);
                if !content.is_empty() {
                    let value: String = content.chars().take(4000).collect();
                    input.value(value);
                }
                input
            })
        })
        .create_action_row(|row| {
            row.create_input_text(|input| {
                input
                    .custom_id("public_ack")
                    .label("Make the acknowledgement public?")
                    .style(InputTextStyle::Short)
                    .value("true")
                    .placeholder("false")
                    .required(false)
                    .max_length(5)
            })
        });
    components
}
