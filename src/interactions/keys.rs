//! Correlation token construction and parsing
//!
//! Component and modal custom ids carry routing information as
//! `prefix:arg1:arg2:...`. The prefix selects the handler; everything
//! after it is positional arguments the handler parses itself. Arguments
//! are numeric ids and offsets, so no escaping of `:` is needed.

/// Snooze select menu on a delivered reminder. Args: reminder id.
pub const REMINDER_SNOOZE_SELECT: &str = "remind_snooze";
/// Custom snooze time modal. Args: reminder id.
pub const REMINDER_SNOOZE_CUSTOM_MODAL: &str = "remind_snooze_custom";
/// Create-from-message modal. Args: guild id (0 in DMs), channel id, message id.
pub const REMINDER_CREATE_MODAL: &str = "remind_create";
/// Reminder list pagination. Args: page offset.
pub const REMINDER_LIST_MOVE: &str = "remind_list";
/// Single reminder detail view. Args: reminder id, list offset to return to.
pub const REMINDER_VIEW: &str = "remind_view";
/// Reminder delete button. Args: reminder id, list offset to return to.
pub const REMINDER_DELETE: &str = "remind_delete";

/// Build a correlation token from a handler prefix and positional arguments.
pub fn make_key<D: std::fmt::Display>(prefix: &str, args: &[D]) -> String {
    let mut key = prefix.to_string();
    for arg in args {
        key.push(':');
        key.push_str(&arg.to_string());
    }
    key
}

/// The handler prefix of a correlation token (everything before the first `:`).
pub fn prefix_of(custom_id: &str) -> &str {
    custom_id.split(':').next().unwrap_or_default()
}

/// The positional arguments of a correlation token.
pub fn arguments_of(custom_id: &str) -> Vec<String> {
    custom_id.split(':').skip(1).map(str::to_string).collect()
}
