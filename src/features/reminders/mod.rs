//! # Reminders Feature
//!
//! Scheduled reminder system delivered over DM, with snoozing, a
//! paginated list UI and creation from existing messages.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod engine;
pub mod interactions;
pub mod messenger;
pub mod scheduler;
pub mod timeparse;

pub use engine::{MessageReference, ReminderEngine, ReminderError};
pub use interactions::{register_interaction_handlers, reminder_list_payload};
pub use messenger::{DiscordMessenger, Messenger, MessengerError};
pub use scheduler::ReminderScheduler;
