//! Shared context for command handlers
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.0.0: Initial implementation with core shared state

use crate::features::reminders::ReminderEngine;

/// Shared context for all command handlers
///
/// Contains the core services needed by command handlers:
/// - ReminderEngine for the reminder lifecycle (the store is reachable
///   through `engine.database()`)
/// - Bot start time for uptime tracking
#[derive(Clone)]
pub struct CommandContext {
    pub engine: ReminderEngine,
    pub start_time: std::time::Instant,
}

impl CommandContext {
    /// Create a new CommandContext with the given services
    pub fn new(engine: ReminderEngine) -> Self {
        Self {
            engine,
            start_time: std::time::Instant::now(),
        }
    }
}
