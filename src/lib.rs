// Core layer - shared types and configuration
pub mod core;

// Features layer - all feature modules
pub mod features;

// Interaction dispatch - component/modal routing and response lifecycle
pub mod interactions;

// UI components
pub mod message_components;

// Infrastructure
pub mod database;

// Application layer
pub mod commands;

// Re-export core config
pub use core::Config;

// Re-export commonly used items
pub use features::reminders::{ReminderEngine, ReminderScheduler};
pub use interactions::{ComponentContext, InteractionRouter, ModalContext};
