//! Per-command handler implementations
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.0.0: Initial handler set (utility, remind, list)

pub mod list;
pub mod remind;
pub mod utility;

use std::sync::Arc;

use super::handler::SlashCommandHandler;

/// Create all registered command handlers
///
/// Returns a vector of handlers ready to be registered with CommandRegistry.
pub fn create_all_handlers() -> Vec<Arc<dyn SlashCommandHandler>> {
    vec![
        Arc::new(utility::UtilityHandler),
        Arc::new(remind::RemindHandler),
        Arc::new(list::ListHandler),
    ]
}
