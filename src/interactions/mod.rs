//! Interaction Dispatch
//!
//! Prefix-routed dispatch for message components and modal submits.
//! Custom ids double as correlation tokens (`prefix:arg:...`); the
//! prefix selects a registered handler and the response lifecycle is
//! tracked per interaction so exactly one initial response goes out.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod context;
pub mod error;
pub mod keys;
pub mod response;
pub mod router;

pub use context::{ComponentContext, ModalContext};
pub use error::InteractionError;
pub use response::ResponseState;
pub use router::{InteractionHandler, InteractionRouter, RoutedContext};
