//! Interaction dispatch error taxonomy

use thiserror::Error;

/// Errors raised by the interaction routers and response lifecycle.
#[derive(Debug, Error)]
pub enum InteractionError {
    /// A handler prefix was registered twice. Registration happens once at
    /// startup, so this is fatal.
    #[error("interaction prefix '{0}' is already registered")]
    DuplicateHandler(String),

    /// No handler matched the token prefix. Stale or forged custom id;
    /// reported loudly instead of silently dropped.
    #[error("no handler registered for interaction id '{0}'")]
    UnknownHandler(String),

    /// A second initial response was attempted for the same interaction.
    #[error("an initial response has already been sent for this interaction")]
    ResponseAlreadySent,

    /// The Discord API rejected a response call.
    #[error("discord api error: {0}")]
    Transport(#[from] serenity::Error),

    /// The handler body returned an error.
    #[error("handler '{prefix}' failed: {source}")]
    Handler {
        prefix: String,
        #[source]
        source: anyhow::Error,
    },

    /// The handler task panicked or was aborted underneath us.
    #[error("handler '{prefix}' did not run to completion: {source}")]
    Join {
        prefix: String,
        #[source]
        source: tokio::task::JoinError,
    },
}
