//! Per-interaction response lifecycle state
//!
//! Discord demands exactly one initial response per interaction; everything
//! after that must be an edit or followup. `ResponseState` owns that
//! invariant: the sent flag lives under an async mutex that is held across
//! the whole response call, so two concurrent attempts can never both pass
//! the check, and the router is signalled the moment the first response
//! goes out.

use std::future::Future;

use tokio::sync::{Mutex, Notify};

use super::error::InteractionError;

/// Tracks whether the initial response for one interaction has been sent.
#[derive(Default)]
pub struct ResponseState {
    sent: Mutex<bool>,
    notify: Notify,
}

impl ResponseState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `send` as the initial response.
    ///
    /// The sent flag is checked and set under the same lock that spans the
    /// API call; a second caller gets `ResponseAlreadySent` instead of a
    /// double response. On success the router's signal-wait is released.
    pub async fn initial<F, Fut, T>(&self, send: F) -> Result<T, InteractionError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = serenity::Result<T>>,
    {
        let mut sent = self.sent.lock().await;
        if *sent {
            return Err(InteractionError::ResponseAlreadySent);
        }

        let value = send().await?;
        *sent = true;
        self.notify.notify_one();
        Ok(value)
    }

    /// Whether the initial response has gone out.
    pub async fn is_sent(&self) -> bool {
        *self.sent.lock().await
    }

    /// Wait until the initial response has been sent.
    ///
    /// A permit is stored if the response beats the waiter, so this never
    /// misses the signal.
    pub async fn responded(&self) {
        self.notify.notified().await;
    }
}
