//! Outbound Discord messaging seam
//!
//! The engine talks to Discord through this trait so delivery logic can
//! be exercised against a mock. The one piece of error detail the engine
//! cares about is 403 Forbidden, which means the user deauthorized the
//! app and their reminders are undeliverable.

use std::sync::Arc;

use async_trait::async_trait;
use serenity::http::{Http, HttpError};
use serenity::model::id::{ChannelId, UserId};
use thiserror::Error;

use crate::message_components::MessagePayload;

#[derive(Debug, Error)]
pub enum MessengerError {
    /// Discord returned 403; the recipient cannot be reached at all.
    #[error("recipient is unreachable")]
    Forbidden,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Minimal messaging surface the reminder engine needs.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Open (or look up) the DM channel for a user.
    async fn create_dm_channel(&self, user_id: u64) -> Result<u64, MessengerError>;

    /// Send a message, returning the created message id.
    async fn send_message(
        &self,
        channel_id: u64,
        payload: &MessagePayload,
    ) -> Result<u64, MessengerError>;

    /// Edit an existing message in place.
    async fn edit_message(
        &self,
        channel_id: u64,
        message_id: u64,
        payload: &MessagePayload,
    ) -> Result<(), MessengerError>;
}

/// Production messenger backed by the serenity HTTP client.
pub struct DiscordMessenger {
    http: Arc<Http>,
}

impl DiscordMessenger {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

fn map_error(error: serenity::Error) -> MessengerError {
    if let serenity::Error::Http(http_error) = &error {
        if let HttpError::UnsuccessfulRequest(response) = &**http_error {
            if response.status_code == 403 {
                return MessengerError::Forbidden;
            }
        }
    }
    MessengerError::Other(error.into())
}

#[async_trait]
impl Messenger for DiscordMessenger {
    async fn create_dm_channel(&self, user_id: u64) -> Result<u64, MessengerError> {
        let channel = UserId(user_id)
            .create_dm_channel(&self.http)
            .await
            .map_err(map_error)?;
        Ok(channel.id.0)
    }

    async fn send_message(
        &self,
        channel_id: u64,
        payload: &MessagePayload,
    ) -> Result<u64, MessengerError> {
        let message = ChannelId(channel_id)
            .send_message(&self.http, |message| payload.apply_to_message(message))
            .await
            .map_err(map_error)?;
        Ok(message.id.0)
    }

    async fn edit_message(
        &self,
        channel_id: u64,
        message_id: u64,
        payload: &MessagePayload,
    ) -> Result<(), MessengerError> {
        ChannelId(channel_id)
            .edit_message(&self.http, message_id, |message| payload.apply_to_edit(message))
            .await
            .map_err(map_error)?;
        Ok(())
    }
}
