//! Reminder lifecycle engine
//!
//! Owns every state transition a reminder goes through: creation,
//! rescheduling (snooze), delivery to the user's DM channel, the
//! post-delivery grace window and final deletion. Interaction handlers
//! and the scheduler both drive the same engine; Discord I/O goes
//! through the `Messenger` seam.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use log::{debug, error, info};
use thiserror::Error;

use super::messenger::{Messenger, MessengerError};
use super::timeparse;
use crate::database::{Database, Reminder};
use crate::message_components;

/// How long a delivered reminder is kept before deletion, so snoozes from
/// stale UI still resolve.
pub const HANDLED_RETENTION_HOURS: i64 = 3;

/// Description stored when the user provides none.
pub const DEFAULT_DESCRIPTION: &str = "*No description provided*";

#[derive(Debug, Error)]
pub enum ReminderError {
    /// The time expression could not be parsed or was not in the future.
    #[error("unknown time format '{0}'")]
    UnparsableTime(String),

    /// The reminder does not exist anymore.
    #[error("reminder {0} not found")]
    NotFound(i64),

    #[error("delivery failed: {0}")]
    Delivery(#[from] MessengerError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Back-link to the message a reminder is about.
#[derive(Clone, Copy, Debug)]
pub struct MessageReference {
    pub message_id: u64,
    pub channel_id: u64,
    pub guild_id: Option<u64>,
}

/// Cloneable handle to the reminder lifecycle engine.
#[derive(Clone)]
pub struct ReminderEngine {
    database: Database,
    messenger: Arc<dyn Messenger>,
}

impl ReminderEngine {
    pub fn new(database: Database, messenger: Arc<dyn Messenger>) -> Self {
        Self { database, messenger }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Create a reminder from a human time expression.
    ///
    /// The description falls back to a placeholder when absent, matching
    /// what the delivery message renders.
    pub async fn create_reminder(
        &self,
        user_id: u64,
        when_str: &str,
        description: Option<&str>,
        reference: Option<MessageReference>,
    ) -> Result<Reminder, ReminderError> {
        let expire_at = timeparse::parse_human_time(when_str, Utc::now())
            .ok_or_else(|| ReminderError::UnparsableTime(when_str.to_string()))?;
        let description = match description {
            Some(text) if !text.trim().is_empty() => text,
            _ => DEFAULT_DESCRIPTION,
        };

        let reminder = match reference {
            Some(reference) => {
                self.database
                    .create_reminder_with_reference(
                        user_id,
                        expire_at,
                        description,
                        reference.message_id,
                        reference.channel_id,
                        reference.guild_id,
                    )
                    .await?
            }
            None => {
                self.database
                    .create_reminder(user_id, expire_at, description)
                    .await?
            }
        };

        info!(
            "Created reminder {} for user {user_id}, due {}",
            reminder.id, reminder.expire_at
        );
        Ok(reminder)
    }

    /// Best-effort back-link from a reminder to its acknowledgement message.
    ///
    /// The reminder already exists and will fire either way, so failures
    /// here are logged and swallowed.
    pub async fn add_ack_reference(
        &self,
        reminder_id: i64,
        reference: MessageReference,
    ) {
        if let Err(error) = self
            .database
            .add_reminder_reference_message(
                reminder_id,
                reference.message_id,
                reference.channel_id,
                reference.guild_id,
            )
            .await
        {
            error!("Failed to back-link reminder {reminder_id}: {error}");
        }
    }

    /// Move a reminder to a new expiry parsed from `when_str`.
    ///
    /// Snoozing a delivered reminder makes it pending again, so it fires
    /// once more at the new time.
    pub async fn reschedule_reminder(
        &self,
        id: i64,
        when_str: &str,
    ) -> Result<Reminder, ReminderError> {
        let expire_at = timeparse::parse_human_time(when_str, Utc::now())
            .ok_or_else(|| ReminderError::UnparsableTime(when_str.to_string()))?;

        let reminder = self
            .database
            .reschedule_reminder(id, expire_at)
            .await?
            .ok_or(ReminderError::NotFound(id))?;

        info!("Rescheduled reminder {id} to {expire_at}");
        Ok(reminder)
    }

    /// Replace a delivered reminder message with its snoozed rendering,
    /// removing the snooze menu. Best effort; the reschedule already
    /// happened and a stale message is only cosmetic.
    pub async fn refresh_delivered_message(
        &self,
        reminder: &Reminder,
        channel_id: u64,
        message_id: u64,
        snoozed_until: DateTime<Utc>,
    ) {
        let payload = message_components::reminder_message(reminder, Some(snoozed_until));
        if let Err(error) = self
            .messenger
            .edit_message(channel_id, message_id, &payload)
            .await
        {
            error!(
                "Failed to refresh delivered message for reminder {}: {error}",
                reminder.id
            );
        }
    }

    /// Deliver one due reminder to the user's DM channel.
    ///
    /// A 403 at any step means the user deauthorized the app; the reminder
    /// is deleted and delivery counts as done.
    pub async fn send_reminder(&self, reminder: &Reminder) -> Result<(), ReminderError> {
        let dm_channel_id = match self
            .database
            .get_dm_channel_for_user(reminder.user_id)
            .await?
        {
            Some(channel_id) => channel_id,
            None => match self.messenger.create_dm_channel(reminder.user_id).await {
                Ok(channel_id) => {
                    self.database
                        .add_dm_channel(channel_id, reminder.user_id)
                        .await?;
                    channel_id
                }
                Err(MessengerError::Forbidden) => {
                    info!(
                        "User {} is unreachable, dropping reminder {}",
                        reminder.user_id, reminder.id
                    );
                    self.database.delete_reminder(reminder.id).await?;
                    return Ok(());
                }
                Err(error) => return Err(error.into()),
            },
        };

        let payload = message_components::reminder_message(reminder, None);
        match self.messenger.send_message(dm_channel_id, &payload).await {
            Ok(_) => {}
            Err(MessengerError::Forbidden) => {
                info!(
                    "User {} is unreachable, dropping reminder {}",
                    reminder.user_id, reminder.id
                );
                self.database.delete_reminder(reminder.id).await?;
                return Ok(());
            }
            Err(error) => return Err(error.into()),
        }

        self.database.mark_reminder_handled(reminder.id).await?;
        debug!("Delivered reminder {}", reminder.id);
        Ok(())
    }

    /// Deliver every due reminder concurrently. One failing delivery never
    /// blocks the others; failures are logged per reminder.
    pub async fn check_due(&self) -> Result<(), ReminderError> {
        let due = self.database.get_expired_reminders(Utc::now()).await?;
        if due.is_empty() {
            return Ok(());
        }
        debug!("{} reminder(s) due", due.len());

        let mut tasks = Vec::with_capacity(due.len());
        for reminder in due {
            let engine = self.clone();
            tasks.push(tokio::spawn(async move {
                (reminder.id, engine.send_reminder(&reminder).await)
            }));
        }
        for task in tasks {
            match task.await {
                Ok((_, Ok(()))) => {}
                Ok((id, Err(error))) => error!("Failed to send reminder {id}: {error}"),
                Err(error) => error!("Reminder delivery task failed: {error}"),
            }
        }
        Ok(())
    }

    /// Delete delivered reminders whose grace window has elapsed.
    pub async fn cleanup_handled(&self) -> Result<(), ReminderError> {
        self.cleanup_handled_as_of(Utc::now()).await
    }

    async fn cleanup_handled_as_of(&self, now: DateTime<Utc>) -> Result<(), ReminderError> {
        let cutoff = now - Duration::hours(HANDLED_RETENTION_HOURS);
        let stale = self.database.get_handled_reminders(cutoff).await?;
        if stale.is_empty() {
            return Ok(());
        }
        debug!("Cleaning up {} handled reminder(s)", stale.len());

        let mut tasks = Vec::with_capacity(stale.len());
        for reminder in stale {
            let database = self.database.clone();
            tasks.push(tokio::spawn(async move {
                (reminder.id, database.delete_reminder(reminder.id).await)
            }));
        }
        for task in tasks {
            match task.await {
                Ok((_, Ok(()))) => {}
                Ok((id, Err(error))) => {
                    error!("Failed to delete handled reminder {id}: {error}")
                }
                Err(error) => error!("Reminder cleanup task failed: {error}"),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicU64, Ordering};
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use crate::message_components::MessagePayload;

    #[derive(Default)]
    struct MockMessenger {
        forbidden_users: HashSet<u64>,
        sent: Mutex<Vec<(u64, Option<String>)>>,
        edited: Mutex<Vec<(u64, u64)>>,
        next_message_id: AtomicU64,
    }

    impl MockMessenger {
        fn forbidding(users: &[u64]) -> Self {
            Self {
                forbidden_users: users.iter().copied().collect(),
                ..Default::default()
            }
        }

        // DM channel ids are derived from user ids so tests can assert
        // on the target channel
        fn dm_channel_for(user_id: u64) -> u64 {
            user_id + 1_000
        }
    }

    #[async_trait]
    impl Messenger for MockMessenger {
        async fn create_dm_channel(&self, user_id: u64) -> Result<u64, MessengerError> {
            if self.forbidden_users.contains(&user_id) {
                return Err(MessengerError::Forbidden);
            }
            Ok(Self::dm_channel_for(user_id))
        }

        async fn send_message(
            &self,
            channel_id: u64,
            payload: &MessagePayload,
        ) -> Result<u64, MessengerError> {
            if self.forbidden_users.contains(&(channel_id - 1_000)) {
                return Err(MessengerError::Forbidden);
            }
            self.sent
                .lock()
                .await
                .push((channel_id, payload.content.clone()));
            Ok(self.next_message_id.fetch_add(1, Ordering::SeqCst) + 1)
        }

        async fn edit_message(
            &self,
            channel_id: u64,
            message_id: u64,
            _payload: &MessagePayload,
        ) -> Result<(), MessengerError> {
            self.edited.lock().await.push((channel_id, message_id));
            Ok(())
        }
    }

    async fn engine_with(messenger: MockMessenger) -> (ReminderEngine, Arc<MockMessenger>) {
        let database = Database::new(":memory:").await.unwrap();
        let messenger = Arc::new(messenger);
        (
            ReminderEngine::new(database, messenger.clone()),
            messenger,
        )
    }

    #[tokio::test]
    async fn test_create_reminder() {
        let (engine, _) = engine_with(MockMessenger::default()).await;

        let before = Utc::now();
        let reminder = engine
            .create_reminder(42, "10 minutes", Some("call mom"), None)
            .await
            .unwrap();

        assert_eq!(reminder.user_id, 42);
        assert_eq!(reminder.description, "call mom");
        let offset = reminder.expire_at - before;
        assert!(offset >= Duration::minutes(9) && offset <= Duration::minutes(11));
    }

    #[tokio::test]
    async fn test_create_reminder_defaults_description() {
        let (engine, _) = engine_with(MockMessenger::default()).await;

        let none = engine.create_reminder(1, "1h", None, None).await.unwrap();
        assert_eq!(none.description, DEFAULT_DESCRIPTION);

        let blank = engine
            .create_reminder(1, "1h", Some("   "), None)
            .await
            .unwrap();
        assert_eq!(blank.description, DEFAULT_DESCRIPTION);
    }

    #[tokio::test]
    async fn test_create_reminder_rejects_bad_time() {
        let (engine, _) = engine_with(MockMessenger::default()).await;

        let result = engine.create_reminder(1, "banana", None, None).await;
        assert!(matches!(result, Err(ReminderError::UnparsableTime(s)) if s == "banana"));

        // Past times are rejected the same way
        let result = engine.create_reminder(1, "0m", None, None).await;
        assert!(matches!(result, Err(ReminderError::UnparsableTime(_))));
    }

    #[tokio::test]
    async fn test_create_reminder_with_reference() {
        let (engine, _) = engine_with(MockMessenger::default()).await;

        let reminder = engine
            .create_reminder(
                1,
                "1h",
                Some("about this"),
                Some(MessageReference {
                    message_id: 100,
                    channel_id: 200,
                    guild_id: Some(300),
                }),
            )
            .await
            .unwrap();

        assert_eq!(reminder.reference_message_id, Some(100));
        assert_eq!(reminder.reference_channel_id, Some(200));
        assert_eq!(reminder.reference_guild_id, Some(300));
    }

    #[tokio::test]
    async fn test_reschedule() {
        let (engine, _) = engine_with(MockMessenger::default()).await;
        let reminder = engine.create_reminder(1, "10m", None, None).await.unwrap();

        let updated = engine.reschedule_reminder(reminder.id, "1 day").await.unwrap();
        assert!(updated.expire_at > reminder.expire_at);

        let missing = engine.reschedule_reminder(9999, "1 day").await;
        assert!(matches!(missing, Err(ReminderError::NotFound(9999))));

        let bad_time = engine.reschedule_reminder(reminder.id, "???").await;
        assert!(matches!(bad_time, Err(ReminderError::UnparsableTime(_))));
    }

    #[tokio::test]
    async fn test_snooze_after_delivery() {
        let (engine, _) = engine_with(MockMessenger::default()).await;
        let reminder = engine.create_reminder(1, "10m", None, None).await.unwrap();
        engine.send_reminder(&reminder).await.unwrap();

        // The snooze menu lives on the delivered message, so rescheduling
        // must work on a handled reminder and re-arm it
        let snoozed = engine
            .reschedule_reminder(reminder.id, "1 hour")
            .await
            .unwrap();
        assert!(snoozed.expire_at > reminder.expire_at);
        assert!(snoozed.handled_at.is_none());
    }

    #[tokio::test]
    async fn test_send_reminder_caches_dm_channel() {
        let (engine, messenger) = engine_with(MockMessenger::default()).await;
        let reminder = engine.create_reminder(7, "1h", None, None).await.unwrap();

        engine.send_reminder(&reminder).await.unwrap();

        let sent = messenger.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, MockMessenger::dm_channel_for(7));
        assert_eq!(sent[0].1.as_deref(), Some("**Reminder!**"));
        drop(sent);

        assert_eq!(
            engine.database().get_dm_channel_for_user(7).await.unwrap(),
            Some(MockMessenger::dm_channel_for(7))
        );
        let handled = engine.database().get_reminder(reminder.id).await.unwrap().unwrap();
        assert!(handled.handled_at.is_some());
    }

    #[tokio::test]
    async fn test_unreachable_user_reminder_is_dropped() {
        let (engine, messenger) = engine_with(MockMessenger::forbidding(&[9])).await;
        let reminder = engine.create_reminder(9, "1h", None, None).await.unwrap();

        engine.send_reminder(&reminder).await.unwrap();

        // Deleted outright, not marked handled
        assert!(engine.database().get_reminder(reminder.id).await.unwrap().is_none());
        assert!(messenger.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_check_due_isolates_failures() {
        let (engine, messenger) = engine_with(MockMessenger::forbidding(&[2])).await;
        let database = engine.database().clone();

        let past = Utc::now() - Duration::minutes(1);
        let due_a = database.create_reminder(1, past, "a").await.unwrap();
        let dropped = database.create_reminder(2, past, "b").await.unwrap();
        let due_c = database.create_reminder(3, past, "c").await.unwrap();
        let future = database
            .create_reminder(1, Utc::now() + Duration::hours(1), "later")
            .await
            .unwrap();

        engine.check_due().await.unwrap();

        // Reachable users got their reminders, the unreachable one was dropped
        assert_eq!(messenger.sent.lock().await.len(), 2);
        assert!(database.get_reminder(dropped.id).await.unwrap().is_none());
        for id in [due_a.id, due_c.id] {
            assert!(database.get_reminder(id).await.unwrap().unwrap().handled_at.is_some());
        }
        // The future reminder was untouched
        let pending = database.get_reminder(future.id).await.unwrap().unwrap();
        assert!(pending.handled_at.is_none());
    }

    #[tokio::test]
    async fn test_cleanup_respects_grace_window() {
        let (engine, _) = engine_with(MockMessenger::default()).await;
        let database = engine.database().clone();

        let past = Utc::now() - Duration::minutes(5);
        let handled = database.create_reminder(1, past, "x").await.unwrap();
        database.mark_reminder_handled(handled.id).await.unwrap();

        // Inside the grace window: retained
        engine
            .cleanup_handled_as_of(Utc::now() + Duration::hours(2) + Duration::minutes(59))
            .await
            .unwrap();
        assert!(database.get_reminder(handled.id).await.unwrap().is_some());

        // Past the grace window: deleted
        engine
            .cleanup_handled_as_of(Utc::now() + Duration::hours(3) + Duration::minutes(1))
            .await
            .unwrap();
        assert!(database.get_reminder(handled.id).await.unwrap().is_none());

        // Pending reminders are never cleaned up
        let pending = database
            .create_reminder(1, Utc::now() + Duration::hours(1), "y")
            .await
            .unwrap();
        engine
            .cleanup_handled_as_of(Utc::now() + Duration::days(30))
            .await
            .unwrap();
        assert!(database.get_reminder(pending.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_refresh_delivered_message() {
        let (engine, messenger) = engine_with(MockMessenger::default()).await;
        let reminder = engine.create_reminder(1, "1h", None, None).await.unwrap();

        engine
            .refresh_delivered_message(&reminder, 500, 600, Utc::now() + Duration::hours(2))
            .await;

        assert_eq!(*messenger.edited.lock().await, vec![(500, 600)]);
    }
}
