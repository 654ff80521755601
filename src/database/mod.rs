//! # Database Module
//!
//! SQLite-backed record store for reminders and the per-user DM channel
//! cache. All state shared between interaction handlers and the scheduler
//! lives here, never in process memory, so a restart loses nothing.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::debug;
use sqlite::{ConnectionThreadSafe, State};
use tokio::sync::Mutex;

/// A scheduled reminder.
///
/// The reference fields form a weak back-link to the message the reminder
/// is about; nothing enforces that the message still exists on Discord.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reminder {
    pub id: i64,
    pub user_id: u64,
    pub description: String,
    pub expire_at: DateTime<Utc>,
    pub reference_message_id: Option<u64>,
    pub reference_channel_id: Option<u64>,
    pub reference_guild_id: Option<u64>,
    /// Set once the reminder has been delivered; the row is kept around for
    /// a grace window afterwards so stale UI can still resolve it.
    pub handled_at: Option<DateTime<Utc>>,
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS reminders (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    description TEXT NOT NULL,
    expire_at INTEGER NOT NULL,
    reference_message_id INTEGER,
    reference_channel_id INTEGER,
    reference_guild_id INTEGER,
    handled_at INTEGER
);
CREATE INDEX IF NOT EXISTS idx_reminders_expire_at ON reminders (expire_at);
CREATE INDEX IF NOT EXISTS idx_reminders_user_id ON reminders (user_id);
CREATE TABLE IF NOT EXISTS dm_channels (
    user_id INTEGER PRIMARY KEY,
    channel_id INTEGER NOT NULL
);
";

const REMINDER_COLUMNS: &str =
    "id, user_id, description, expire_at, reference_message_id, reference_channel_id, reference_guild_id, handled_at";

/// Cloneable handle to the SQLite store.
///
/// The connection is shared behind an async mutex; SQLite serializes writes
/// anyway, so one connection per process is enough.
#[derive(Clone)]
pub struct Database {
    connection: Arc<Mutex<ConnectionThreadSafe>>,
}

impl Database {
    /// Open (or create) the database at `path` and run the schema.
    pub async fn new(path: &str) -> Result<Self> {
        let connection = sqlite::Connection::open_thread_safe(path)
            .with_context(|| format!("failed to open database at {path}"))?;
        connection.execute(SCHEMA).context("failed to create schema")?;

        debug!("Database opened at {path}");
        Ok(Database {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Create a reminder without a reference message.
    pub async fn create_reminder(
        &self,
        user_id: u64,
        expire_at: DateTime<Utc>,
        description: &str,
    ) -> Result<Reminder> {
        let connection = self.connection.lock().await;
        let mut statement = connection.prepare(format!(
            "INSERT INTO reminders (user_id, description, expire_at) VALUES (?, ?, ?) RETURNING {REMINDER_COLUMNS}"
        ))?;
        statement.bind((1, user_id as i64))?;
        statement.bind((2, description))?;
        statement.bind((3, expire_at.timestamp()))?;

        anyhow::ensure!(statement.next()? == State::Row, "insert returned no row");
        read_reminder(&statement)
    }

    /// Create a reminder anchored to an existing message.
    pub async fn create_reminder_with_reference(
        &self,
        user_id: u64,
        expire_at: DateTime<Utc>,
        description: &str,
        reference_message_id: u64,
        reference_channel_id: u64,
        reference_guild_id: Option<u64>,
    ) -> Result<Reminder> {
        let connection = self.connection.lock().await;
        let mut statement = connection.prepare(format!(
            "INSERT INTO reminders \
             (user_id, description, expire_at, reference_message_id, reference_channel_id, reference_guild_id) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING {REMINDER_COLUMNS}"
        ))?;
        statement.bind((1, user_id as i64))?;
        statement.bind((2, description))?;
        statement.bind((3, expire_at.timestamp()))?;
        statement.bind((4, reference_message_id as i64))?;
        statement.bind((5, reference_channel_id as i64))?;
        match reference_guild_id {
            Some(guild_id) => statement.bind((6, guild_id as i64))?,
            None => statement.bind((6, ()))?,
        }

        anyhow::ensure!(statement.next()? == State::Row, "insert returned no row");
        read_reminder(&statement)
    }

    /// Attach a reference message to an existing reminder.
    pub async fn add_reminder_reference_message(
        &self,
        id: i64,
        reference_message_id: u64,
        reference_channel_id: u64,
        reference_guild_id: Option<u64>,
    ) -> Result<()> {
        let connection = self.connection.lock().await;
        let mut statement = connection.prepare(
            "UPDATE reminders SET reference_message_id = ?, reference_channel_id = ?, reference_guild_id = ? \
             WHERE id = ?",
        )?;
        statement.bind((1, reference_message_id as i64))?;
        statement.bind((2, reference_channel_id as i64))?;
        match reference_guild_id {
            Some(guild_id) => statement.bind((3, guild_id as i64))?,
            None => statement.bind((3, ()))?,
        }
        statement.bind((4, id))?;
        statement.next()?;
        Ok(())
    }

    /// Fetch a single reminder by id.
    pub async fn get_reminder(&self, id: i64) -> Result<Option<Reminder>> {
        let connection = self.connection.lock().await;
        let mut statement = connection.prepare(format!(
            "SELECT {REMINDER_COLUMNS} FROM reminders WHERE id = ?"
        ))?;
        statement.bind((1, id))?;

        if statement.next()? == State::Row {
            Ok(Some(read_reminder(&statement)?))
        } else {
            Ok(None)
        }
    }

    /// Move a reminder to a new expiry time.
    ///
    /// Snoozes arrive on already-delivered reminders, so the delivered
    /// marker is cleared and the reminder becomes pending again. Returns
    /// `None` if the reminder no longer exists; callers treat that as the
    /// reminder having expired.
    pub async fn reschedule_reminder(
        &self,
        id: i64,
        expire_at: DateTime<Utc>,
    ) -> Result<Option<Reminder>> {
        let connection = self.connection.lock().await;
        let mut statement = connection.prepare(format!(
            "UPDATE reminders SET expire_at = ?, handled_at = NULL WHERE id = ? \
             RETURNING {REMINDER_COLUMNS}"
        ))?;
        statement.bind((1, expire_at.timestamp()))?;
        statement.bind((2, id))?;

        if statement.next()? == State::Row {
            Ok(Some(read_reminder(&statement)?))
        } else {
            Ok(None)
        }
    }

    /// Mark a reminder as delivered, retaining the row for the grace window.
    pub async fn mark_reminder_handled(&self, id: i64) -> Result<()> {
        let connection = self.connection.lock().await;
        let mut statement =
            connection.prepare("UPDATE reminders SET handled_at = ? WHERE id = ?")?;
        statement.bind((1, Utc::now().timestamp()))?;
        statement.bind((2, id))?;
        statement.next()?;
        Ok(())
    }

    /// Physically delete a reminder.
    pub async fn delete_reminder(&self, id: i64) -> Result<()> {
        let connection = self.connection.lock().await;
        let mut statement = connection.prepare("DELETE FROM reminders WHERE id = ?")?;
        statement.bind((1, id))?;
        statement.next()?;
        Ok(())
    }

    /// All undelivered reminders whose expiry has passed.
    pub async fn get_expired_reminders(&self, now: DateTime<Utc>) -> Result<Vec<Reminder>> {
        let connection = self.connection.lock().await;
        let mut statement = connection.prepare(format!(
            "SELECT {REMINDER_COLUMNS} FROM reminders WHERE handled_at IS NULL AND expire_at <= ?"
        ))?;
        statement.bind((1, now.timestamp()))?;

        collect_reminders(&mut statement)
    }

    /// All delivered reminders handled at or before `older_than`.
    pub async fn get_handled_reminders(&self, older_than: DateTime<Utc>) -> Result<Vec<Reminder>> {
        let connection = self.connection.lock().await;
        let mut statement = connection.prepare(format!(
            "SELECT {REMINDER_COLUMNS} FROM reminders WHERE handled_at IS NOT NULL AND handled_at <= ?"
        ))?;
        statement.bind((1, older_than.timestamp()))?;

        collect_reminders(&mut statement)
    }

    /// One page of a user's pending reminders, soonest first.
    pub async fn get_reminders_for(
        &self,
        user_id: u64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Reminder>> {
        let connection = self.connection.lock().await;
        let mut statement = connection.prepare(format!(
            "SELECT {REMINDER_COLUMNS} FROM reminders WHERE user_id = ? AND handled_at IS NULL \
             ORDER BY expire_at ASC LIMIT ? OFFSET ?"
        ))?;
        statement.bind((1, user_id as i64))?;
        statement.bind((2, limit))?;
        statement.bind((3, offset))?;

        collect_reminders(&mut statement)
    }

    /// Number of pending reminders a user has.
    pub async fn get_reminders_count_for(&self, user_id: u64) -> Result<i64> {
        let connection = self.connection.lock().await;
        let mut statement = connection
            .prepare("SELECT COUNT(*) AS count FROM reminders WHERE user_id = ? AND handled_at IS NULL")?;
        statement.bind((1, user_id as i64))?;

        anyhow::ensure!(statement.next()? == State::Row, "count returned no row");
        Ok(statement.read::<i64, _>("count")?)
    }

    /// Cached DM channel for a user, if one has been created before.
    pub async fn get_dm_channel_for_user(&self, user_id: u64) -> Result<Option<u64>> {
        let connection = self.connection.lock().await;
        let mut statement =
            connection.prepare("SELECT channel_id FROM dm_channels WHERE user_id = ?")?;
        statement.bind((1, user_id as i64))?;

        if statement.next()? == State::Row {
            Ok(Some(statement.read::<i64, _>("channel_id")? as u64))
        } else {
            Ok(None)
        }
    }

    /// Cache the DM channel for a user after its first creation.
    pub async fn add_dm_channel(&self, channel_id: u64, user_id: u64) -> Result<()> {
        let connection = self.connection.lock().await;
        let mut statement = connection
            .prepare("INSERT OR REPLACE INTO dm_channels (user_id, channel_id) VALUES (?, ?)")?;
        statement.bind((1, user_id as i64))?;
        statement.bind((2, channel_id as i64))?;
        statement.next()?;
        Ok(())
    }
}

fn read_reminder(statement: &sqlite::Statement<'_>) -> Result<Reminder> {
    let expire_at = statement.read::<i64, _>("expire_at")?;
    let handled_at = statement.read::<Option<i64>, _>("handled_at")?;

    Ok(Reminder {
        id: statement.read::<i64, _>("id")?,
        user_id: statement.read::<i64, _>("user_id")? as u64,
        description: statement.read::<String, _>("description")?,
        expire_at: DateTime::from_timestamp(expire_at, 0)
            .context("invalid expire_at timestamp")?,
        reference_message_id: statement
            .read::<Option<i64>, _>("reference_message_id")?
            .map(|v| v as u64),
        reference_channel_id: statement
            .read::<Option<i64>, _>("reference_channel_id")?
            .map(|v| v as u64),
        reference_guild_id: statement
            .read::<Option<i64>, _>("reference_guild_id")?
            .map(|v| v as u64),
        handled_at: handled_at
            .map(|ts| DateTime::from_timestamp(ts, 0).context("invalid handled_at timestamp"))
            .transpose()?,
    })
}

fn collect_reminders(statement: &mut sqlite::Statement<'_>) -> Result<Vec<Reminder>> {
    let mut reminders = Vec::new();
    while statement.next()? == State::Row {
        reminders.push(read_reminder(statement)?);
    }
    Ok(reminders)
}
