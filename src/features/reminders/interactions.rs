//! Routed handlers for reminder components and modals
//!
//! Everything a user can click or submit on a reminder surface lands
//! here: the snooze select and its custom-time modal, the
//! create-from-message modal, and the list's pagination, view and
//! delete controls.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use log::warn;

use super::engine::{MessageReference, ReminderEngine, ReminderError};
use crate::interactions::keys;
use crate::interactions::{
    ComponentContext, InteractionError, InteractionHandler, InteractionRouter, ModalContext,
};
use crate::message_components::{self, MessagePayload, REMINDERS_PER_PAGE};

/// Parse one positional argument out of a correlation token.
fn parse_argument<T: FromStr>(arguments: &[String], index: usize) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    arguments
        .get(index)
        .with_context(|| format!("missing correlation token argument {index}"))?
        .parse()
        .with_context(|| format!("malformed correlation token argument {index}"))
}

/// Render one page of a user's reminders, or `None` when they have none.
pub async fn reminder_list_payload(
    engine: &ReminderEngine,
    user_id: u64,
    offset: i64,
) -> Result<Option<MessagePayload>> {
    let count = engine.database().get_reminders_count_for(user_id).await?;
    if count == 0 {
        return Ok(None);
    }

    let reminders = engine
        .database()
        .get_reminders_for(user_id, offset, REMINDERS_PER_PAGE)
        .await?;
    Ok(Some(message_components::reminder_list(
        &reminders, offset, count,
    )))
}

/// Snooze select menu on a delivered reminder.
struct SnoozeSelectHandler {
    engine: ReminderEngine,
}

#[async_trait]
impl InteractionHandler<ComponentContext> for SnoozeSelectHandler {
    fn prefix(&self) -> &'static str {
        keys::REMINDER_SNOOZE_SELECT
    }

    async fn handle(&self, ctx: Arc<ComponentContext>) -> Result<()> {
        let reminder_id: i64 = parse_argument(&ctx.arguments, 0)?;
        if self.engine.database().get_reminder(reminder_id).await?.is_none() {
            ctx.respond(&MessagePayload::text("This reminder has expired"), true)
                .await?;
            return Ok(());
        }

        let value = ctx
            .selected_values()
            .first()
            .context("snooze select without a value")?;

        if value == "custom" {
            ctx.respond_with_modal(
                &keys::make_key(keys::REMINDER_SNOOZE_CUSTOM_MODAL, &[reminder_id]),
                "Choose custom snooze time",
                message_components::snooze_custom_modal(),
            )
            .await?;
            return Ok(());
        }

        let original = ctx.message();
        reschedule_and_ack(
            &self.engine,
            ctx.as_ref(),
            reminder_id,
            value,
            Some((original.channel_id.0, original.id.0)),
        )
        .await
    }
}

/// Custom snooze time modal submit.
struct SnoozeCustomModalHandler {
    engine: ReminderEngine,
}

#[async_trait]
impl InteractionHandler<ModalContext> for SnoozeCustomModalHandler {
    fn prefix(&self) -> &'static str {
        keys::REMINDER_SNOOZE_CUSTOM_MODAL
    }

    async fn handle(&self, ctx: Arc<ModalContext>) -> Result<()> {
        let reminder_id: i64 = parse_argument(&ctx.arguments, 0)?;
        let when = ctx.value("when").context("modal submit without 'when'")?;

        // The delivered reminder message the modal was opened from
        let original = ctx
            .message()
            .map(|message| (message.channel_id.0, message.id.0));

        reschedule_and_ack(&self.engine, ctx.as_ref(), reminder_id, when, original).await
    }
}

/// Shared snooze flow: reschedule, acknowledge ephemerally, then replace
/// the delivered reminder message with its snoozed rendering.
async fn reschedule_and_ack<C: Responder>(
    engine: &ReminderEngine,
    ctx: &C,
    reminder_id: i64,
    when_str: &str,
    original: Option<(u64, u64)>,
) -> Result<()> {
    let reminder = match engine.reschedule_reminder(reminder_id, when_str).await {
        Ok(reminder) => reminder,
        Err(ReminderError::UnparsableTime(_)) => {
            ctx.respond(&MessagePayload::text("Unknown time format"), true)
                .await?;
            return Ok(());
        }
        Err(ReminderError::NotFound(_)) => {
            ctx.respond(&MessagePayload::text("This reminder has expired"), true)
                .await?;
            return Ok(());
        }
        Err(error) => return Err(error.into()),
    };

    ctx.respond(&message_components::reminder_ack(&reminder, true), true)
        .await?;

    if let Some((channel_id, message_id)) = original {
        engine
            .refresh_delivered_message(&reminder, channel_id, message_id, reminder.expire_at)
            .await;
    }
    Ok(())
}

/// The one response shape the snooze flow needs from either context kind.
#[async_trait]
trait Responder: Send + Sync {
    async fn respond(
        &self,
        payload: &MessagePayload,
        ephemeral: bool,
    ) -> Result<(), InteractionError>;
}

#[async_trait]
impl Responder for ComponentContext {
    async fn respond(
        &self,
        payload: &MessagePayload,
        ephemeral: bool,
    ) -> Result<(), InteractionError> {
        ComponentContext::respond(self, payload, ephemeral).await
    }
}

#[async_trait]
impl Responder for ModalContext {
    async fn respond(
        &self,
        payload: &MessagePayload,
        ephemeral: bool,
    ) -> Result<(), InteractionError> {
        ModalContext::respond(self, payload, ephemeral).await
    }
}

/// Create-from-message modal submit.
struct CreateFromMessageModalHandler {
    engine: ReminderEngine,
}

#[async_trait]
impl InteractionHandler<ModalContext> for CreateFromMessageModalHandler {
    fn prefix(&self) -> &'static str {
        keys::REMINDER_CREATE_MODAL
    }

    async fn handle(&self, ctx: Arc<ModalContext>) -> Result<()> {
        let guild_id: u64 = parse_argument(&ctx.arguments, 0)?;
        let channel_id: u64 = parse_argument(&ctx.arguments, 1)?;
        let message_id: u64 = parse_argument(&ctx.arguments, 2)?;

        let when = ctx.value("when").context("modal submit without 'when'")?;
        let description = ctx.value("description");
        let public_ack = ctx
            .value("public_ack")
            .map(|value| value.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let reference = MessageReference {
            message_id,
            channel_id,
            // DMs encode a zero guild id in the token
            guild_id: (guild_id != 0).then_some(guild_id),
        };

        let reminder = match self
            .engine
            .create_reminder(ctx.user_id(), when, description, Some(reference))
            .await
        {
            Ok(reminder) => reminder,
            Err(ReminderError::UnparsableTime(_)) => {
                ctx.respond(&MessagePayload::text("Unknown time format"), true)
                    .await?;
                return Ok(());
            }
            Err(error) => return Err(error.into()),
        };

        ctx.respond(
            &message_components::reminder_ack(&reminder, false),
            !public_ack,
        )
        .await?;
        Ok(())
    }
}

/// Pagination buttons on the reminder list.
struct ListMoveHandler {
    engine: ReminderEngine,
}

#[async_trait]
impl InteractionHandler<ComponentContext> for ListMoveHandler {
    fn prefix(&self) -> &'static str {
        keys::REMINDER_LIST_MOVE
    }

    async fn handle(&self, ctx: Arc<ComponentContext>) -> Result<()> {
        let offset: i64 = parse_argument(&ctx.arguments, 0)?;

        match reminder_list_payload(&self.engine, ctx.user_id(), offset).await? {
            Some(payload) => ctx.update(&payload).await?,
            None => {
                ctx.update(&MessagePayload::text("No currently active reminders."))
                    .await?
            }
        }
        Ok(())
    }
}

/// Per-reminder view buttons on the list.
struct ViewHandler {
    engine: ReminderEngine,
}

#[async_trait]
impl InteractionHandler<ComponentContext> for ViewHandler {
    fn prefix(&self) -> &'static str {
        keys::REMINDER_VIEW
    }

    async fn handle(&self, ctx: Arc<ComponentContext>) -> Result<()> {
        let reminder_id: i64 = parse_argument(&ctx.arguments, 0)?;
        let offset: i64 = parse_argument(&ctx.arguments, 1)?;

        match self.engine.database().get_reminder(reminder_id).await? {
            Some(reminder) => {
                ctx.update(&message_components::reminder_view(&reminder, offset))
                    .await?
            }
            None => {
                warn!("View requested for missing reminder {reminder_id}");
                ctx.respond(&MessagePayload::text("Reminder not found"), true)
                    .await?
            }
        }
        Ok(())
    }
}

/// Delete button on the reminder detail view.
struct DeleteHandler {
    engine: ReminderEngine,
}

#[async_trait]
impl InteractionHandler<ComponentContext> for DeleteHandler {
    fn prefix(&self) -> &'static str {
        keys::REMINDER_DELETE
    }

    async fn handle(&self, ctx: Arc<ComponentContext>) -> Result<()> {
        let reminder_id: i64 = parse_argument(&ctx.arguments, 0)?;
        let offset: i64 = parse_argument(&ctx.arguments, 1)?;

        self.engine.database().delete_reminder(reminder_id).await?;

        // Back to the list the user came from
        match reminder_list_payload(&self.engine, ctx.user_id(), offset).await? {
            Some(payload) => ctx.update(&payload).await?,
            None => {
                ctx.update(&MessagePayload::text("No currently active reminders."))
                    .await?
            }
        }
        Ok(())
    }
}

/// Register every reminder handler on the two routers.
pub fn register_interaction_handlers(
    components: &mut InteractionRouter<ComponentContext>,
    modals: &mut InteractionRouter<ModalContext>,
    engine: &ReminderEngine,
) -> Result<(), InteractionError> {
    components.register(Arc::new(SnoozeSelectHandler {
        engine: engine.clone(),
    }))?;
    components.register(Arc::new(ListMoveHandler {
        engine: engine.clone(),
    }))?;
    components.register(Arc::new(ViewHandler {
        engine: engine.clone(),
    }))?;
    components.register(Arc::new(DeleteHandler {
        engine: engine.clone(),
    }))?;
    modals.register(Arc::new(SnoozeCustomModalHandler {
        engine: engine.clone(),
    }))?;
    modals.register(Arc::new(CreateFromMessageModalHandler {
        engine: engine.clone(),
    }))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::database::Database;
    use crate::features::reminders::messenger::{Messenger, MessengerError};

    // A messenger that accepts everything; list rendering never sends.
    struct NullMessenger;

    #[async_trait]
    impl Messenger for NullMessenger {
        async fn create_dm_channel(&self, user_id: u64) -> Result<u64, MessengerError> {
            Ok(user_id)
        }

        async fn send_message(
            &self,
            _channel_id: u64,
            _payload: &MessagePayload,
        ) -> Result<u64, MessengerError> {
            Ok(1)
        }

        async fn edit_message(
            &self,
            _channel_id: u64,
            _message_id: u64,
            _payload: &MessagePayload,
        ) -> Result<(), MessengerError> {
            Ok(())
        }
    }

    async fn test_engine() -> ReminderEngine {
        let database = Database::new(":memory:").await.unwrap();
        ReminderEngine::new(database, Arc::new(NullMessenger))
    }

    #[test]
    fn test_parse_argument() {
        let arguments = vec!["42".to_string(), "10".to_string()];
        assert_eq!(parse_argument::<i64>(&arguments, 0).unwrap(), 42);
        assert_eq!(parse_argument::<u64>(&arguments, 1).unwrap(), 10);
        assert!(parse_argument::<i64>(&arguments, 2).is_err());

        let bad = vec!["x".to_string()];
        assert!(parse_argument::<i64>(&bad, 0).is_err());
    }

    #[tokio::test]
    async fn test_list_payload_empty() {
        let engine = test_engine().await;
        assert!(reminder_list_payload(&engine, 1, 0).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_payload_pages() {
        let engine = test_engine().await;
        for i in 0..7 {
            engine
                .create_reminder(1, "1h", Some(&format!("r{i}")), None)
                .await
                .unwrap();
        }

        let first = reminder_list_payload(&engine, 1, 0).await.unwrap().unwrap();
        assert!(first.embed.is_some());

        let second = reminder_list_payload(&engine, 1, 5).await.unwrap().unwrap();
        assert!(second.embed.is_some());

        // Another user sees nothing
        assert!(reminder_list_payload(&engine, 2, 0).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_registration_is_complete_and_unique() {
        let engine = test_engine().await;
        let mut components = InteractionRouter::new();
        let mut modals = InteractionRouter::new();

        register_interaction_handlers(&mut components, &mut modals, &engine).unwrap();
        assert_eq!(components.len(), 4);
        assert_eq!(modals.len(), 2);

        // Registering twice trips the duplicate guard
        let result = register_interaction_handlers(&mut components, &mut modals, &engine);
        assert!(matches!(result, Err(InteractionError::DuplicateHandler(_))));
    }
}
