//! Handler-facing wrappers around component and modal interactions
//!
//! Each context bundles the serenity context, the raw interaction, the
//! parsed correlation token arguments and the shared response state. All
//! response methods go through `ResponseState::initial` so the
//! one-initial-response invariant holds no matter which path answers.

use std::collections::HashMap;
use std::sync::Arc;

use serenity::builder::CreateComponents;
use serenity::model::application::component::ActionRowComponent;
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::application::interaction::modal::ModalSubmitInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::model::channel::Message;
use serenity::prelude::Context;

use super::error::InteractionError;
use super::keys;
use super::response::ResponseState;
use super::router::RoutedContext;
use crate::message_components::MessagePayload;

/// Context for a message component interaction (button, select menu).
pub struct ComponentContext {
    pub serenity_ctx: Context,
    pub interaction: MessageComponentInteraction,
    /// Positional arguments parsed from the correlation token.
    pub arguments: Vec<String>,
    state: Arc<ResponseState>,
}

impl ComponentContext {
    pub fn new(serenity_ctx: Context, interaction: MessageComponentInteraction) -> Self {
        let arguments = keys::arguments_of(&interaction.data.custom_id);
        Self {
            serenity_ctx,
            interaction,
            arguments,
            state: Arc::new(ResponseState::new()),
        }
    }

    /// Values picked in a select menu, empty for buttons.
    pub fn selected_values(&self) -> &[String] {
        &self.interaction.data.values
    }

    /// The message the component is attached to.
    pub fn message(&self) -> &Message {
        &self.interaction.message
    }

    pub fn user_id(&self) -> u64 {
        self.interaction.user.id.0
    }

    /// Send the initial response as a new message.
    pub async fn respond(
        &self,
        payload: &MessagePayload,
        ephemeral: bool,
    ) -> Result<(), InteractionError> {
        self.state
            .initial(|| async {
                self.interaction
                    .create_interaction_response(&self.serenity_ctx.http, |response| {
                        response
                            .kind(InteractionResponseType::ChannelMessageWithSource)
                            .interaction_response_data(|data| {
                                payload.apply_to_response_data(data);
                                data.ephemeral(ephemeral)
                            })
                    })
                    .await
            })
            .await
    }

    /// Send the initial response as an in-place edit of the component's
    /// own message.
    pub async fn update(&self, payload: &MessagePayload) -> Result<(), InteractionError> {
        self.state
            .initial(|| async {
                self.interaction
                    .create_interaction_response(&self.serenity_ctx.http, |response| {
                        response
                            .kind(InteractionResponseType::UpdateMessage)
                            .interaction_response_data(|data| payload.apply_to_response_data(data))
                    })
                    .await
            })
            .await
    }

    /// Send the initial response as a modal prompt.
    pub async fn respond_with_modal(
        &self,
        custom_id: &str,
        title: &str,
        components: CreateComponents,
    ) -> Result<(), InteractionError> {
        self.state
            .initial(|| async {
                self.interaction
                    .create_interaction_response(&self.serenity_ctx.http, |response| {
                        response
                            .kind(InteractionResponseType::Modal)
                            .interaction_response_data(|data| {
                                data.custom_id(custom_id)
                                    .title(title)
                                    .set_components(components.clone())
                            })
                    })
                    .await
            })
            .await
    }
}

impl RoutedContext for ComponentContext {
    fn response_state(&self) -> Arc<ResponseState> {
        Arc::clone(&self.state)
    }
}

/// Context for a modal submit interaction.
pub struct ModalContext {
    pub serenity_ctx: Context,
    pub interaction: ModalSubmitInteraction,
    /// Positional arguments parsed from the correlation token.
    pub arguments: Vec<String>,
    /// Submitted input values keyed by the input's custom id.
    values: HashMap<String, String>,
    state: Arc<ResponseState>,
}

impl ModalContext {
    pub fn new(serenity_ctx: Context, interaction: ModalSubmitInteraction) -> Self {
        let arguments = keys::arguments_of(&interaction.data.custom_id);
        let mut values = HashMap::new();
        for row in &interaction.data.components {
            for component in &row.components {
                if let ActionRowComponent::InputText(input) = component {
                    values.insert(input.custom_id.clone(), input.value.clone());
                }
            }
        }
        Self {
            serenity_ctx,
            interaction,
            arguments,
            values,
            state: Arc::new(ResponseState::new()),
        }
    }

    /// The submitted value of one text input, if present and non-empty.
    pub fn value(&self, custom_id: &str) -> Option<&str> {
        self.values
            .get(custom_id)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// The message the modal was opened from, if any.
    pub fn message(&self) -> Option<&Message> {
        self.interaction.message.as_ref()
    }

    pub fn user_id(&self) -> u64 {
        self.interaction.user.id.0
    }

    /// Send the initial response as a new message.
    pub async fn respond(
        &self,
        payload: &MessagePayload,
        ephemeral: bool,
    ) -> Result<(), InteractionError> {
        self.state
            .initial(|| async {
                self.interaction
                    .create_interaction_response(&self.serenity_ctx.http, |response| {
                        response
                            .kind(InteractionResponseType::ChannelMessageWithSource)
                            .interaction_response_data(|data| {
                                payload.apply_to_response_data(data);
                                data.ephemeral(ephemeral)
                            })
                    })
                    .await
            })
            .await
    }
}

impl RoutedContext for ModalContext {
    fn response_state(&self) -> Arc<ResponseState> {
        Arc::clone(&self.state)
    }
}
