use anyhow::Result;
use dotenvy::dotenv;
use log::{error, info};
use serenity::async_trait;
use serenity::http::Http;
use serenity::model::application::interaction::Interaction;
use serenity::model::gateway::Ready;
use serenity::model::id::GuildId;
use serenity::prelude::*;
use std::sync::Arc;

use remindme::commands::handlers::create_all_handlers;
use remindme::commands::{
    register_global_commands, register_guild_commands, CommandContext, CommandRegistry,
};
use remindme::core::Config;
use remindme::database::Database;
use remindme::features::reminders::{
    register_interaction_handlers, DiscordMessenger, ReminderEngine, ReminderScheduler,
};
use remindme::interactions::{ComponentContext, InteractionRouter, ModalContext};
use remindme::message_components::MessagePayload;

const INTERACTION_ERROR_MESSAGE: &str =
    "❌ Sorry, I encountered an error processing your interaction. Please try again.";

struct Handler {
    registry: CommandRegistry,
    command_context: Arc<CommandContext>,
    component_router: Arc<InteractionRouter<ComponentContext>>,
    modal_router: Arc<InteractionRouter<ModalContext>>,
    guild_id: Option<GuildId>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("🎉 {} is connected and ready!", ready.user.name);
        info!("📡 Connected to {} guilds", ready.guilds.len());
        info!("🤖 Bot ID: {}", ready.user.id);

        // Guild commands update instantly, global ones can take up to an hour
        if let Some(guild_id) = self.guild_id {
            info!("🔧 Development mode: Registering commands for guild {guild_id}");
            if let Err(e) = register_guild_commands(&ctx, guild_id).await {
                error!("❌ Failed to register guild commands: {e}");
            }
        } else {
            info!("🌍 Production mode: Registering commands globally");
            if let Err(e) = register_global_commands(&ctx).await {
                error!("❌ Failed to register global commands: {e}");
            }
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::ApplicationCommand(command) => {
                let Some(handler) = self.registry.get(&command.data.name) else {
                    error!("No handler registered for command '{}'", command.data.name);
                    return;
                };

                if let Err(e) = handler
                    .handle(Arc::clone(&self.command_context), &ctx, &command)
                    .await
                {
                    error!("Error handling command '{}': {e:#}", command.data.name);

                    // The handler may have failed before or after responding;
                    // a fresh ephemeral response is the only safe fallback.
                    let _ = command
                        .create_interaction_response(&ctx.http, |response| {
                            response
                                .kind(serenity::model::application::interaction::InteractionResponseType::ChannelMessageWithSource)
                                .interaction_response_data(|message| {
                                    message.content(INTERACTION_ERROR_MESSAGE).ephemeral(true)
                                })
                        })
                        .await;
                }
            }
            Interaction::MessageComponent(component) => {
                let custom_id = component.data.custom_id.clone();
                let context = Arc::new(ComponentContext::new(ctx, component));

                if let Err(e) = self.component_router.dispatch(&custom_id, Arc::clone(&context)).await {
                    error!("Error handling component '{custom_id}': {e:#}");
                    // Fails with ResponseAlreadySent when the handler already
                    // answered; nothing more to do then.
                    let _ = context
                        .respond(&MessagePayload::text(INTERACTION_ERROR_MESSAGE), true)
                        .await;
                }
            }
            Interaction::ModalSubmit(modal) => {
                let custom_id = modal.data.custom_id.clone();
                let context = Arc::new(ModalContext::new(ctx, modal));

                if let Err(e) = self.modal_router.dispatch(&custom_id, Arc::clone(&context)).await {
                    error!("Error handling modal '{custom_id}': {e:#}");
                    let _ = context
                        .respond(&MessagePayload::text(INTERACTION_ERROR_MESSAGE), true)
                        .await;
                }
            }
            _ => {}
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting RemindMe Discord Bot...");

    let database = Database::new(&config.database_path).await?;

    // The engine gets its own HTTP client; deliveries run from the
    // scheduler, outside any gateway event context.
    let http = Arc::new(Http::new(&config.discord_token));
    let messenger = Arc::new(DiscordMessenger::new(http));
    let engine = ReminderEngine::new(database, messenger);

    // Registration phase: duplicate command names or token prefixes are
    // startup bugs and abort here.
    let mut registry = CommandRegistry::new();
    for handler in create_all_handlers() {
        registry.register(handler)?;
    }

    let mut component_router = InteractionRouter::new();
    let mut modal_router = InteractionRouter::new();
    register_interaction_handlers(&mut component_router, &mut modal_router, &engine)?;
    info!(
        "Registered {} commands, {} component handlers, {} modal handlers",
        registry.len(),
        component_router.len(),
        modal_router.len()
    );

    let command_context = Arc::new(CommandContext::new(engine.clone()));

    // Parse guild ID if provided for development mode
    let guild_id = config
        .discord_guild_id
        .as_ref()
        .and_then(|id| id.parse::<u64>().ok())
        .map(GuildId);

    let handler = Handler {
        registry,
        command_context,
        component_router: Arc::new(component_router),
        modal_router: Arc::new(modal_router),
        guild_id,
    };

    let intents = GatewayIntents::GUILDS | GatewayIntents::DIRECT_MESSAGES;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            error!("This could indicate:");
            error!("  - Invalid bot token format");
            error!("  - Network issues reaching Discord API");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    info!("Bot configured successfully. Connecting to Discord gateway...");

    // Start the reminder polling loops
    let scheduler = ReminderScheduler::new(engine);
    scheduler.start();

    info!("Gateway intents: {intents:?}");

    if let Err(why) = client.start().await {
        error!("Gateway connection failed: {why:?}");
        error!("This could be due to:");
        error!("  - Invalid bot token");
        error!("  - Network connectivity issues");
        error!("  - Discord API outage");
        return Err(anyhow::anyhow!(
            "Failed to establish gateway connection: {}",
            why
        ));
    }

    Ok(())
}
