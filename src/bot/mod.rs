//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for `SubTrack`, including all
//! slash commands, autocomplete handlers, and bot context management. The
//! invoking Discord user id is the current user of every command.

/// Discord command implementations (subscriptions, settings, general)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{
    config::AppConfig,
    core::{
        session::{self, SessionStore},
        state::AppState,
    },
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, instrument};

/// Shared data available to all bot commands.
/// This structure holds the database connection, the loaded configuration and
/// the per-user session slots.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Application settings
    pub config: Arc<AppConfig>,
    /// Per-user application state
    pub sessions: SessionStore,
}

impl BotData {
    /// Creates a new `BotData` instance with empty sessions.
    #[must_use]
    pub fn new(database: DatabaseConnection, config: Arc<AppConfig>) -> Self {
        Self {
            database,
            config,
            sessions: SessionStore::new(),
        }
    }
}

/// Poise context used by every command.
pub type Context<'a> = poise::Context<'a, BotData, Error>;

/// Returns the caller's session slot, loading their data on first use.
pub async fn user_session(ctx: Context<'_>) -> Result<Arc<Mutex<AppState>>> {
    let data = ctx.data();
    let user_id = ctx.author().id.to_string();
    let slot = data.sessions.slot(&user_id).await;
    {
        let mut state = slot.lock().await;
        if state.user_id.is_none() {
            session::open_session(&data.database, &mut state, &user_id, &data.config.defaults)
                .await?;
        }
    }
    Ok(slot)
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            let reply = match &error {
                Error::Validation { message } => format!("❌ {message}"),
                Error::SubscriptionNotFound { .. } => "❌ Subscription not found.".to_string(),
                Error::NotAuthenticated => "❌ You need to be signed in.".to_string(),
                other => {
                    error!("Error in command `{}`: {:?}", ctx.command().name, other);
                    format!("An error occurred: {other}")
                }
            };
            if let Err(e) = ctx.say(reply).await {
                error!("Failed to send error message: {}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Starts the Discord client and blocks until it stops.
#[instrument(skip(token, config, database))]
pub async fn run_bot(
    token: String,
    config: Arc<AppConfig>,
    database: DatabaseConnection,
) -> std::result::Result<(), serenity::Error> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::ping(),
                commands::help(),
                commands::subscription(),
                commands::renewals(),
                commands::dashboard(),
                commands::settings(),
            ],
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(BotData::new(database, config))
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::Client::builder(&token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {:?}", e))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {:?}", e))
}
