use dotenvy::dotenv;
use serde_json::json;
use std::{env, process::ExitCode, sync::Arc};
use subtrack::{
    bot,
    config::{self, AppConfig},
    core::{reminder, status},
    errors::{Error, Result},
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also be set externally
    dotenv().ok();

    let remind = env::args().nth(1).is_some_and(|arg| arg == "remind");
    let outcome = if remind { run_remind().await } else { run().await };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Fatal error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn setup() -> Result<(AppConfig, sea_orm::DatabaseConnection)> {
    let app_config = config::load_app_configuration()?;
    info!("Successfully processed application configuration.");

    let db = config::database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    config::database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))?;
    Ok((app_config, db))
}

/// Starts the Discord bot.
async fn run() -> Result<()> {
    let (app_config, db) = setup().await?;

    // DISCORD_BOT_TOKEN is loaded here, directly before use, not stored in AppConfig
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {}", e))
        .map_err(Error::EnvVar)?;

    bot::run_bot(token, Arc::new(app_config), db)
        .await
        .map_err(Error::from)
}

/// Runs one reminder batch and prints its summary as JSON.
async fn run_remind() -> Result<()> {
    let result = match setup().await {
        Ok((app_config, db)) => {
            reminder::run_with_resend(&db, &app_config.reminder, status::today()).await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(summary) => {
            let report = json!({
                "success": true,
                "processed_users": summary.processed_users,
                "results": summary.results,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Err(e) => {
            let report = json!({ "success": false, "error": e.to_string() });
            println!("{}", serde_json::to_string_pretty(&report)?);
            Err(e)
        }
    }
}
