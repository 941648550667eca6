//! General Discord commands - ping and help.
//! These commands don't touch the database.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**SubTrack Help**\n\
        Track your subscriptions and get reminded before they expire.\n\n\
        **Subscriptions**\n\
        • `/subscription add <name> <expiry> [category] [price] ...` - Records a subscription.\n\
        • `/subscription edit <name> [new fields]` - Changes a subscription.\n\
        • `/subscription delete <name>` - Removes a subscription.\n\
        • `/subscription list [search] [category]` - Lists and searches your subscriptions.\n\n\
        **Overview**\n\
        • `/dashboard` - Counts by status and what needs attention.\n\
        • `/renewals` - Expiring and expired subscriptions.\n\n\
        **Settings**\n\
        • `/settings show` - Shows your profile and reminder preferences.\n\
        • `/settings notify <enabled> [days]` - Turns reminder emails on or off.\n\
        • `/settings profile [nickname] [email]` - Updates your nickname and email.\n\
        • `/settings avatar [url]` - Sets or clears your avatar.\n\n\
        **Utility**\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message.\n\n\
        Dates use the `YYYY-MM-DD` format.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
