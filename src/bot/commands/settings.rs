//! Settings Discord commands - profile fields and reminder preferences.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, user_session},
        core::{profile::ProfileUpdate, session, summary},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Parent command for your profile and reminder preferences.
    #[poise::command(
        slash_command,
        subcommands("settings_show", "settings_notify", "settings_profile", "settings_avatar")
    )]
    pub async fn settings(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Settings command. Available subcommands:\n\
            `/settings show` - Show your profile and reminder preferences\n\
            `/settings notify` - Turn reminder emails on or off\n\
            `/settings profile` - Update nickname and email\n\
            `/settings avatar` - Set or clear your avatar";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Shows your profile and reminder preferences.
    #[poise::command(slash_command, rename = "show")]
    pub async fn settings_show(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let slot = user_session(ctx).await?;
        let state = slot.lock().await;
        let Some(profile) = state.profile.as_ref() else {
            return Err(Error::ProfileNotFound {
                id: ctx.author().id.to_string(),
            });
        };

        let reminders = if profile.email_notify {
            format!("On, {} day(s) before expiry", profile.reminder_days)
        } else {
            "Off".to_string()
        };

        let mut embed = serenity::CreateEmbed::default()
            .title(format!("⚙️ Settings for {}", summary::display_name(Some(profile))))
            .color(0x0034_98DB)
            .field(
                "Nickname",
                profile.nickname.as_deref().unwrap_or("not set"),
                true,
            )
            .field("Email", profile.email.as_deref().unwrap_or("not set"), true)
            .field("Reminder emails", reminders, false);
        if let Some(url) = &profile.avatar_url {
            embed = embed.thumbnail(url);
        }
        if profile.email_notify && profile.email.is_none() {
            embed = embed.footer(serenity::CreateEmbedFooter::new(
                "Set an email with /settings profile to receive reminders",
            ));
        }

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Turns reminder emails on or off and sets the lead time.
    #[poise::command(slash_command, rename = "notify")]
    pub async fn settings_notify(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Send reminder emails"] enabled: bool,
        #[description = "Days before expiry to start reminding (1-365)"] days: Option<i32>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let slot = user_session(ctx).await?;
        let mut state = slot.lock().await;

        let current_days = state
            .profile
            .as_ref()
            .map_or(ctx.data().config.defaults.reminder_days, |p| p.reminder_days);
        let saved =
            session::save_settings(db, &mut state, enabled, days.unwrap_or(current_days)).await?;

        let message = if saved.email_notify {
            format!(
                "🔔 Reminders on: you'll hear from us {} day(s) before a subscription expires.",
                saved.reminder_days
            )
        } else {
            "🔕 Reminder emails turned off.".to_string()
        };
        ctx.say(message).await?;
        Ok(())
    }

    /// Updates your nickname and/or email. An empty value clears the field.
    #[poise::command(slash_command, rename = "profile")]
    pub async fn settings_profile(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Nickname used in greetings"] nickname: Option<String>,
        #[description = "Email address for reminders"] email: Option<String>,
    ) -> Result<()> {
        if nickname.is_none() && email.is_none() {
            ctx.say("ℹ️ Nothing to change.").await?;
            return Ok(());
        }

        let db = &ctx.data().database;
        let slot = user_session(ctx).await?;
        let mut state = slot.lock().await;
        let saved = session::save_profile(db, &mut state, ProfileUpdate { nickname, email }).await?;

        ctx.say(format!(
            "✅ Profile saved. Hi {}!",
            summary::display_name(Some(&saved))
        ))
        .await?;
        Ok(())
    }

    /// Sets your avatar to an uploaded image URL, or clears it.
    #[poise::command(slash_command, rename = "avatar")]
    pub async fn settings_avatar(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Public image URL; leave empty to clear"] url: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let slot = user_session(ctx).await?;
        let mut state = slot.lock().await;
        let saved = session::save_avatar(db, &mut state, url).await?;

        let message = if saved.avatar_url.is_some() {
            "🖼️ Avatar updated."
        } else {
            "🖼️ Avatar cleared."
        };
        ctx.say(message).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
