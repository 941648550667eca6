//! Subscription Discord commands - add, edit, delete, list, renewals and dashboard.
//!
//! Every write goes through the caller's session so the local list and the
//! store stay in step. Labels shown to the user are always recomputed from the
//! expiry date.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete, user_session},
        core::{
            form::DraftPatch,
            session,
            state::{Action, FormEvent},
            status::{self, DATE_FORMAT},
            subscription::display_price,
            summary,
        },
        entities::{BillingCycle, Status, subscription},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    /// Billing cadence offered as a slash command choice.
    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum BillingChoice {
        Monthly,
        Yearly,
    }

    impl From<BillingChoice> for BillingCycle {
        fn from(choice: BillingChoice) -> Self {
            match choice {
                BillingChoice::Monthly => Self::Monthly,
                BillingChoice::Yearly => Self::Yearly,
            }
        }
    }

    const fn status_emoji(status: Status) -> &'static str {
        match status {
            Status::Active => "🟢",
            Status::Expiring => "🟡",
            Status::Expired => "🔴",
        }
    }

    fn find_by_name<'a>(
        services: &'a [subscription::Model],
        name: &str,
    ) -> Option<&'a subscription::Model> {
        let wanted = name.trim().to_lowercase();
        services.iter().find(|s| s.name.to_lowercase() == wanted)
    }

    fn describe_line(service: &subscription::Model, today: chrono::NaiveDate) -> String {
        let classification = status::classify_subscription(service, today);
        format!(
            "{} **{}** · {} · {} · {} ({})",
            status_emoji(classification.status),
            service.name,
            service.category,
            display_price(service),
            service.expiry_date.format(DATE_FORMAT),
            status::describe_remaining(classification.days_remaining)
        )
    }

    /// Parent command for managing your subscriptions.
    ///
    /// Running this command by itself displays help text for its subcommands.
    #[poise::command(
        slash_command,
        subcommands(
            "subscription_add",
            "subscription_edit",
            "subscription_delete",
            "subscription_list"
        )
    )]
    pub async fn subscription(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Subscription management command. Available subcommands:\n\
            `/subscription add` - Record a new subscription\n\
            `/subscription edit` - Change an existing subscription\n\
            `/subscription delete` - Remove a subscription\n\
            `/subscription list` - List and search your subscriptions";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Records a new subscription.
    #[allow(clippy::too_many_arguments)]
    #[poise::command(slash_command, rename = "add")]
    pub async fn subscription_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Service name (e.g., 'Netflix Premium')"] name: String,
        #[description = "Expiry date, YYYY-MM-DD"] expiry: String,
        #[description = "Category (defaults to Other)"]
        #[autocomplete = "autocomplete::autocomplete_category"]
        category: Option<String>,
        #[description = "Price (e.g., 15.99)"] price: Option<String>,
        #[description = "Currency tag (e.g., $, €, HK$)"]
        #[autocomplete = "autocomplete::autocomplete_currency"]
        currency: Option<String>,
        #[description = "Billing cycle (defaults to monthly)"] billing: Option<BillingChoice>,
        #[description = "Start date, YYYY-MM-DD (defaults to today)"] start: Option<String>,
        #[description = "Renewal link"] renewal_link: Option<String>,
        #[description = "Notes"] notes: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let today = status::today();
        let slot = user_session(ctx).await?;
        let mut state = slot.lock().await;

        state.apply(Action::Form(FormEvent::OpenedAdd {
            today,
            currency: data.config.defaults.currency.clone(),
        }));
        state.apply(Action::Form(FormEvent::Edited(DraftPatch {
            name: Some(name),
            category,
            price,
            currency,
            billing_cycle: billing.map(Into::into),
            start_date: start,
            expiry_date: Some(expiry),
            notes,
            renewal_link,
            ..DraftPatch::default()
        })));

        let created = session::submit_form(&data.database, &mut state, today).await;
        // a rejected command leaves nothing half-edited behind
        state.apply(Action::Form(FormEvent::Cancelled));
        let created = created?;

        ctx.say(format!(
            "✅ Added subscription:\n{}",
            describe_line(&created, today)
        ))
        .await?;
        Ok(())
    }

    /// Changes fields of one of your subscriptions.
    #[allow(clippy::too_many_arguments)]
    #[poise::command(slash_command, rename = "edit")]
    pub async fn subscription_edit(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Subscription to edit"]
        #[autocomplete = "autocomplete::autocomplete_subscription_name"]
        name: String,
        #[description = "New name"] new_name: Option<String>,
        #[description = "New expiry date, YYYY-MM-DD"] expiry: Option<String>,
        #[description = "New category"]
        #[autocomplete = "autocomplete::autocomplete_category"]
        category: Option<String>,
        #[description = "New price"] price: Option<String>,
        #[description = "New currency tag"]
        #[autocomplete = "autocomplete::autocomplete_currency"]
        currency: Option<String>,
        #[description = "New billing cycle"] billing: Option<BillingChoice>,
        #[description = "New start date, YYYY-MM-DD"] start: Option<String>,
        #[description = "New renewal link (empty clears it)"] renewal_link: Option<String>,
        #[description = "New notes (empty clears them)"] notes: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let today = status::today();
        let slot = user_session(ctx).await?;
        let mut state = slot.lock().await;

        let Some(existing) = find_by_name(&state.services, &name).cloned() else {
            ctx.say(format!(
                "❌ Subscription '{name}' not found. Use `/subscription list` to see yours."
            ))
            .await?;
            return Ok(());
        };

        state.apply(Action::Form(FormEvent::OpenedEdit(Box::new(existing))));
        state.apply(Action::Form(FormEvent::Edited(DraftPatch {
            name: new_name,
            category,
            price,
            currency,
            billing_cycle: billing.map(Into::into),
            start_date: start,
            expiry_date: expiry,
            icon: None,
            notes,
            renewal_link,
        })));

        let updated = session::submit_form(db, &mut state, today).await;
        state.apply(Action::Form(FormEvent::Cancelled));
        let updated = updated?;

        ctx.say(format!(
            "✅ Updated subscription:\n{}",
            describe_line(&updated, today)
        ))
        .await?;
        Ok(())
    }

    /// Removes one of your subscriptions.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn subscription_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Subscription to delete"]
        #[autocomplete = "autocomplete::autocomplete_subscription_name"]
        name: String,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let slot = user_session(ctx).await?;
        let mut state = slot.lock().await;

        let Some(id) = find_by_name(&state.services, &name).map(|s| s.id.clone()) else {
            ctx.say(format!("❌ Subscription '{name}' not found.")).await?;
            return Ok(());
        };

        session::remove_service(db, &mut state, &id).await?;
        ctx.say(format!("🗑️ Deleted subscription '{name}'.")).await?;
        Ok(())
    }

    /// Lists your subscriptions, optionally filtered.
    #[poise::command(slash_command, rename = "list")]
    pub async fn subscription_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Search name or category"] search: Option<String>,
        #[description = "Only this category"]
        #[autocomplete = "autocomplete::autocomplete_category"]
        category: Option<String>,
    ) -> Result<()> {
        let today = status::today();
        let slot = user_session(ctx).await?;
        let state = slot.lock().await;

        let matches = summary::search(
            &state.services,
            search.as_deref().unwrap_or_default(),
            category.as_deref(),
        );

        if matches.is_empty() {
            ctx.say("📭 No subscriptions found. Add one with `/subscription add`.")
                .await?;
            return Ok(());
        }

        let mut description = String::new();
        for service in &matches {
            writeln!(&mut description, "{}", describe_line(service, today))?;
        }

        let list_embed = serenity::CreateEmbed::default()
            .title("📋 Your Subscriptions")
            .description(description)
            .color(0x0034_98DB)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "{} subscription{}",
                matches.len(),
                if matches.len() == 1 { "" } else { "s" }
            )));

        ctx.send(poise::CreateReply::default().embed(list_embed))
            .await?;
        Ok(())
    }

    /// Shows expiring and expired subscriptions, most urgent first.
    #[poise::command(slash_command, prefix_command)]
    pub async fn renewals(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let today = status::today();
        let slot = user_session(ctx).await?;
        let state = slot.lock().await;

        let urgent = summary::urgent(&state.services, today);
        if urgent.is_empty() {
            ctx.say("🎉 Nothing needs renewing right now.").await?;
            return Ok(());
        }

        let mut response = String::from("⏰ **Renewals needing attention**\n\n");
        for service in &urgent {
            writeln!(&mut response, "{}", describe_line(service, today))?;
            if let Some(link) = &service.renewal_link {
                writeln!(&mut response, "  ↳ <{link}>")?;
            }
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Shows status counts and the most urgent subscriptions.
    #[poise::command(slash_command, prefix_command)]
    pub async fn dashboard(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let today = status::today();
        let slot = user_session(ctx).await?;
        let state = slot.lock().await;

        let counts = summary::summarize(&state.services, today);
        let greeting = summary::display_name(state.profile.as_ref());

        let mut attention = String::new();
        for service in summary::urgent(&state.services, today).iter().take(5) {
            writeln!(&mut attention, "{}", describe_line(service, today))?;
        }
        if attention.is_empty() {
            attention.push_str("All good 🎉");
        }

        let embed = serenity::CreateEmbed::default()
            .title(format!("📊 Hi {greeting}"))
            .description(format!("As of {}", today.format(DATE_FORMAT)))
            .color(0x0034_98DB)
            .field("Total", counts.total.to_string(), true)
            .field("🟢 Active", counts.active.to_string(), true)
            .field("🟡 Expiring", counts.expiring.to_string(), true)
            .field("🔴 Expired", counts.expired.to_string(), true)
            .field("Needs attention", attention, false);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
