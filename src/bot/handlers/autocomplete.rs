//! Autocomplete handlers for Discord slash command parameters.
//!
//! Suggestions come from the caller's loaded session where possible, so typing
//! a subscription name never needs an extra store round trip.

use crate::{
    bot::{BotData, user_session},
    core::summary,
    errors::Error,
};

/// Discord's limit on autocomplete suggestions.
const MAX_SUGGESTIONS: usize = 25;

const COMMON_CATEGORIES: [&str; 10] = [
    "Cloud",
    "Education",
    "Entertainment",
    "Finance",
    "Health",
    "Music",
    "News",
    "Productivity",
    "Software",
    "Other",
];

const COMMON_CURRENCIES: [&str; 8] = ["$", "€", "£", "¥", "HK$", "A$", "C$", "CHF"];

fn matching<I>(candidates: I, partial: &str) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let partial_lower = partial.to_lowercase();
    let mut matches: Vec<String> = candidates
        .into_iter()
        .filter(|candidate| candidate.to_lowercase().contains(&partial_lower))
        .collect();
    matches.sort();
    matches.dedup();
    matches.truncate(MAX_SUGGESTIONS);
    matches
}

/// Suggests the caller's own subscription names.
pub async fn autocomplete_subscription_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(slot) = user_session(ctx).await else {
        return Vec::new();
    };
    let state = slot.lock().await;
    matching(state.services.iter().map(|s| s.name.clone()), partial)
}

/// Suggests categories: the caller's own plus a few common ones.
pub async fn autocomplete_category(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let mut categories: Vec<String> = COMMON_CATEGORIES.iter().map(ToString::to_string).collect();
    if let Ok(slot) = user_session(ctx).await {
        categories.extend(summary::categories(&slot.lock().await.services));
    }
    matching(categories, partial)
}

/// Suggests common currency tags.
pub async fn autocomplete_currency(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching(COMMON_CURRENCIES.iter().map(ToString::to_string), partial)
}
