//! Per-user sessions: local state kept in step with the store.
//!
//! Every write follows the same pattern. Validate locally, apply the change to
//! the user's [`AppState`] through the reducer, commit to the store, and put
//! the previous state back if the store refuses.

use crate::{
    config::Defaults,
    core::{
        form::SubmitOutcome,
        optimistic::optimistic,
        profile::{self as profile_ops, ProfileUpdate},
        state::{Action, AppState, ProfilePatch},
        status,
        subscription::{self as subscription_ops, SubscriptionFields, preview_model},
    },
    entities::{profile, subscription},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, instrument};
use uuid::Uuid;

/// Prefix of placeholder ids shown while an insert is in flight.
pub const PENDING_ID_PREFIX: &str = "pending-";

/// One state slot per user, created on first use.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<Mutex<AppState>>>>,
}

impl SessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the user's slot, creating an empty one if needed.
    pub async fn slot(&self, user_id: &str) -> Arc<Mutex<AppState>> {
        if let Some(slot) = self.sessions.read().await.get(user_id) {
            return Arc::clone(slot);
        }
        let mut sessions = self.sessions.write().await;
        Arc::clone(sessions.entry(user_id.to_string()).or_default())
    }
}

/// Signs `user_id` in and loads their profile and subscriptions.
///
/// The profile is created with default preferences on first use.
#[instrument(skip(db, state, defaults))]
pub async fn open_session(
    db: &DatabaseConnection,
    state: &mut AppState,
    user_id: &str,
    defaults: &Defaults,
) -> Result<()> {
    // Load everything before touching local state so a failed load leaves it signed out.
    let profile = profile_ops::ensure_profile(db, user_id, defaults.reminder_days).await?;
    let services = subscription_ops::list_subscriptions(db, user_id).await?;
    debug!("Loaded {} subscriptions for user {}", services.len(), user_id);

    state.apply(Action::SignedIn(user_id.to_string()));
    state.apply(Action::ProfileLoaded(Some(profile)));
    state.apply(Action::ServicesLoaded(services));
    Ok(())
}

/// Submits the open form and commits the result.
///
/// # Errors
/// Validation errors leave the form open; store errors roll the list back.
pub async fn submit_form(
    db: &DatabaseConnection,
    state: &mut AppState,
    today: NaiveDate,
) -> Result<subscription::Model> {
    state.require_user()?;
    match state.form.submit(today)? {
        SubmitOutcome::Create { fields, .. } => add_service(db, state, fields, today).await,
        SubmitOutcome::Update { id, fields, .. } => {
            update_service(db, state, &id, fields, today).await
        }
    }
}

/// Adds a subscription, showing a placeholder until the store assigns its id.
#[instrument(skip(db, state, fields))]
pub async fn add_service(
    db: &DatabaseConnection,
    state: &mut AppState,
    fields: SubscriptionFields,
    today: NaiveDate,
) -> Result<subscription::Model> {
    let user_id = state.require_user()?.to_string();
    let fields = fields.normalized()?;
    let temp_id = format!("{PENDING_ID_PREFIX}{}", Uuid::new_v4());
    let placeholder = preview_model(
        temp_id.clone(),
        &user_id,
        &fields,
        status::classify(fields.expiry_date, today),
    );

    let created = optimistic(
        state,
        Action::ServiceAdded(placeholder),
        subscription_ops::create_subscription(db, &user_id, fields, today),
    )
    .await?;

    state.apply(Action::ServiceReplaced {
        temp_id,
        service: created.clone(),
    });
    Ok(created)
}

/// Updates a subscription already loaded in the session.
#[instrument(skip(db, state, fields))]
pub async fn update_service(
    db: &DatabaseConnection,
    state: &mut AppState,
    id: &str,
    fields: SubscriptionFields,
    today: NaiveDate,
) -> Result<subscription::Model> {
    let user_id = state.require_user()?.to_string();
    let fields = fields.normalized()?;
    let existing = state
        .services
        .iter()
        .find(|s| s.id == id)
        .ok_or_else(|| Error::SubscriptionNotFound { id: id.to_string() })?;

    let mut tentative = preview_model(
        id.to_string(),
        &user_id,
        &fields,
        status::classify(fields.expiry_date, today),
    );
    tentative.created_at = existing.created_at;

    let updated = optimistic(
        state,
        Action::ServiceUpdated(tentative),
        subscription_ops::update_subscription(db, &user_id, id, fields, today),
    )
    .await?;

    state.apply(Action::ServiceUpdated(updated.clone()));
    Ok(updated)
}

/// Removes a subscription from the view and the store.
#[instrument(skip(db, state))]
pub async fn remove_service(db: &DatabaseConnection, state: &mut AppState, id: &str) -> Result<()> {
    let user_id = state.require_user()?.to_string();
    optimistic(
        state,
        Action::ServiceRemoved(id.to_string()),
        subscription_ops::delete_subscription(db, &user_id, id),
    )
    .await
}

/// Saves reminder preferences.
#[instrument(skip(db, state))]
pub async fn save_settings(
    db: &DatabaseConnection,
    state: &mut AppState,
    email_notify: bool,
    reminder_days: i32,
) -> Result<profile::Model> {
    let user_id = state.require_user()?.to_string();
    profile_ops::validate_reminder_days(reminder_days)?;

    let saved = optimistic(
        state,
        Action::ProfilePatched(ProfilePatch {
            email_notify: Some(email_notify),
            reminder_days: Some(reminder_days),
            ..ProfilePatch::default()
        }),
        profile_ops::update_settings(db, &user_id, email_notify, reminder_days),
    )
    .await?;

    state.apply(Action::ProfileLoaded(Some(saved.clone())));
    Ok(saved)
}

/// Saves nickname and/or email.
#[instrument(skip(db, state))]
pub async fn save_profile(
    db: &DatabaseConnection,
    state: &mut AppState,
    update: ProfileUpdate,
) -> Result<profile::Model> {
    let user_id = state.require_user()?.to_string();
    let patch = ProfilePatch {
        nickname: update.nickname.clone().map(|n| blank_to_none(&n)),
        email: update.email.clone().map(|e| blank_to_none(&e)),
        ..ProfilePatch::default()
    };

    let saved = optimistic(
        state,
        Action::ProfilePatched(patch),
        profile_ops::update_profile(db, &user_id, update),
    )
    .await?;

    state.apply(Action::ProfileLoaded(Some(saved.clone())));
    Ok(saved)
}

/// Stores the avatar URL produced by the external blob store.
#[instrument(skip(db, state))]
pub async fn save_avatar(
    db: &DatabaseConnection,
    state: &mut AppState,
    avatar_url: Option<String>,
) -> Result<profile::Model> {
    let user_id = state.require_user()?.to_string();
    let saved = optimistic(
        state,
        Action::ProfilePatched(ProfilePatch {
            avatar_url: Some(avatar_url.as_deref().and_then(blank_to_none)),
            ..ProfilePatch::default()
        }),
        profile_ops::set_avatar_url(db, &user_id, avatar_url),
    )
    .await?;

    state.apply(Action::ProfileLoaded(Some(saved.clone())));
    Ok(saved)
}

fn blank_to_none(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
