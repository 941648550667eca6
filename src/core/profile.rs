//! Profile business logic - Identity display fields and reminder preferences.
//!
//! A profile is created the first time a user interacts with the app and is never
//! deleted. Only its owner updates it.

use crate::{
    entities::{Profile, profile},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use std::ops::RangeInclusive;
use tracing::{info, instrument};

/// Accepted values for a profile's reminder lead time.
pub const REMINDER_DAYS_RANGE: RangeInclusive<i32> = 1..=365;

/// Display fields a user may change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// New nickname; `Some("")` clears it
    pub nickname: Option<String>,
    /// New email address; `Some("")` clears it
    pub email: Option<String>,
}

/// Finds a profile by user id.
pub async fn get_profile(db: &DatabaseConnection, user_id: &str) -> Result<Option<profile::Model>> {
    Profile::find_by_id(user_id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Returns the user's profile, creating it with default preferences on first use.
#[instrument(skip(db))]
pub async fn ensure_profile(
    db: &DatabaseConnection,
    user_id: &str,
    default_reminder_days: i32,
) -> Result<profile::Model> {
    if let Some(existing) = get_profile(db, user_id).await? {
        return Ok(existing);
    }

    validate_reminder_days(default_reminder_days)?;
    let now = Utc::now();
    let model = profile::ActiveModel {
        id: Set(user_id.to_string()),
        nickname: Set(None),
        email: Set(None),
        avatar_url: Set(None),
        email_notify: Set(true),
        reminder_days: Set(default_reminder_days),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let created = model.insert(db).await?;
    info!("Created profile for user {}", user_id);
    Ok(created)
}

/// Updates nickname and/or email.
///
/// # Errors
/// Returns `Error::Validation` for an email without an `@`, and
/// `Error::ProfileNotFound` if the profile does not exist.
#[instrument(skip(db))]
pub async fn update_profile(
    db: &DatabaseConnection,
    user_id: &str,
    update: ProfileUpdate,
) -> Result<profile::Model> {
    let email = update.email.map(|e| normalize_optional(&e));
    if let Some(Some(address)) = &email {
        validate_email(address)?;
    }

    let existing = require_profile(db, user_id).await?;
    let mut active_model: profile::ActiveModel = existing.into();
    if let Some(nickname) = update.nickname {
        active_model.nickname = Set(normalize_optional(&nickname));
    }
    if let Some(email) = email {
        active_model.email = Set(email);
    }
    active_model.updated_at = Set(Utc::now());

    active_model.update(db).await.map_err(Into::into)
}

/// Updates the reminder opt-in flag and lead time.
#[instrument(skip(db))]
pub async fn update_settings(
    db: &DatabaseConnection,
    user_id: &str,
    email_notify: bool,
    reminder_days: i32,
) -> Result<profile::Model> {
    validate_reminder_days(reminder_days)?;

    let existing = require_profile(db, user_id).await?;
    let mut active_model: profile::ActiveModel = existing.into();
    active_model.email_notify = Set(email_notify);
    active_model.reminder_days = Set(reminder_days);
    active_model.updated_at = Set(Utc::now());

    let updated = active_model.update(db).await?;
    info!(
        "User {} reminder settings: notify={}, days={}",
        user_id, email_notify, reminder_days
    );
    Ok(updated)
}

/// Stores (or clears) the public URL of an avatar already uploaded to blob storage.
#[instrument(skip(db))]
pub async fn set_avatar_url(
    db: &DatabaseConnection,
    user_id: &str,
    avatar_url: Option<String>,
) -> Result<profile::Model> {
    let existing = require_profile(db, user_id).await?;
    let mut active_model: profile::ActiveModel = existing.into();
    active_model.avatar_url = Set(avatar_url.and_then(|url| normalize_optional(&url)));
    active_model.updated_at = Set(Utc::now());

    active_model.update(db).await.map_err(Into::into)
}

/// All profiles that opted in to reminder emails.
pub async fn list_notifiable_profiles(db: &DatabaseConnection) -> Result<Vec<profile::Model>> {
    Profile::find()
        .filter(profile::Column::EmailNotify.eq(true))
        .order_by_asc(profile::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

async fn require_profile(db: &DatabaseConnection, user_id: &str) -> Result<profile::Model> {
    get_profile(db, user_id)
        .await?
        .ok_or_else(|| Error::ProfileNotFound {
            id: user_id.to_string(),
        })
}

/// Checks a lead time against [`REMINDER_DAYS_RANGE`].
pub fn validate_reminder_days(reminder_days: i32) -> Result<()> {
    if REMINDER_DAYS_RANGE.contains(&reminder_days) {
        Ok(())
    } else {
        Err(Error::validation(format!(
            "Reminder days must be between {} and {}, got {reminder_days}",
            REMINDER_DAYS_RANGE.start(),
            REMINDER_DAYS_RANGE.end()
        )))
    }
}

fn validate_email(address: &str) -> Result<()> {
    match address.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(Error::validation(format!("'{address}' is not a valid email address"))),
    }
}

fn normalize_optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
