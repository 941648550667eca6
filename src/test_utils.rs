//! Shared test utilities for `SubTrack`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use crate::{
    config::ReminderSettings,
    core::{
        profile,
        status::{self, DATE_FORMAT},
        subscription::{self, SubscriptionFields},
    },
    entities::{self, BillingCycle},
    errors::{Error, Result},
    mail::{EmailMessage, Mailer},
};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sea_orm::DatabaseConnection;
use std::collections::HashSet;
use tokio::sync::Mutex;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// An in-memory database with no tables, so every query fails.
pub async fn setup_db_without_schema() -> Result<DatabaseConnection> {
    sea_orm::Database::connect("sqlite::memory:")
        .await
        .map_err(Into::into)
}

/// Sets up a test database with one profile already created.
pub async fn setup_with_profile(user_id: &str) -> Result<DatabaseConnection> {
    let db = setup_test_db().await?;
    create_test_profile(&db, user_id).await?;
    Ok(db)
}

/// Creates a profile with default preferences (notify on, 7 days, no email).
pub async fn create_test_profile(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<entities::profile::Model> {
    profile::ensure_profile(db, user_id, 7).await
}

/// Creates a subscription classified against `today`.
///
/// # Defaults
/// * `start_date`: 2024-01-01
/// * everything else as in [`SubscriptionFields::new`]
pub async fn create_test_subscription(
    db: &DatabaseConnection,
    user_id: &str,
    name: &str,
    expiry: &str,
    today: NaiveDate,
) -> Result<entities::subscription::Model> {
    subscription::create_subscription(db, user_id, test_fields(name, expiry), today).await
}

/// Form fields with the given name and expiry date.
pub fn test_fields(name: &str, expiry: &str) -> SubscriptionFields {
    SubscriptionFields::new(name, date(expiry), date("2024-01-01"))
}

/// Parses a `YYYY-MM-DD` literal.
pub fn date(input: &str) -> NaiveDate {
    NaiveDate::parse_from_str(input, DATE_FORMAT).unwrap()
}

/// An unsaved subscription owned by `u1`, classified against `today`.
pub fn test_model(
    id: &str,
    name: &str,
    category: &str,
    expiry: &str,
    today: NaiveDate,
) -> entities::subscription::Model {
    let now = Utc::now();
    let expiry_date = date(expiry);
    let classification = status::classify(expiry_date, today);
    entities::subscription::Model {
        id: id.to_string(),
        user_id: "u1".to_string(),
        name: name.to_string(),
        category: category.to_string(),
        price: "15.99".to_string(),
        currency: "$".to_string(),
        billing_cycle: BillingCycle::Monthly,
        start_date: date("2024-01-01"),
        expiry_date,
        status: classification.status,
        days_remaining: classification.days_remaining,
        icon: "cloud".to_string(),
        notes: None,
        renewal_link: None,
        created_at: now,
        updated_at: now,
    }
}

/// An unsaved profile with default preferences and no email.
pub fn test_profile(user_id: &str) -> entities::profile::Model {
    let now = Utc::now();
    entities::profile::Model {
        id: user_id.to_string(),
        nickname: None,
        email: None,
        avatar_url: None,
        email_notify: true,
        reminder_days: 7,
        created_at: now,
        updated_at: now,
    }
}

/// Reminder settings pointing at a test host.
pub fn test_reminder_settings() -> ReminderSettings {
    ReminderSettings {
        from: "SubTrack <noreply@subtrack.test>".to_string(),
        app_url: "https://subtrack.test/".to_string(),
    }
}

/// Mailer that records messages instead of sending them.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
    fail_for: HashSet<String>,
}

impl RecordingMailer {
    /// A mailer that rejects messages to the given addresses.
    pub fn failing_for<'a>(addresses: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            sent: Mutex::default(),
            fail_for: addresses.into_iter().map(ToString::to_string).collect(),
        }
    }

    /// Messages accepted so far.
    pub async fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        if self.fail_for.contains(&message.to) {
            return Err(Error::Remote {
                message: format!("mailbox {} unavailable", message.to),
            });
        }
        self.sent.lock().await.push(message.clone());
        Ok(())
    }
}

/// Routes `tracing` output through the test harness.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("debug")
        .try_init();
}
