//! Reminder selection and the daily reminder batch.
//!
//! Selection is pure: given a profile, its subscriptions and a date it decides
//! what (if anything) goes into that user's digest. The batch walks every
//! opted-in profile, selects, composes and sends. One user's failure never
//! stops the others.

use crate::{
    config::ReminderSettings,
    core::{
        digest::compose_digest,
        profile as profile_ops,
        status::{self, Classification},
        subscription as subscription_ops,
    },
    entities::{Status, profile, subscription},
    errors::Result,
    mail::{Mailer, ResendMailer, resend::RESEND_API_KEY_VAR},
};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

/// Returns the fresh classification when the subscription belongs in a digest:
/// already expired, or expiring within `reminder_days`.
#[must_use]
pub fn qualifies(
    subscription: &subscription::Model,
    reminder_days: i32,
    today: NaiveDate,
) -> Option<Classification> {
    let classification = status::classify_subscription(subscription, today);
    (classification.status == Status::Expired
        || classification.days_remaining <= i64::from(reminder_days))
    .then_some(classification)
}

/// One line of a digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestItem {
    /// Subscription as stored
    pub subscription: subscription::Model,
    /// Classification as of the batch date
    pub classification: Classification,
}

/// Everything one user's reminder email is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    /// Recipient profile
    pub profile: profile::Model,
    /// Address the digest goes to
    pub recipient: String,
    /// Expired items first, then by days remaining
    pub items: Vec<DigestItem>,
}

impl Digest {
    /// Items already past expiry.
    #[must_use]
    pub fn expired_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.classification.status == Status::Expired)
            .count()
    }

    /// Items not yet expired.
    #[must_use]
    pub fn upcoming_count(&self) -> usize {
        self.items.len() - self.expired_count()
    }
}

/// Builds the digest for one user, or `None` when nothing should be sent.
///
/// Subscriptions owned by other users are ignored.
#[must_use]
pub fn select_for_user(
    profile: &profile::Model,
    subscriptions: impl IntoIterator<Item = subscription::Model>,
    today: NaiveDate,
) -> Option<Digest> {
    if !profile.email_notify {
        return None;
    }
    let recipient = profile
        .email
        .as_deref()
        .map(str::trim)
        .filter(|email| !email.is_empty())?
        .to_string();

    let mut items: Vec<DigestItem> = subscriptions
        .into_iter()
        .filter(|s| s.user_id == profile.id)
        .filter_map(|subscription| {
            qualifies(&subscription, profile.reminder_days, today).map(|classification| {
                DigestItem {
                    subscription,
                    classification,
                }
            })
        })
        .collect();

    if items.is_empty() {
        return None;
    }

    items.sort_by_key(|item| {
        (
            item.classification.status != Status::Expired,
            item.classification.days_remaining,
        )
    });

    Some(Digest {
        profile: profile.clone(),
        recipient,
        items,
    })
}

/// Result of processing one user in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSendOutcome {
    /// Profile id
    pub user_id: String,
    /// Recipient address
    pub email: String,
    /// Number of subscriptions in the digest
    pub subscription_count: usize,
    /// Whether the provider accepted the message
    pub email_sent: bool,
    /// Failure description, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of a whole batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Opted-in profiles examined
    pub processed_users: usize,
    /// One entry per user a digest was attempted for
    pub results: Vec<UserSendOutcome>,
}

impl BatchSummary {
    /// Number of digests the provider accepted.
    #[must_use]
    pub fn emails_sent(&self) -> usize {
        self.results.iter().filter(|r| r.email_sent).count()
    }
}

/// Runs the reminder batch for `today`.
///
/// # Errors
/// Only a failure to load the opted-in profiles fails the run. Per-user fetch
/// and send failures are recorded in the summary.
#[instrument(skip(db, mailer, settings))]
pub async fn run_reminder_batch(
    db: &sea_orm::DatabaseConnection,
    mailer: &dyn Mailer,
    settings: &ReminderSettings,
    today: NaiveDate,
) -> Result<BatchSummary> {
    let profiles = profile_ops::list_notifiable_profiles(db).await?;
    info!("Reminder batch for {}: {} opted-in users", today, profiles.len());

    let mut summary = BatchSummary::default();
    for profile in &profiles {
        summary.processed_users += 1;
        if let Some(outcome) = process_user(db, mailer, settings, profile, today).await {
            summary.results.push(outcome);
        }
    }

    info!(
        "Reminder batch finished: {} sent, {} attempted",
        summary.emails_sent(),
        summary.results.len()
    );
    Ok(summary)
}

/// Runs the batch with the Resend mailer configured from the environment.
///
/// # Errors
/// Returns `Error::Config` before touching any user when `RESEND_API_KEY` is unset.
pub async fn run_with_resend(
    db: &sea_orm::DatabaseConnection,
    settings: &ReminderSettings,
    today: NaiveDate,
) -> Result<BatchSummary> {
    run_with_api_key(db, std::env::var(RESEND_API_KEY_VAR).ok(), settings, today).await
}

/// Runs the batch with a Resend mailer built from `api_key`.
///
/// # Errors
/// Returns `Error::Config` before touching any user when the key is missing or blank.
pub async fn run_with_api_key(
    db: &sea_orm::DatabaseConnection,
    api_key: Option<String>,
    settings: &ReminderSettings,
    today: NaiveDate,
) -> Result<BatchSummary> {
    let mailer = ResendMailer::from_api_key(api_key, &settings.from)
        .inspect_err(|e| error!("Reminder batch aborted: {}", e))?;
    run_reminder_batch(db, &mailer, settings, today).await
}

async fn process_user(
    db: &sea_orm::DatabaseConnection,
    mailer: &dyn Mailer,
    settings: &ReminderSettings,
    profile: &profile::Model,
    today: NaiveDate,
) -> Option<UserSendOutcome> {
    let Some(email) = profile.email.clone().filter(|e| !e.trim().is_empty()) else {
        debug!("User {} has no email address, skipping", profile.id);
        return None;
    };

    let candidates = match fetch_candidates(db, profile, today).await {
        Ok(candidates) => candidates,
        Err(e) => {
            warn!("Failed to load subscriptions for user {}: {}", profile.id, e);
            return Some(UserSendOutcome {
                user_id: profile.id.clone(),
                email,
                subscription_count: 0,
                email_sent: false,
                error: Some(e.to_string()),
            });
        }
    };

    let digest = select_for_user(profile, candidates, today)?;
    let message = compose_digest(&digest, settings);
    let subscription_count = digest.items.len();

    match mailer.send(&message).await {
        Ok(()) => {
            info!(
                "Sent reminder to user {} covering {} subscriptions",
                profile.id, subscription_count
            );
            Some(UserSendOutcome {
                user_id: profile.id.clone(),
                email,
                subscription_count,
                email_sent: true,
                error: None,
            })
        }
        Err(e) => {
            error!("Failed to send reminder to user {}: {}", profile.id, e);
            Some(UserSendOutcome {
                user_id: profile.id.clone(),
                email,
                subscription_count,
                email_sent: false,
                error: Some(e.to_string()),
            })
        }
    }
}

async fn fetch_candidates(
    db: &sea_orm::DatabaseConnection,
    profile: &profile::Model,
    today: NaiveDate,
) -> Result<Vec<subscription::Model>> {
    subscription_ops::refresh_derived_fields(db, &profile.id, today).await?;
    subscription_ops::find_reminder_candidates(db, &profile.id, profile.reminder_days).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{core::profile::ProfileUpdate, errors::Error, test_utils::*};
    use sea_orm::ConnectionTrait;

    fn notifiable(id: &str, reminder_days: i32) -> profile::Model {
        let mut profile = test_profile(id);
        profile.email = Some(format!("{id}@example.com"));
        profile.reminder_days = reminder_days;
        profile
    }

    #[test]
    fn test_qualifies_boundary() {
        let today = date("2024-05-21");
        let at_limit = test_model("1", "A", "Cloud", "2024-05-31", today);
        let past_limit = test_model("2", "B", "Cloud", "2024-06-01", today);
        let expired_long_ago = test_model("3", "C", "Cloud", "2023-01-01", today);

        assert!(qualifies(&at_limit, 10, today).is_some());
        assert!(qualifies(&past_limit, 10, today).is_none());
        assert!(qualifies(&expired_long_ago, 1, today).is_some());
    }

    #[test]
    fn test_reminder_threshold_independent_of_display_threshold() {
        let today = date("2024-05-21");
        // active for display (20 days) but inside a 30-day reminder window
        let active = test_model("1", "Netflix", "Entertainment", "2024-06-10", today);
        let classification = qualifies(&active, 30, today).unwrap();
        assert_eq!(classification.status, Status::Active);

        // expiring for display (5 days) but outside a 3-day reminder window
        let expiring = test_model("2", "Adobe", "Software", "2024-05-26", today);
        assert!(qualifies(&expiring, 3, today).is_none());
    }

    #[test]
    fn test_opted_out_or_no_email_gets_nothing() {
        let today = date("2024-05-21");
        let subs = vec![test_model("1", "AWS", "Cloud", "2024-05-20", today)];

        let mut opted_out = notifiable("u1", 7);
        opted_out.email_notify = false;
        assert!(select_for_user(&opted_out, subs.clone(), today).is_none());

        let mut no_email = notifiable("u1", 7);
        no_email.email = None;
        assert!(select_for_user(&no_email, subs, today).is_none());
    }

    #[test]
    fn test_no_empty_digest() {
        let today = date("2024-05-21");
        let profile = notifiable("u1", 7);
        let subs = vec![test_model("1", "Workspace", "Software", "2024-12-31", today)];
        assert!(select_for_user(&profile, subs, today).is_none());
        assert!(select_for_user(&profile, Vec::new(), today).is_none());
    }

    #[test]
    fn test_expired_items_come_first() {
        let today = date("2024-05-21");
        let profile = notifiable("u1", 30);
        let subs = vec![
            test_model("1", "Adobe", "Software", "2024-05-23", today),
            test_model("2", "AWS", "Cloud", "2024-05-20", today),
            test_model("3", "Old", "Cloud", "2024-04-01", today),
            test_model("4", "Netflix", "Entertainment", "2024-06-15", today),
        ];

        let digest = select_for_user(&profile, subs, today).unwrap();
        let names: Vec<_> = digest
            .items
            .iter()
            .map(|i| i.subscription.name.as_str())
            .collect();
        assert_eq!(names, ["Old", "AWS", "Adobe", "Netflix"]);
        assert_eq!(digest.expired_count(), 2);
        assert_eq!(digest.upcoming_count(), 2);
        assert_eq!(digest.recipient, "u1@example.com");
    }

    async fn seed_user(
        db: &sea_orm::DatabaseConnection,
        user_id: &str,
        reminder_days: i32,
    ) -> Result<()> {
        create_test_profile(db, user_id).await?;
        profile_ops::update_profile(
            db,
            user_id,
            ProfileUpdate {
                nickname: None,
                email: Some(format!("{user_id}@example.com")),
            },
        )
        .await?;
        profile_ops::update_settings(db, user_id, true, reminder_days).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_batch_sends_one_digest_per_qualifying_user() -> Result<()> {
        let db = setup_test_db().await?;
        let written_on = date("2024-05-01");
        let today = date("2024-05-21");

        seed_user(&db, "alice", 7).await?;
        create_test_subscription(&db, "alice", "AWS", "2024-05-20", written_on).await?;
        create_test_subscription(&db, "alice", "Adobe", "2024-05-23", written_on).await?;

        seed_user(&db, "bob", 7).await?;
        create_test_subscription(&db, "bob", "Workspace", "2024-12-31", written_on).await?;

        seed_user(&db, "carol", 7).await?;
        create_test_subscription(&db, "carol", "Jira", "2024-05-22", written_on).await?;
        profile_ops::update_settings(&db, "carol", false, 7).await?;

        let mailer = RecordingMailer::default();
        let summary = run_reminder_batch(&db, &mailer, &test_reminder_settings(), today).await?;

        assert_eq!(summary.processed_users, 2);
        assert_eq!(summary.results.len(), 1);
        let outcome = &summary.results[0];
        assert_eq!(outcome.user_id, "alice");
        assert_eq!(outcome.subscription_count, 2);
        assert!(outcome.email_sent);

        let sent = mailer.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "alice@example.com");
        assert!(sent[0].subject.contains('2'));
        Ok(())
    }

    #[tokio::test]
    async fn test_send_failure_does_not_stop_batch() -> Result<()> {
        init_test_tracing();
        let db = setup_test_db().await?;
        let today = date("2024-05-21");
        for user in ["alice", "bob"] {
            seed_user(&db, user, 7).await?;
            create_test_subscription(&db, user, "AWS", "2024-05-20", today).await?;
        }

        let mailer = RecordingMailer::failing_for(["alice@example.com"]);
        let summary = run_reminder_batch(&db, &mailer, &test_reminder_settings(), today).await?;

        assert_eq!(summary.results.len(), 2);
        let alice = summary.results.iter().find(|r| r.user_id == "alice").unwrap();
        assert!(!alice.email_sent);
        assert!(alice.error.is_some());
        let bob = summary.results.iter().find(|r| r.user_id == "bob").unwrap();
        assert!(bob.email_sent);
        assert_eq!(summary.emails_sent(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_api_key_aborts_before_any_user() -> Result<()> {
        let db = setup_test_db().await?;
        let written_on = date("2024-05-01");
        let today = date("2024-05-21");
        seed_user(&db, "alice", 7).await?;
        create_test_subscription(&db, "alice", "AWS", "2024-05-20", written_on).await?;

        for key in [None, Some(String::new())] {
            let result = run_with_api_key(&db, key, &test_reminder_settings(), today).await;
            assert!(matches!(result, Err(Error::Config { .. })));
        }

        // no user was processed, so the stale derived columns were never refreshed
        let stored = subscription_ops::list_subscriptions(&db, "alice").await?;
        assert_eq!(stored[0].status, Status::Active);
        assert_eq!(stored[0].days_remaining, 19);
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_failure_does_not_stop_batch() -> Result<()> {
        init_test_tracing();
        let db = setup_test_db().await?;
        let today = date("2024-05-21");
        seed_user(&db, "alice", 7).await?;
        create_test_subscription(&db, "alice", "AWS", "2024-05-20", today).await?;

        // a row that cannot be decoded makes every subscription query for this user fail
        seed_user(&db, "broken", 7).await?;
        db.execute_unprepared(
            "INSERT INTO services (id, user_id, name, category, price, currency, billing_cycle, \
             start_date, expiry_date, status, days_remaining, icon, notes, renewal_link, \
             created_at, updated_at) VALUES ('bad-1', 'broken', 'Broken', 'Other', '1', '$', \
             'monthly', '2024-01-01', '2024-05-20', 'unknown', -1, 'box', NULL, NULL, \
             '2024-05-01 00:00:00', '2024-05-01 00:00:00')",
        )
        .await?;

        let mailer = RecordingMailer::default();
        let summary = run_reminder_batch(&db, &mailer, &test_reminder_settings(), today).await?;

        assert_eq!(summary.processed_users, 2);
        let broken = summary.results.iter().find(|r| r.user_id == "broken").unwrap();
        assert!(!broken.email_sent);
        assert_eq!(broken.subscription_count, 0);
        assert!(broken.error.is_some());
        let alice = summary.results.iter().find(|r| r.user_id == "alice").unwrap();
        assert!(alice.email_sent);

        let sent = mailer.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "alice@example.com");
        Ok(())
    }

    #[test]
    fn test_summary_serializes() {
        let summary = BatchSummary {
            processed_users: 1,
            results: vec![UserSendOutcome {
                user_id: "u1".to_string(),
                email: "u1@example.com".to_string(),
                subscription_count: 2,
                email_sent: true,
                error: None,
            }],
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["processed_users"], 1);
        assert_eq!(json["results"][0]["subscription_count"], 2);
        assert!(json["results"][0].get("error").is_none());
    }
}
