//! Expiry status classification.
//!
//! A subscription's status is a pure function of its expiry date and the
//! current calendar date: negative days remaining is `expired`, zero through
//! [`EXPIRING_WITHIN_DAYS`] is `expiring`, anything later is `active`. The
//! threshold is fixed and independent of a user's reminder lead time.

use crate::{
    entities::{Status, subscription},
    errors::{Error, Result},
};
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::Serialize;

/// Days before expiry at which a subscription is displayed as `expiring`.
pub const EXPIRING_WITHIN_DAYS: i64 = 7;

/// Date format accepted for all date inputs.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Result of classifying an expiry date against a reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// Tri-state status
    pub status: Status,
    /// Whole calendar days until expiry, negative once expired
    pub days_remaining: i64,
}

/// Calendar days from `today` to `expiry_date`.
#[must_use]
pub fn days_remaining(expiry_date: NaiveDate, today: NaiveDate) -> i64 {
    expiry_date.signed_duration_since(today).num_days()
}

/// Classifies an expiry date relative to `today`.
#[must_use]
pub fn classify(expiry_date: NaiveDate, today: NaiveDate) -> Classification {
    let days_remaining = days_remaining(expiry_date, today);
    let status = if days_remaining < 0 {
        Status::Expired
    } else if days_remaining <= EXPIRING_WITHIN_DAYS {
        Status::Expiring
    } else {
        Status::Active
    };

    Classification {
        status,
        days_remaining,
    }
}

/// Classifies against a timestamp; the time of day is ignored.
#[must_use]
pub fn classify_at(expiry_date: NaiveDate, now: DateTime<Utc>) -> Classification {
    classify(expiry_date, now.date_naive())
}

/// Recomputes the classification of a stored subscription.
///
/// Readers must use this rather than the persisted `status`/`days_remaining`
/// columns, which are only as fresh as the last write.
#[must_use]
pub fn classify_subscription(subscription: &subscription::Model, today: NaiveDate) -> Classification {
    classify(subscription.expiry_date, today)
}

/// Returns a copy of the subscription with its derived fields recomputed.
#[must_use]
pub fn relabel(mut subscription: subscription::Model, today: NaiveDate) -> subscription::Model {
    let classification = classify(subscription.expiry_date, today);
    subscription.status = classification.status;
    subscription.days_remaining = classification.days_remaining;
    subscription
}

/// The current local calendar date.
#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parses a `YYYY-MM-DD` date, reporting a validation error otherwise.
///
/// Callers validate here before handing a date to [`classify`].
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| Error::validation(format!("'{trimmed}' is not a valid date (use YYYY-MM-DD)")))
}

/// Human-readable description of the remaining time.
#[must_use]
pub fn describe_remaining(days_remaining: i64) -> String {
    match days_remaining {
        d if d < -1 => format!("Expired {} days ago", d.abs()),
        -1 => "Expired 1 day ago".to_string(),
        0 => "Expires today".to_string(),
        1 => "Expires in 1 day".to_string(),
        d => format!("Expires in {d} days"),
    }
}
