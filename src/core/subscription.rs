//! Subscription business logic - Create, read, update and delete a user's subscriptions.
//!
//! Every write runs the status classifier on `expiry_date` and stores the result in the
//! `status`/`days_remaining` columns. Those columns exist only so the store can filter and
//! sort on them; they are never treated as a second source of truth.
//! All queries are scoped to the owning user.

use crate::{
    core::status::{self, Classification},
    entities::{BillingCycle, Status, Subscription, subscription},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{Condition, QueryOrder, Set, prelude::*};
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Default category for new subscriptions.
pub const DEFAULT_CATEGORY: &str = "Other";
/// Default icon tag for new subscriptions.
pub const DEFAULT_ICON: &str = "cloud";
/// Default currency tag when none is given.
pub const DEFAULT_CURRENCY: &str = "$";

/// User-editable fields of a subscription, already parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionFields {
    /// Display name, required
    pub name: String,
    /// Category label
    pub category: String,
    /// Price text; normalised to its numeric characters on write
    pub price: String,
    /// Currency tag
    pub currency: String,
    /// Billing cadence
    pub billing_cycle: BillingCycle,
    /// Start date
    pub start_date: NaiveDate,
    /// Expiry date, required
    pub expiry_date: NaiveDate,
    /// Icon tag
    pub icon: String,
    /// Optional notes
    pub notes: Option<String>,
    /// Optional renewal URL
    pub renewal_link: Option<String>,
}

impl SubscriptionFields {
    /// Fields with the given name and expiry date and defaults elsewhere.
    #[must_use]
    pub fn new(name: impl Into<String>, expiry_date: NaiveDate, start_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            category: DEFAULT_CATEGORY.to_string(),
            price: "0.00".to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
            billing_cycle: BillingCycle::Monthly,
            start_date,
            expiry_date,
            icon: DEFAULT_ICON.to_string(),
            notes: None,
            renewal_link: None,
        }
    }

    /// Trims and normalises the fields, rejecting a blank name.
    pub fn normalized(self) -> Result<Self> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(Error::validation("Subscription name cannot be empty"));
        }

        Ok(Self {
            name,
            category: non_blank(self.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            price: normalize_price(&self.price),
            currency: non_blank(self.currency).unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            icon: non_blank(self.icon).unwrap_or_else(|| DEFAULT_ICON.to_string()),
            notes: self.notes.and_then(non_blank),
            renewal_link: self.renewal_link.and_then(non_blank),
            ..self
        })
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Keeps only the digits and decimal point of a price (`"$54.99"` becomes `"54.99"`).
/// An input without any digits becomes `"0"`.
#[must_use]
pub fn normalize_price(input: &str) -> String {
    let numeric: String = input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if numeric.chars().any(|c| c.is_ascii_digit()) {
        numeric
    } else {
        "0".to_string()
    }
}

/// Price as shown to the user: currency tag followed by the amount.
#[must_use]
pub fn display_price(subscription: &subscription::Model) -> String {
    format!("{}{}", subscription.currency, subscription.price)
}

/// Builds an unsaved model from fields, as shown while a write is in flight.
#[must_use]
pub fn preview_model(
    id: String,
    user_id: &str,
    fields: &SubscriptionFields,
    classification: Classification,
) -> subscription::Model {
    let now = Utc::now();
    subscription::Model {
        id,
        user_id: user_id.to_string(),
        name: fields.name.clone(),
        category: fields.category.clone(),
        price: normalize_price(&fields.price),
        currency: fields.currency.clone(),
        billing_cycle: fields.billing_cycle,
        start_date: fields.start_date,
        expiry_date: fields.expiry_date,
        status: classification.status,
        days_remaining: classification.days_remaining,
        icon: fields.icon.clone(),
        notes: fields.notes.clone(),
        renewal_link: fields.renewal_link.clone(),
        created_at: now,
        updated_at: now,
    }
}

/// Lists all of a user's subscriptions, soonest expiry first.
#[instrument(skip(db))]
pub async fn list_subscriptions(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Vec<subscription::Model>> {
    Subscription::find()
        .filter(subscription::Column::UserId.eq(user_id))
        .order_by_asc(subscription::Column::ExpiryDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a subscription by id, scoped to its owner.
pub async fn get_subscription(
    db: &DatabaseConnection,
    user_id: &str,
    id: &str,
) -> Result<Option<subscription::Model>> {
    Subscription::find_by_id(id.to_string())
        .filter(subscription::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Stored subscriptions whose status is `expired` or whose `days_remaining`
/// is within `reminder_days`, most urgent first.
#[instrument(skip(db))]
pub async fn find_reminder_candidates(
    db: &DatabaseConnection,
    user_id: &str,
    reminder_days: i32,
) -> Result<Vec<subscription::Model>> {
    Subscription::find()
        .filter(subscription::Column::UserId.eq(user_id))
        .filter(
            Condition::any()
                .add(subscription::Column::Status.eq(Status::Expired))
                .add(subscription::Column::DaysRemaining.lte(i64::from(reminder_days))),
        )
        .order_by_asc(subscription::Column::DaysRemaining)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates a subscription for `user_id`, classifying it against `today`.
///
/// # Errors
/// Returns `Error::Validation` for a blank name before touching the store.
#[instrument(skip(db, fields))]
pub async fn create_subscription(
    db: &DatabaseConnection,
    user_id: &str,
    fields: SubscriptionFields,
    today: NaiveDate,
) -> Result<subscription::Model> {
    let fields = fields.normalized()?;
    let classification = status::classify(fields.expiry_date, today);
    let now = Utc::now();

    let model = subscription::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        user_id: Set(user_id.to_string()),
        name: Set(fields.name),
        category: Set(fields.category),
        price: Set(fields.price),
        currency: Set(fields.currency),
        billing_cycle: Set(fields.billing_cycle),
        start_date: Set(fields.start_date),
        expiry_date: Set(fields.expiry_date),
        status: Set(classification.status),
        days_remaining: Set(classification.days_remaining),
        icon: Set(fields.icon),
        notes: Set(fields.notes),
        renewal_link: Set(fields.renewal_link),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let created = model.insert(db).await?;
    info!(
        "Created subscription '{}' ({}) for user {}",
        created.name, created.id, user_id
    );
    Ok(created)
}

/// Replaces the editable fields of an owned subscription and recomputes its
/// derived columns.
#[instrument(skip(db, fields))]
pub async fn update_subscription(
    db: &DatabaseConnection,
    user_id: &str,
    id: &str,
    fields: SubscriptionFields,
    today: NaiveDate,
) -> Result<subscription::Model> {
    let fields = fields.normalized()?;
    let existing = get_subscription(db, user_id, id)
        .await?
        .ok_or_else(|| Error::SubscriptionNotFound { id: id.to_string() })?;

    let classification = status::classify(fields.expiry_date, today);
    let mut active_model: subscription::ActiveModel = existing.into();
    active_model.name = Set(fields.name);
    active_model.category = Set(fields.category);
    active_model.price = Set(fields.price);
    active_model.currency = Set(fields.currency);
    active_model.billing_cycle = Set(fields.billing_cycle);
    active_model.start_date = Set(fields.start_date);
    active_model.expiry_date = Set(fields.expiry_date);
    active_model.status = Set(classification.status);
    active_model.days_remaining = Set(classification.days_remaining);
    active_model.icon = Set(fields.icon);
    active_model.notes = Set(fields.notes);
    active_model.renewal_link = Set(fields.renewal_link);
    active_model.updated_at = Set(Utc::now());

    let updated = active_model.update(db).await?;
    debug!("Updated subscription {}", updated.id);
    Ok(updated)
}

/// Deletes an owned subscription.
///
/// # Errors
/// Returns `Error::SubscriptionNotFound` when no row owned by `user_id` matched.
#[instrument(skip(db))]
pub async fn delete_subscription(db: &DatabaseConnection, user_id: &str, id: &str) -> Result<()> {
    let result = Subscription::delete_many()
        .filter(subscription::Column::Id.eq(id))
        .filter(subscription::Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::SubscriptionNotFound { id: id.to_string() });
    }
    info!("Deleted subscription {} for user {}", id, user_id);
    Ok(())
}

/// Rewrites the stored `status`/`days_remaining` of every subscription of a user
/// whose columns no longer match `today`. Returns how many rows changed.
#[instrument(skip(db))]
pub async fn refresh_derived_fields(
    db: &DatabaseConnection,
    user_id: &str,
    today: NaiveDate,
) -> Result<usize> {
    let mut refreshed = 0;
    for existing in list_subscriptions(db, user_id).await? {
        let classification = status::classify(existing.expiry_date, today);
        if existing.status == classification.status
            && existing.days_remaining == classification.days_remaining
        {
            continue;
        }

        let mut active_model: subscription::ActiveModel = existing.into();
        active_model.status = Set(classification.status);
        active_model.days_remaining = Set(classification.days_remaining);
        active_model.update(db).await?;
        refreshed += 1;
    }

    debug!("Refreshed derived fields on {} subscriptions", refreshed);
    Ok(refreshed)
}
