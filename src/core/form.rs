//! Add/edit flow for a single subscription.
//!
//! The form holds raw text the user typed. Nothing is parsed until submit,
//! and a failed submit leaves the form open with the draft intact.

use crate::{
    core::{
        status::{self, Classification, DATE_FORMAT},
        subscription::{DEFAULT_CATEGORY, DEFAULT_ICON, SubscriptionFields},
    },
    entities::{BillingCycle, subscription},
    errors::{Error, Result},
};
use chrono::NaiveDate;

/// Editable text of a subscription form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionDraft {
    /// Display name
    pub name: String,
    /// Category label
    pub category: String,
    /// Price as typed, e.g. `$54.99`
    pub price: String,
    /// Currency tag
    pub currency: String,
    /// Billing cadence
    pub billing_cycle: BillingCycle,
    /// Start date as `YYYY-MM-DD`
    pub start_date: String,
    /// Expiry date as `YYYY-MM-DD`
    pub expiry_date: String,
    /// Icon tag
    pub icon: String,
    /// Free-form notes
    pub notes: String,
    /// Renewal URL
    pub renewal_link: String,
}

impl SubscriptionDraft {
    /// Empty draft for a new subscription.
    #[must_use]
    pub fn blank(today: NaiveDate, currency: &str) -> Self {
        Self {
            name: String::new(),
            category: DEFAULT_CATEGORY.to_string(),
            price: "0.00".to_string(),
            currency: currency.to_string(),
            billing_cycle: BillingCycle::Monthly,
            start_date: today.format(DATE_FORMAT).to_string(),
            expiry_date: String::new(),
            icon: DEFAULT_ICON.to_string(),
            notes: String::new(),
            renewal_link: String::new(),
        }
    }

    /// Draft pre-filled from a stored subscription.
    #[must_use]
    pub fn from_subscription(subscription: &subscription::Model) -> Self {
        Self {
            name: subscription.name.clone(),
            category: subscription.category.clone(),
            price: subscription.price.clone(),
            currency: subscription.currency.clone(),
            billing_cycle: subscription.billing_cycle,
            start_date: subscription.start_date.format(DATE_FORMAT).to_string(),
            expiry_date: subscription.expiry_date.format(DATE_FORMAT).to_string(),
            icon: subscription.icon.clone(),
            notes: subscription.notes.clone().unwrap_or_default(),
            renewal_link: subscription.renewal_link.clone().unwrap_or_default(),
        }
    }

    /// Parses the draft. A blank start date falls back to `today`.
    ///
    /// # Errors
    /// `Error::Validation` when the name is blank, the expiry date is missing,
    /// or either date does not parse.
    pub fn to_fields(&self, today: NaiveDate) -> Result<SubscriptionFields> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("Name is required"));
        }
        if self.expiry_date.trim().is_empty() {
            return Err(Error::validation("Expiry date is required"));
        }
        let expiry_date = status::parse_date(&self.expiry_date)?;
        let start_date = if self.start_date.trim().is_empty() {
            today
        } else {
            status::parse_date(&self.start_date)?
        };

        SubscriptionFields {
            name: self.name.clone(),
            category: self.category.clone(),
            price: self.price.clone(),
            currency: self.currency.clone(),
            billing_cycle: self.billing_cycle,
            start_date,
            expiry_date,
            icon: self.icon.clone(),
            notes: Some(self.notes.clone()),
            renewal_link: Some(self.renewal_link.clone()),
        }
        .normalized()
    }
}

/// Partial change to a draft; `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftPatch {
    /// New display name
    pub name: Option<String>,
    /// New category label
    pub category: Option<String>,
    /// New price text
    pub price: Option<String>,
    /// New currency tag
    pub currency: Option<String>,
    /// New billing cadence
    pub billing_cycle: Option<BillingCycle>,
    /// New start date text, `YYYY-MM-DD`
    pub start_date: Option<String>,
    /// New expiry date text, `YYYY-MM-DD`
    pub expiry_date: Option<String>,
    /// New icon tag
    pub icon: Option<String>,
    /// New notes; empty clears them on submit
    pub notes: Option<String>,
    /// New renewal URL; empty clears it on submit
    pub renewal_link: Option<String>,
}

impl DraftPatch {
    /// Writes the set fields into `draft`.
    pub fn apply(self, draft: &mut SubscriptionDraft) {
        fn set<T>(target: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *target = value;
            }
        }

        set(&mut draft.name, self.name);
        set(&mut draft.category, self.category);
        set(&mut draft.price, self.price);
        set(&mut draft.currency, self.currency);
        set(&mut draft.billing_cycle, self.billing_cycle);
        set(&mut draft.start_date, self.start_date);
        set(&mut draft.expiry_date, self.expiry_date);
        set(&mut draft.icon, self.icon);
        set(&mut draft.notes, self.notes);
        set(&mut draft.renewal_link, self.renewal_link);
    }
}

/// What a successful submit asks the store to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Insert a new subscription
    Create {
        /// Validated fields to insert
        fields: SubscriptionFields,
        /// Status as of the submit date
        classification: Classification,
    },
    /// Replace the editable fields of an existing subscription
    Update {
        /// Subscription being replaced
        id: String,
        /// Validated replacement fields
        fields: SubscriptionFields,
        /// Status as of the submit date
        classification: Classification,
    },
}

impl SubmitOutcome {
    /// The validated fields, whichever the target.
    #[must_use]
    pub const fn fields(&self) -> &SubscriptionFields {
        match self {
            Self::Create { fields, .. } | Self::Update { fields, .. } => fields,
        }
    }

    /// Classification computed at submit time.
    #[must_use]
    pub const fn classification(&self) -> Classification {
        match self {
            Self::Create { classification, .. } | Self::Update { classification, .. } => {
                *classification
            }
        }
    }
}

/// State of the subscription form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormState {
    /// No form shown
    #[default]
    Closed,
    /// Adding a new subscription
    Creating(SubscriptionDraft),
    /// Editing the subscription with this id
    Editing {
        /// Subscription being edited
        id: String,
        /// Current text
        draft: SubscriptionDraft,
    },
}

impl FormState {
    /// Opens a blank form, discarding any draft in progress.
    pub fn open_add(&mut self, today: NaiveDate, currency: &str) {
        *self = Self::Creating(SubscriptionDraft::blank(today, currency));
    }

    /// Opens the form pre-filled from `subscription`.
    pub fn open_edit(&mut self, subscription: &subscription::Model) {
        *self = Self::Editing {
            id: subscription.id.clone(),
            draft: SubscriptionDraft::from_subscription(subscription),
        };
    }

    /// Closes the form and drops the draft.
    pub fn cancel(&mut self) {
        *self = Self::Closed;
    }

    /// Whether a form is shown.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    /// The draft being edited, if a form is open.
    #[must_use]
    pub const fn draft(&self) -> Option<&SubscriptionDraft> {
        match self {
            Self::Closed => None,
            Self::Creating(draft) | Self::Editing { draft, .. } => Some(draft),
        }
    }

    /// Mutable access to the open draft.
    pub const fn draft_mut(&mut self) -> Option<&mut SubscriptionDraft> {
        match self {
            Self::Closed => None,
            Self::Creating(draft) | Self::Editing { draft, .. } => Some(draft),
        }
    }

    /// Validates the draft and closes the form.
    ///
    /// # Errors
    /// `Error::Validation` if the form is closed or the draft is invalid; the
    /// form is left unchanged in either case.
    pub fn submit(&mut self, today: NaiveDate) -> Result<SubmitOutcome> {
        let outcome = match self {
            Self::Closed => return Err(Error::validation("No form is open")),
            Self::Creating(draft) => {
                let fields = draft.to_fields(today)?;
                SubmitOutcome::Create {
                    classification: status::classify(fields.expiry_date, today),
                    fields,
                }
            }
            Self::Editing { id, draft } => {
                let fields = draft.to_fields(today)?;
                SubmitOutcome::Update {
                    id: id.clone(),
                    classification: status::classify(fields.expiry_date, today),
                    fields,
                }
            }
        };
        *self = Self::Closed;
        Ok(outcome)
    }
}
