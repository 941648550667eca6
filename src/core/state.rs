//! Per-user application state and its reducer.
//!
//! All view mutations go through [`reduce`], so a snapshot taken before an
//! action can be put back byte-for-byte if the matching remote write fails.

use crate::{
    core::form::{DraftPatch, FormState},
    entities::{profile, subscription},
    errors::{Error, Result},
};
use chrono::NaiveDate;

/// Local view of one user's data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    /// Current user, `None` when signed out
    pub user_id: Option<String>,
    /// Loaded subscriptions, newest additions first
    pub services: Vec<subscription::Model>,
    /// Loaded profile
    pub profile: Option<profile::Model>,
    /// Add/edit form
    pub form: FormState,
}

/// Partial profile change applied locally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    /// New nickname, `Some(None)` clears it
    pub nickname: Option<Option<String>>,
    /// New email, `Some(None)` clears it
    pub email: Option<Option<String>>,
    /// New avatar URL, `Some(None)` clears it
    pub avatar_url: Option<Option<String>>,
    /// Reminder opt-in
    pub email_notify: Option<bool>,
    /// Reminder lead time
    pub reminder_days: Option<i32>,
}

impl ProfilePatch {
    fn apply(self, profile: &mut profile::Model) {
        if let Some(nickname) = self.nickname {
            profile.nickname = nickname;
        }
        if let Some(email) = self.email {
            profile.email = email;
        }
        if let Some(avatar_url) = self.avatar_url {
            profile.avatar_url = avatar_url;
        }
        if let Some(email_notify) = self.email_notify {
            profile.email_notify = email_notify;
        }
        if let Some(reminder_days) = self.reminder_days {
            profile.reminder_days = reminder_days;
        }
    }
}

/// Form transitions routed through the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    /// Open a blank add form
    OpenedAdd {
        /// Default start date
        today: NaiveDate,
        /// Default currency tag
        currency: String,
    },
    /// Open the edit form for a subscription
    OpenedEdit(Box<subscription::Model>),
    /// Change some draft fields
    Edited(DraftPatch),
    /// Close without saving
    Cancelled,
}

/// Every state change the application performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// A user became current
    SignedIn(String),
    /// The current user left; all user data is dropped
    SignedOut,
    /// Replace the subscription list
    ServicesLoaded(Vec<subscription::Model>),
    /// Replace the profile
    ProfileLoaded(Option<profile::Model>),
    /// Prepend a subscription
    ServiceAdded(subscription::Model),
    /// Swap a placeholder for the stored subscription
    ServiceReplaced {
        /// Placeholder id used while the write was in flight
        temp_id: String,
        /// Stored row
        service: subscription::Model,
    },
    /// Replace the subscription with the same id
    ServiceUpdated(subscription::Model),
    /// Drop the subscription with this id
    ServiceRemoved(String),
    /// Merge a partial profile change
    ProfilePatched(ProfilePatch),
    /// Form transition
    Form(FormEvent),
}

impl AppState {
    /// State for a freshly signed-in user.
    #[must_use]
    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    /// The current user id.
    ///
    /// # Errors
    /// `Error::NotAuthenticated` when nobody is signed in.
    pub fn require_user(&self) -> Result<&str> {
        self.user_id.as_deref().ok_or(Error::NotAuthenticated)
    }

    /// Applies an action in place.
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::SignedIn(user_id) => {
                if self.user_id.as_deref() != Some(user_id.as_str()) {
                    *self = Self::signed_in(user_id);
                }
            }
            Action::SignedOut => *self = Self::default(),
            Action::ServicesLoaded(services) => self.services = services,
            Action::ProfileLoaded(profile) => self.profile = profile,
            Action::ServiceAdded(service) => self.services.insert(0, service),
            Action::ServiceReplaced { temp_id, service } => {
                if let Some(slot) = self.services.iter_mut().find(|s| s.id == temp_id) {
                    *slot = service;
                }
            }
            Action::ServiceUpdated(service) => {
                if let Some(slot) = self.services.iter_mut().find(|s| s.id == service.id) {
                    *slot = service;
                }
            }
            Action::ServiceRemoved(id) => self.services.retain(|s| s.id != id),
            Action::ProfilePatched(patch) => {
                if let Some(profile) = self.profile.as_mut() {
                    patch.apply(profile);
                }
            }
            Action::Form(event) => match event {
                FormEvent::OpenedAdd { today, currency } => self.form.open_add(today, &currency),
                FormEvent::OpenedEdit(service) => self.form.open_edit(&service),
                FormEvent::Edited(patch) => {
                    if let Some(draft) = self.form.draft_mut() {
                        patch.apply(draft);
                    }
                }
                FormEvent::Cancelled => self.form.cancel(),
            },
        }
    }
}

/// Pure reducer: returns the state after `action`.
#[must_use]
pub fn reduce(mut state: AppState, action: Action) -> AppState {
    state.apply(action);
    state
}
