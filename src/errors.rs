//! Unified error type for `SubTrack`.
//!
//! Validation problems are reported before any remote call is made, remote
//! failures (store, mail provider) carry the provider's message, and the
//! interactive layer turns every variant into a user-visible reply.

use thiserror::Error;

/// Every failure the application can surface.
#[derive(Debug, Error)]
pub enum Error {
    /// A required field is missing or a value could not be parsed.
    #[error("Validation error: {message}")]
    Validation {
        /// What was wrong with the input
        message: String,
    },

    /// The caller has no current user.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Missing or malformed configuration (credentials, config.toml).
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },

    /// The relational store rejected or failed a query.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A remote provider (mail API) answered with a failure.
    #[error("Remote call failed: {message}")]
    Remote {
        /// Provider message
        message: String,
    },

    /// No subscription with this id is owned by the caller.
    #[error("Subscription not found: {id}")]
    SubscriptionNotFound {
        /// Subscription id or name used for the lookup
        id: String,
    },

    /// No profile exists for this user id.
    #[error("Profile not found: {id}")]
    ProfileNotFound {
        /// User id used for the lookup
        id: String,
    },

    /// Environment variable could not be read.
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization of a report failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Formatting a reply failed.
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Discord framework failure.
    #[error("Serenity/Poise framework error: {0}")]
    #[allow(clippy::enum_variant_names)]
    FrameworkError(Box<poise::serenity_prelude::Error>),
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::FrameworkError(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
