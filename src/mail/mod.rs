//! Outbound email dispatch.
//!
//! The reminder batch only needs "send this message to this address" and a
//! success/failure answer, so dispatch sits behind the [`Mailer`] trait. The
//! production implementation talks to the Resend HTTP API.

/// Resend HTTP API implementation
pub mod resend;

use crate::errors::Result;
use async_trait::async_trait;
use serde::Serialize;

pub use resend::ResendMailer;

/// A fully composed email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    /// Recipient address
    pub to: String,
    /// Subject line
    pub subject: String,
    /// HTML body
    pub html: String,
}

/// Email dispatch abstraction.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends one message, reporting provider failures as errors.
    async fn send(&self, message: &EmailMessage) -> Result<()>;
}
