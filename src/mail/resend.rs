//! Resend email provider implementation

use crate::{
    errors::{Error, Result},
    mail::{EmailMessage, Mailer},
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error, instrument};

const RESEND_API_URL: &str = "https://api.resend.com/emails";

/// Environment variable holding the Resend API key.
pub const RESEND_API_KEY_VAR: &str = "RESEND_API_KEY";

/// Sends email through the Resend HTTP API.
#[derive(Clone)]
pub struct ResendMailer {
    client: Client,
    api_key: String,
    from: String,
    endpoint: String,
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

impl ResendMailer {
    /// Creates a mailer with an explicit API key and sender.
    #[must_use]
    pub fn new(api_key: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            from: from.into(),
            endpoint: RESEND_API_URL.to_string(),
        }
    }

    /// Creates a mailer from `RESEND_API_KEY`.
    ///
    /// # Errors
    /// A missing or empty key is a configuration failure, which aborts a batch run.
    pub fn from_env(from: &str) -> Result<Self> {
        Self::from_api_key(std::env::var(RESEND_API_KEY_VAR).ok(), from)
    }

    /// Creates a mailer from an API key that may not be configured.
    ///
    /// # Errors
    /// Returns `Error::Config` when the key is missing or blank.
    pub fn from_api_key(api_key: Option<String>, from: &str) -> Result<Self> {
        match api_key.filter(|key| !key.trim().is_empty()) {
            Some(api_key) => Ok(Self::new(api_key, from)),
            None => Err(Error::Config {
                message: format!("{RESEND_API_KEY_VAR} is not configured"),
            }),
        }
    }

    /// Points the mailer at a different API endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    #[instrument(skip(self, message), fields(to = %message.to))]
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        let body = SendEmailRequest {
            from: &self.from,
            to: [&message.to],
            subject: &message.subject,
            html: &message.html,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Resend API request failed");
                Error::Remote {
                    message: e.to_string(),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Resend API error");
            return Err(Error::Remote {
                message: format!("Resend API error {status}: {error_body}"),
            });
        }

        debug!("Reminder email accepted by Resend");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = SendEmailRequest {
            from: "SubTrack <noreply@example.com>",
            to: ["alex@example.com"],
            subject: "hello",
            html: "<p>hi</p>",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["to"][0], "alex@example.com");
        assert_eq!(json["from"], "SubTrack <noreply@example.com>");
        assert_eq!(json["html"], "<p>hi</p>");
    }

    #[test]
    fn test_missing_or_blank_key_is_config_error() {
        let from = "SubTrack <noreply@example.com>";
        assert!(matches!(
            ResendMailer::from_api_key(None, from),
            Err(Error::Config { .. })
        ));
        assert!(matches!(
            ResendMailer::from_api_key(Some("   ".to_string()), from),
            Err(Error::Config { .. })
        ));
        assert!(ResendMailer::from_api_key(Some("re_123".to_string()), from).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_remote_error() {
        let mailer = ResendMailer::new("key", "SubTrack <noreply@example.com>")
            .with_endpoint("http://127.0.0.1:9/emails");
        let message = EmailMessage {
            to: "alex@example.com".to_string(),
            subject: "s".to_string(),
            html: "h".to_string(),
        };
        let result = mailer.send(&message).await;
        assert!(matches!(result, Err(Error::Remote { .. })));
    }
}
