//! Application settings loaded from `config.toml`.
//!
//! Only non-secret values live here. Credentials (`DISCORD_BOT_TOKEN`,
//! `RESEND_API_KEY`) are read from the environment right before use. Every
//! field has a default so the application also runs without a config file.

use crate::{
    core::profile::REMINDER_DAYS_RANGE,
    errors::{Error, Result},
};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Reminder email settings
    #[serde(default)]
    pub reminder: ReminderSettings,
    /// Defaults applied to new profiles and subscription forms
    #[serde(default)]
    pub defaults: Defaults,
}

/// Settings for the reminder digest emails.
#[derive(Debug, Clone, Deserialize)]
pub struct ReminderSettings {
    /// Sender shown on digest emails
    #[serde(default = "default_from")]
    pub from: String,
    /// Base URL of the app, linked from the digest
    #[serde(default = "default_app_url")]
    pub app_url: String,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            from: default_from(),
            app_url: default_app_url(),
        }
    }
}

/// Defaults for newly created records.
#[derive(Debug, Clone, Deserialize)]
pub struct Defaults {
    /// Lead time given to new profiles
    #[serde(default = "default_reminder_days")]
    pub reminder_days: i32,
    /// Currency tag pre-filled in the subscription form
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            reminder_days: default_reminder_days(),
            currency: default_currency(),
        }
    }
}

fn default_from() -> String {
    "SubTrack <noreply@example.com>".to_string()
}

fn default_app_url() -> String {
    "https://example.com".to_string()
}

const fn default_reminder_days() -> i32 {
    7
}

fn default_currency() -> String {
    "$".to_string()
}

/// Loads settings from a TOML file.
///
/// # Errors
/// Returns `Error::Config` if the file cannot be read or the TOML is invalid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    parse_config(&contents)
}

/// Parses settings from TOML text.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &AppConfig) -> Result<()> {
    if !REMINDER_DAYS_RANGE.contains(&config.defaults.reminder_days) {
        return Err(Error::Config {
            message: format!(
                "defaults.reminder_days must be between {} and {}, got {}",
                REMINDER_DAYS_RANGE.start(),
                REMINDER_DAYS_RANGE.end(),
                config.defaults.reminder_days
            ),
        });
    }
    if config.reminder.from.trim().is_empty() {
        return Err(Error::Config {
            message: "reminder.from cannot be empty".to_string(),
        });
    }
    Ok(())
}

/// Loads settings from `SUBTRACK_CONFIG` or `./config.toml`, falling back to
/// built-in defaults when the file does not exist.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = std::env::var("SUBTRACK_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    if Path::new(&path).exists() {
        let config = load_config(&path)?;
        info!("Loaded configuration from {}", path);
        Ok(config)
    } else {
        info!("No configuration file at {}, using defaults.", path);
        Ok(AppConfig::default())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            [reminder]
            from = "Reminders <bot@subtrack.test>"
            app_url = "https://subtrack.test"

            [defaults]
            reminder_days = 14
            currency = "HK$"
        "#;

        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.reminder.from, "Reminders <bot@subtrack.test>");
        assert_eq!(config.reminder.app_url, "https://subtrack.test");
        assert_eq!(config.defaults.reminder_days, 14);
        assert_eq!(config.defaults.currency, "HK$");
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.defaults.reminder_days, 7);
        assert_eq!(config.defaults.currency, "$");
        assert_eq!(config.reminder.app_url, "https://example.com");
    }

    #[test]
    fn test_out_of_range_reminder_days_rejected() {
        let result = parse_config("[defaults]\nreminder_days = 0\n");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_reminder_days_bounds_match_profile_range() {
        let upper = *REMINDER_DAYS_RANGE.end();
        let at_limit = parse_config(&format!("[defaults]\nreminder_days = {upper}\n")).unwrap();
        assert_eq!(at_limit.defaults.reminder_days, upper);

        let result = parse_config(&format!("[defaults]\nreminder_days = {}\n", upper + 1));
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let result = parse_config("[reminder\nfrom = ");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
