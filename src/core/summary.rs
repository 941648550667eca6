//! Summaries over a user's subscription list: status counts, the urgent list,
//! search, and the greeting name.
//!
//! Everything here relabels from `expiry_date` instead of trusting the stored
//! derived columns.

use crate::{
    core::status,
    entities::{Status, profile, subscription},
};
use chrono::NaiveDate;

/// Name used when a profile has neither nickname nor email.
pub const FALLBACK_DISPLAY_NAME: &str = "there";

/// Number of subscriptions in each status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    /// All subscriptions
    pub total: usize,
    /// More than a week left
    pub active: usize,
    /// Within the expiring window
    pub expiring: usize,
    /// Past expiry
    pub expired: usize,
}

impl StatusCounts {
    /// Expiring plus expired.
    #[must_use]
    pub const fn urgent(&self) -> usize {
        self.expiring + self.expired
    }
}

/// Counts subscriptions per status as of `today`.
#[must_use]
pub fn summarize(services: &[subscription::Model], today: NaiveDate) -> StatusCounts {
    services
        .iter()
        .fold(StatusCounts::default(), |mut counts, service| {
            counts.total += 1;
            match status::classify_subscription(service, today).status {
                Status::Active => counts.active += 1,
                Status::Expiring => counts.expiring += 1,
                Status::Expired => counts.expired += 1,
            }
            counts
        })
}

/// Expiring and expired subscriptions, relabelled and ordered by days remaining.
#[must_use]
pub fn urgent(services: &[subscription::Model], today: NaiveDate) -> Vec<subscription::Model> {
    let mut urgent: Vec<_> = services
        .iter()
        .cloned()
        .map(|service| status::relabel(service, today))
        .filter(|service| service.status != Status::Active)
        .collect();
    urgent.sort_by_key(|service| service.days_remaining);
    urgent
}

/// Case-insensitive search on name or category, optionally restricted to one
/// exact category.
#[must_use]
pub fn search<'a>(
    services: &'a [subscription::Model],
    term: &str,
    category: Option<&str>,
) -> Vec<&'a subscription::Model> {
    let term = term.trim().to_lowercase();
    services
        .iter()
        .filter(|service| {
            term.is_empty()
                || service.name.to_lowercase().contains(&term)
                || service.category.to_lowercase().contains(&term)
        })
        .filter(|service| category.is_none_or(|wanted| service.category == wanted))
        .collect()
}

/// Distinct categories in use, sorted.
#[must_use]
pub fn categories(services: &[subscription::Model]) -> Vec<String> {
    let mut categories: Vec<String> = services.iter().map(|s| s.category.clone()).collect();
    categories.sort();
    categories.dedup();
    categories
}

/// Greeting name: nickname, else the local part of the email, else a neutral fallback.
#[must_use]
pub fn display_name(profile: Option<&profile::Model>) -> String {
    profile
        .and_then(|p| {
            p.nickname
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .or_else(|| {
                    p.email
                        .as_deref()
                        .and_then(|email| email.split('@').next())
                        .filter(|local| !local.is_empty())
                })
        })
        .map_or_else(|| FALLBACK_DISPLAY_NAME.to_string(), ToString::to_string)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    fn sample(today: NaiveDate) -> Vec<subscription::Model> {
        vec![
            test_model("1", "AWS Hosting", "Cloud", "2024-05-20", today),
            test_model("2", "Adobe Creative Cloud", "Software", "2024-05-23", today),
            test_model("3", "Netflix Premium", "Entertainment", "2024-06-15", today),
            test_model("4", "Spotify Duo", "Entertainment", "2024-06-20", today),
        ]
    }

    #[test]
    fn test_summarize_counts_by_recomputed_status() {
        let today = date("2024-05-21");
        let mut services = sample(today);
        // stale stored column must not be trusted
        services[3].status = Status::Expired;

        let counts = summarize(&services, today);
        assert_eq!(
            counts,
            StatusCounts {
                total: 4,
                active: 2,
                expiring: 1,
                expired: 1
            }
        );
        assert_eq!(counts.urgent(), 2);
    }

    #[test]
    fn test_urgent_ordered_by_days_remaining() {
        let today = date("2024-05-21");
        let urgent = urgent(&sample(today), today);
        let names: Vec<_> = urgent.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["AWS Hosting", "Adobe Creative Cloud"]);
        assert_eq!(urgent[0].days_remaining, -1);
    }

    #[test]
    fn test_search_by_name_category_and_filter() {
        let today = date("2024-05-21");
        let services = sample(today);

        assert_eq!(search(&services, "CLOUD", None).len(), 2);
        assert_eq!(search(&services, "entertain", None).len(), 2);
        assert_eq!(search(&services, "", Some("Entertainment")).len(), 2);
        assert_eq!(search(&services, "spotify", Some("Entertainment")).len(), 1);
        assert!(search(&services, "spotify", Some("Cloud")).is_empty());
    }

    #[test]
    fn test_categories_sorted_and_unique() {
        let today = date("2024-05-21");
        assert_eq!(
            categories(&sample(today)),
            ["Cloud", "Entertainment", "Software"]
        );
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut profile = test_profile("u1");
        assert_eq!(display_name(Some(&profile)), FALLBACK_DISPLAY_NAME);

        profile.email = Some("alex@example.com".to_string());
        assert_eq!(display_name(Some(&profile)), "alex");

        profile.nickname = Some("Lex".to_string());
        assert_eq!(display_name(Some(&profile)), "Lex");

        assert_eq!(display_name(None), FALLBACK_DISPLAY_NAME);
    }
}
