//! Property-based tests for status classification and reminder selection
//!
//! - Status is a pure function of the day difference
//! - Thresholds are monotone: later expiry never makes a status more urgent
//! - A digest never contains a subscription that does not qualify, never
//!   misses one that does, and lists expired items first

use chrono::{Duration, NaiveDate, Utc};
use proptest::prelude::*;
use subtrack::{
    core::{
        reminder::{qualifies, select_for_user},
        status::{EXPIRING_WITHIN_DAYS, classify},
    },
    entities::{BillingCycle, Status, profile, subscription},
};

// ============================================================================
// Strategies
// ============================================================================

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    // 2000-01-01 plus up to ~60 years
    (0i64..22_000).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default() + Duration::days(offset)
    })
}

fn subscription_expiring(id: usize, expiry_date: NaiveDate) -> subscription::Model {
    let now = Utc::now();
    subscription::Model {
        id: format!("s{id}"),
        user_id: "u1".to_string(),
        name: format!("Service {id}"),
        category: "Other".to_string(),
        price: "9.99".to_string(),
        currency: "$".to_string(),
        billing_cycle: BillingCycle::Monthly,
        start_date: expiry_date,
        expiry_date,
        // deliberately stale; selection must recompute
        status: Status::Active,
        days_remaining: 999,
        icon: "cloud".to_string(),
        notes: None,
        renewal_link: None,
        created_at: now,
        updated_at: now,
    }
}

fn profile_with(reminder_days: i32) -> profile::Model {
    let now = Utc::now();
    profile::Model {
        id: "u1".to_string(),
        nickname: None,
        email: Some("u1@example.com".to_string()),
        avatar_url: None,
        email_notify: true,
        reminder_days,
        created_at: now,
        updated_at: now,
    }
}

const fn urgency(status: Status) -> u8 {
    match status {
        Status::Expired => 2,
        Status::Expiring => 1,
        Status::Active => 0,
    }
}

// ============================================================================
// Classification
// ============================================================================

proptest! {
    #[test]
    fn status_matches_day_difference(today in arb_date(), offset in -400i64..400) {
        let expiry = today + Duration::days(offset);
        let result = classify(expiry, today);

        prop_assert_eq!(result.days_remaining, offset);
        let expected = if offset < 0 {
            Status::Expired
        } else if offset <= EXPIRING_WITHIN_DAYS {
            Status::Expiring
        } else {
            Status::Active
        };
        prop_assert_eq!(result.status, expected);
    }

    #[test]
    fn later_expiry_is_never_more_urgent(today in arb_date(), a in -400i64..400, b in -400i64..400) {
        let (sooner, later) = if a <= b { (a, b) } else { (b, a) };
        let sooner = classify(today + Duration::days(sooner), today);
        let later = classify(today + Duration::days(later), today);
        prop_assert!(urgency(later.status) <= urgency(sooner.status));
    }
}

// ============================================================================
// Reminder selection
// ============================================================================

proptest! {
    #[test]
    fn digest_contains_exactly_the_qualifying_items(
        today in arb_date(),
        reminder_days in 1i32..=365,
        offsets in prop::collection::vec(-60i64..400, 0..20),
    ) {
        let subscriptions: Vec<_> = offsets
            .iter()
            .enumerate()
            .map(|(i, offset)| subscription_expiring(i, today + Duration::days(*offset)))
            .collect();
        let expected: usize = subscriptions
            .iter()
            .filter(|s| qualifies(s, reminder_days, today).is_some())
            .count();

        let digest = select_for_user(&profile_with(reminder_days), subscriptions, today);

        match digest {
            None => prop_assert_eq!(expected, 0),
            Some(digest) => {
                prop_assert_eq!(digest.items.len(), expected);
                for item in &digest.items {
                    prop_assert!(
                        item.classification.status == Status::Expired
                            || item.classification.days_remaining <= i64::from(reminder_days)
                    );
                }
                let first_unexpired = digest
                    .items
                    .iter()
                    .position(|i| i.classification.status != Status::Expired)
                    .unwrap_or(digest.items.len());
                prop_assert!(digest.items[first_unexpired..]
                    .iter()
                    .all(|i| i.classification.status != Status::Expired));
            }
        }
    }

    #[test]
    fn reminder_boundary_is_inclusive(today in arb_date(), reminder_days in 1i32..=365) {
        let at = subscription_expiring(0, today + Duration::days(i64::from(reminder_days)));
        let past = subscription_expiring(1, today + Duration::days(i64::from(reminder_days) + 1));
        prop_assert!(qualifies(&at, reminder_days, today).is_some());
        prop_assert!(qualifies(&past, reminder_days, today).is_none());
    }
}
