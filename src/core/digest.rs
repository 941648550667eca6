//! Reminder email composition.

use crate::{
    config::ReminderSettings,
    core::{
        reminder::{Digest, DigestItem},
        status::{DATE_FORMAT, describe_remaining},
        subscription::display_price,
        summary::display_name,
    },
    entities::Status,
    mail::EmailMessage,
};
use std::fmt::Write;

/// Subject line for a digest with `count` items.
#[must_use]
pub fn digest_subject(count: usize) -> String {
    format!("SubTrack: {count} subscription(s) need your attention")
}

/// Renders a digest as an HTML email.
#[must_use]
pub fn compose_digest(digest: &Digest, settings: &ReminderSettings) -> EmailMessage {
    let name = escape_html(&display_name(Some(&digest.profile)));
    let app_url = escape_html(settings.app_url.trim_end_matches('/'));

    let mut rows = String::new();
    for item in &digest.items {
        render_row(&mut rows, item);
    }

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<body style="font-family: sans-serif; color: #1f2937;">
<h2>Hi {name},</h2>
<p>{expired} expired and {upcoming} upcoming subscription(s) need your attention.</p>
<table cellpadding="8" style="border-collapse: collapse; width: 100%;">
<thead>
<tr><th align="left">Service</th><th align="left">Category</th><th align="left">Price</th><th align="left">Expiry</th><th align="left">Status</th></tr>
</thead>
<tbody>
{rows}</tbody>
</table>
<p><a href="{app_url}">Open SubTrack</a></p>
<p style="font-size: 12px; color: #6b7280;">You can change reminder preferences in <a href="{app_url}/settings">settings</a>.</p>
</body>
</html>
"#,
        expired = digest.expired_count(),
        upcoming = digest.upcoming_count(),
    );

    EmailMessage {
        to: digest.recipient.clone(),
        subject: digest_subject(digest.items.len()),
        html,
    }
}

fn render_row(out: &mut String, item: &DigestItem) {
    let subscription = &item.subscription;
    let color = match item.classification.status {
        Status::Expired => "#dc2626",
        Status::Expiring => "#d97706",
        Status::Active => "#2563eb",
    };
    // writing into a String cannot fail
    let _ = writeln!(
        out,
        r#"<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td style="color: {color};">{}</td></tr>"#,
        escape_html(&subscription.name),
        escape_html(&subscription.category),
        escape_html(&display_price(subscription)),
        subscription.expiry_date.format(DATE_FORMAT),
        describe_remaining(item.classification.days_remaining),
    );
}

/// Escapes the five HTML-significant characters.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
