//! Certificate validity arithmetic.
//!
//! Expiry is never stored: it is recomputed from the artifact's creation
//! timestamp in the object store, which stays the single source of truth
//! for issuance.

use chrono::{DateTime, Months, Utc};

/// Certificates are valid for twelve months from issuance.
pub const VALIDITY_MONTHS: u32 = 12;

/// Expiry warnings are sent when the remaining validity falls inside this
/// window (inclusive, in days).
pub const WARNING_WINDOW_DAYS: core::ops::RangeInclusive<i64> = 1..=30;

/// Expiry of an artifact created at the given instant.
pub fn expiry_date(created_at: DateTime<Utc>) -> DateTime<Utc> {
    // checked_add_months only fails at the edge of representable time.
    created_at
        .checked_add_months(Months::new(VALIDITY_MONTHS))
        .unwrap_or(created_at)
}

/// Whole days remaining until `expiry`, negative once past.
pub fn days_until(expiry: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (expiry - now).num_days()
}

/// Whether a remaining-days value falls inside the warning window.
pub fn in_warning_window(days_remaining: i64) -> bool {
    WARNING_WINDOW_DAYS.contains(&days_remaining)
}

/// Human-readable date used on certificates, in notices, and in marker keys,
/// e.g. "March 4, 2026".
pub fn display_date(date: DateTime<Utc>) -> String {
    date.format("%B %-d, %Y").to_string()
}
