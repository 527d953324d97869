//! Administrative session flag
//!
//! Operators log in from an ancillary admin page; the login sets a flag
//! and a timestamp in session storage. The flag is honored for a fixed
//! TTL from login time, after which it is inert. An expired or garbled
//! session never blocks anything; it simply fails the check.

use chrono::{DateTime, Duration, Utc};
use funnel_common::store::SessionStore;
use tracing::warn;

/// Session-storage key for the admin flag
pub const ADMIN_FLAG_KEY: &str = "funnel.admin_session";
/// Session-storage key for the admin login timestamp (RFC 3339)
pub const ADMIN_LOGIN_AT_KEY: &str = "funnel.admin_login_at";

/// Record an admin login at `at`
pub fn record_admin_login(store: &dyn SessionStore, at: DateTime<Utc>) {
    if let Err(e) = store.set(ADMIN_FLAG_KEY, "1") {
        warn!("Failed to persist admin flag: {}", e);
        return;
    }
    if let Err(e) = store.set(ADMIN_LOGIN_AT_KEY, &at.to_rfc3339()) {
        warn!("Failed to persist admin login time: {}", e);
    }
}

/// Whether an admin session is present and unexpired at `now`.
///
/// Missing flag, missing/garbled timestamp, or storage failure all count
/// as inactive.
pub fn admin_session_active(store: &dyn SessionStore, now: DateTime<Utc>, ttl: Duration) -> bool {
    match store.get(ADMIN_FLAG_KEY) {
        Ok(Some(flag)) if flag == "1" => {}
        Ok(_) => return false,
        Err(e) => {
            warn!("Session storage unavailable for admin check: {}", e);
            return false;
        }
    }

    let raw = match store.get(ADMIN_LOGIN_AT_KEY) {
        Ok(Some(raw)) => raw,
        _ => return false,
    };

    match DateTime::parse_from_rfc3339(&raw) {
        Ok(login_at) => now.signed_duration_since(login_at.with_timezone(&Utc)) <= ttl,
        Err(e) => {
            warn!("Garbled admin login timestamp '{}': {}", raw, e);
            false
        }
    }
}
