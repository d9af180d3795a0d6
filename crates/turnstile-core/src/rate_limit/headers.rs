//! Informational rate limit headers for admitted requests

use axum::http::{HeaderMap, HeaderName, HeaderValue};

use turnstile_types::types::now_epoch_secs;

use super::api::{Admission, Quota};

pub const LIMIT_IP: HeaderName = HeaderName::from_static("x-ratelimit-limit-ip");
pub const REMAINING_IP: HeaderName = HeaderName::from_static("x-ratelimit-remaining-ip");
pub const RESET_IP: HeaderName = HeaderName::from_static("x-ratelimit-reset-ip");
pub const LIMIT_USER: HeaderName = HeaderName::from_static("x-ratelimit-limit-user");
pub const REMAINING_USER: HeaderName = HeaderName::from_static("x-ratelimit-remaining-user");
pub const RESET_USER: HeaderName = HeaderName::from_static("x-ratelimit-reset-user");

fn insert_quota(headers: &mut HeaderMap, names: [HeaderName; 3], quota: &Quota, now: i64) {
	let [limit, remaining, reset] = names;
	let window = i64::try_from(quota.window.as_secs()).unwrap_or(i64::MAX);
	headers.insert(limit, HeaderValue::from(quota.limit));
	headers.insert(remaining, HeaderValue::from(quota.remaining));
	// Absolute epoch seconds
	headers.insert(reset, HeaderValue::from(now.saturating_add(window)));
}

/// Attach the quota headers; scopes the store could not count are skipped
pub fn apply(headers: &mut HeaderMap, admission: &Admission) {
	let now = now_epoch_secs();
	if let Some(quota) = &admission.ip_quota {
		insert_quota(headers, [LIMIT_IP, REMAINING_IP, RESET_IP], quota, now);
	}
	if let Some(quota) = &admission.user_quota {
		insert_quota(headers, [LIMIT_USER, REMAINING_USER, RESET_USER], quota, now);
	}
}


// vim: ts=4
