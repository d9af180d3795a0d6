//! Rejection responses
//!
//! Every rejection, whichever layer produced it, renders the same JSON shape:
//! `{status: "error", message, code, retry_after}` plus a `Retry-After`
//! header. Which rule fired is only logged, never rendered.

use axum::Json;
use axum::http::StatusCode;
use axum::http::header::RETRY_AFTER;
use axum::response::{IntoResponse, Response};

use super::api::{Admission, Reason};

pub const CODE_RATE_LIMITED: &str = "RATE_LIMIT_EXCEEDED";
pub const CODE_BANNED: &str = "BANNED";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rejection {
	pub reason: Reason,
	pub retry_after: u64,
}

impl Rejection {
	pub fn new(reason: Reason, retry_after: u64) -> Self {
		Self { reason, retry_after }
	}

	pub fn status(&self) -> StatusCode {
		match self.reason {
			Reason::Banned => StatusCode::FORBIDDEN,
			Reason::Ok | Reason::RateLimited | Reason::Blocked => StatusCode::TOO_MANY_REQUESTS,
		}
	}

	pub fn code(&self) -> &'static str {
		match self.reason {
			Reason::Banned => CODE_BANNED,
			Reason::Ok | Reason::RateLimited | Reason::Blocked => CODE_RATE_LIMITED,
		}
	}

	fn message(&self) -> &'static str {
		match self.reason {
			Reason::RateLimited => "Rate limit exceeded. Please try again later.",
			Reason::Banned => "Access temporarily blocked.",
			Reason::Ok | Reason::Blocked => "Too many requests. Please try again later.",
		}
	}
}

impl std::fmt::Display for Rejection {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{} (retry after {}s)", self.reason.as_str(), self.retry_after)
	}
}

impl std::error::Error for Rejection {}

impl Admission {
	/// The rejection to render, `None` if the request was admitted
	pub fn rejection(&self) -> Option<Rejection> {
		if self.allowed() {
			None
		} else {
			Some(Rejection::new(self.reason, self.retry_after.unwrap_or_default()))
		}
	}
}

impl IntoResponse for Rejection {
	fn into_response(self) -> Response {
		let body = serde_json::json!({
			"status": "error",
			"message": self.message(),
			"code": self.code(),
			"retry_after": self.retry_after,
		});

		let mut response = (self.status(), Json(body)).into_response();
		response.headers_mut().insert(RETRY_AFTER, self.retry_after.into());
		response
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_rate_limited_response() {
		let resp = Rejection::new(Reason::RateLimited, 3600).into_response();
		assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
		assert_eq!(resp.headers().get(RETRY_AFTER).unwrap(), "3600");
	}

	#[test]
	fn test_banned_response() {
		let rejection = Rejection::new(Reason::Banned, 120);
		assert_eq!(rejection.code(), CODE_BANNED);
		assert_eq!(rejection.into_response().status(), StatusCode::FORBIDDEN);
	}

	#[test]
	fn test_blocked_looks_like_rate_limited() {
		let blocked = Rejection::new(Reason::Blocked, 60);
		assert_eq!(blocked.status(), StatusCode::TOO_MANY_REQUESTS);
		assert_eq!(blocked.code(), CODE_RATE_LIMITED);
	}
}

// vim: ts=4
