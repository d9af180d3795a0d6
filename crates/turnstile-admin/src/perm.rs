//! Operator gate for the admin console

use axum::{extract::Request, middleware::Next, response::Response};

use turnstile_core::extract::Auth;

use crate::prelude::*;

/// Only operators holding the admin role reach the console
///
/// Anonymous callers never get here: the [`Auth`] extractor answers 401.
/// Signed-in users without the role get 403 and a warning in the log.
pub async fn require_admin(Auth(caller): Auth, req: Request, next: Next) -> Result<Response, Error> {
	if !caller.is_admin() {
		tracing::warn!(
			user = %caller.user_id,
			method = %req.method(),
			path = req.uri().path(),
			"Admin console refused a caller without the admin role"
		);
		return Err(Error::PermissionDenied);
	}

	Ok(next.run(req).await)
}

// vim: ts=4
