//! Custom middlewares

use axum::{
	body::Body,
	extract::State,
	http::{HeaderMap, Request, Response, header},
	middleware::Next,
};

use crate::extract::Auth;
use crate::prelude::*;

/// Bearer token from the Authorization header, if any
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
	let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
	let token = value.strip_prefix("Bearer ")?.trim();
	(!token.is_empty()).then_some(token)
}

/// Insert `Auth` for a bearer token the auth collaborator accepts
///
/// An unknown or invalid token leaves the request anonymous: it is then
/// limited by address only, and endpoints requiring auth reject it themselves.
pub(crate) async fn resolve_auth(app: &App, req: &mut Request<Body>) {
	if req.extensions().get::<Auth>().is_some() {
		return;
	}
	let Some(token) = bearer_token(req.headers()) else {
		return;
	};
	match app.auth.resolve_token(token).await {
		Ok(ctx) => {
			req.extensions_mut().insert(Auth(ctx));
		}
		Err(err) => {
			debug!(error = %err, "Bearer token not accepted");
		}
	}
}

/// Resolve the caller when a bearer token is present and no outer layer did
pub async fn optional_auth(
	State(app): State<App>,
	mut req: Request<Body>,
	next: Next,
) -> Response<Body> {
	resolve_auth(&app, &mut req).await;
	next.run(req).await
}


// vim: ts=4
