//! The caller as seen by admission
//!
//! The edge filter resolves the bearer token once and leaves an [`Auth`] in
//! the request extensions. Per-route admission reads it from there to charge
//! the user quota, and handlers take it as an extractor.

use axum::extract::FromRequestParts;
use axum::http::Extensions;
use axum::http::request::Parts;

use crate::prelude::*;
use turnstile_types::auth_adapter::AuthCtx;
use turnstile_types::identity::Identity;

/// Signed-in caller of the current request
pub(crate) fn caller(extensions: &Extensions) -> Option<&AuthCtx> {
	extensions.get::<Auth>().map(|Auth(ctx)| ctx)
}

// Auth //
//******//
/// Signed-in caller, anonymous requests are refused with 401
#[derive(Debug, Clone)]
pub struct Auth(pub AuthCtx);

impl Auth {
	/// Identity the user quota and user bans are keyed on
	pub fn identity(&self) -> Identity {
		Identity::user(self.0.user_id.clone())
	}
}

impl<S> FromRequestParts<S> for Auth
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		caller(&parts.extensions).cloned().map(Auth).ok_or(Error::Unauthorized)
	}
}

// OptionalAuth //
//**************//
/// Caller if signed in; anonymous requests pass with `None`
#[derive(Debug, Clone)]
pub struct OptionalAuth(pub Option<AuthCtx>);

impl<S> FromRequestParts<S> for OptionalAuth
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		Ok(OptionalAuth(caller(&parts.extensions).cloned()))
	}
}


// vim: ts=4
