//! Authentication collaborator
//!
//! Credential verification is not part of the admission layer. It only needs a
//! stable user id (for user-scoped limits) and the caller's roles (for the admin
//! surface), obtained from whatever issues the bearer tokens.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::prelude::*;

/// Role required by the admin console
pub const ADMIN_ROLE: &str = "admin";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthCtx {
	pub user_id: Box<str>,
	pub roles: Box<[Box<str>]>,
}

impl AuthCtx {
	pub fn new(user_id: impl Into<Box<str>>) -> Self {
		Self { user_id: user_id.into(), roles: Box::new([]) }
	}

	pub fn with_roles(mut self, roles: impl IntoIterator<Item = impl Into<Box<str>>>) -> Self {
		self.roles = roles.into_iter().map(Into::into).collect();
		self
	}

	pub fn has_role(&self, role: &str) -> bool {
		self.roles.iter().any(|r| r.as_ref() == role)
	}

	pub fn is_admin(&self) -> bool {
		self.has_role(ADMIN_ROLE)
	}
}

/// Resolves a bearer token to the authenticated caller
#[async_trait]
pub trait AuthResolver: Debug + Send + Sync {
	/// Returns [`Error::Unauthorized`] for unknown or invalid tokens
	async fn resolve_token(&self, token: &str) -> TsResult<AuthCtx>;
}


// vim: ts=4
