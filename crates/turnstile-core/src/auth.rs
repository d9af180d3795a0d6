//! Static token auth resolver
//!
//! Maps fixed bearer tokens to identities. Suitable for operator tokens and
//! tests; real deployments plug their own [`AuthResolver`].

use std::collections::HashMap;

use async_trait::async_trait;

use turnstile_types::auth_adapter::{AuthCtx, AuthResolver};

use crate::prelude::*;

#[derive(Debug, Default)]
pub struct StaticTokenAuth {
	tokens: HashMap<Box<str>, AuthCtx>,
}

impl StaticTokenAuth {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_token(mut self, token: impl Into<Box<str>>, ctx: AuthCtx) -> Self {
		self.tokens.insert(token.into(), ctx);
		self
	}

	pub fn len(&self) -> usize {
		self.tokens.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tokens.is_empty()
	}
}

#[async_trait]
impl AuthResolver for StaticTokenAuth {
	async fn resolve_token(&self, token: &str) -> TsResult<AuthCtx> {
		self.tokens.get(token).cloned().ok_or(Error::Unauthorized)
	}
}


// vim: ts=4
