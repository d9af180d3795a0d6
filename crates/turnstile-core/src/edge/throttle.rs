//! Named edge throttles
//!
//! A throttle selects requests by method and path, keys them by address or
//! by user, and counts them in a fixed window of its own. Throttles overlap
//! freely: a signin request is counted by the broad per-address throttle and
//! by the authentication throttle alike.

use std::time::Duration;

use axum::http::Method;
use regex::Regex;
use turnstile_types::identity::key_part;

use super::request::EdgeRequest;
use crate::prelude::*;

/// Which requests a throttle applies to, by path
#[derive(Clone, Debug)]
pub enum PathMatcher {
	Any,
	Prefix(Box<str>),
	/// Everything outside the prefix
	Outside(Box<str>),
	Pattern(Regex),
}

impl PathMatcher {
	pub fn pattern(pattern: &str) -> TsResult<Self> {
		let re = Regex::new(pattern)
			.map_err(|err| Error::ConfigError(format!("invalid path pattern {}: {}", pattern, err)))?;
		Ok(PathMatcher::Pattern(re))
	}

	pub fn matches(&self, path: &str) -> bool {
		match self {
			PathMatcher::Any => true,
			PathMatcher::Prefix(prefix) => path.starts_with(prefix.as_ref()),
			PathMatcher::Outside(prefix) => !path.starts_with(prefix.as_ref()),
			PathMatcher::Pattern(re) => re.is_match(path),
		}
	}
}

/// What a throttle counts by
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThrottleKey {
	Ip,
	/// Authenticated user, anonymous requests are not counted
	User,
}

#[derive(Clone, Debug)]
pub struct Throttle {
	name: Box<str>,
	policy: Policy,
	paths: PathMatcher,
	method: Option<Method>,
	key: ThrottleKey,
}

impl Throttle {
	pub fn new(name: impl Into<Box<str>>, limit: u32, period: Duration, paths: PathMatcher) -> TsResult<Self> {
		let name = name.into();
		let policy = Policy::new(limit, period)
			.map_err(|err| Error::InvalidPolicy(format!("throttle {}: {}", name, err)))?;
		Ok(Self { name, policy, paths, method: None, key: ThrottleKey::Ip })
	}

	/// Only count requests with this method
	pub fn method(mut self, method: Method) -> Self {
		self.method = Some(method);
		self
	}

	pub fn by_user(mut self) -> Self {
		self.key = ThrottleKey::User;
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn policy(&self) -> &Policy {
		&self.policy
	}

	/// Value the request is counted under, `None` if the throttle does not apply
	pub fn discriminator<'a>(&self, req: &EdgeRequest<'a>) -> Option<&'a str> {
		if self.method.as_ref().is_some_and(|m| m != req.method) || !self.paths.matches(req.path) {
			return None;
		}
		match self.key {
			ThrottleKey::Ip => Some(req.ip),
			ThrottleKey::User => req.user,
		}
	}

	pub fn counter_key(&self, discriminator: &str) -> String {
		format!("edge:throttle:{}:{}", key_part(&self.name), key_part(discriminator))
	}
}


// vim: ts=4
