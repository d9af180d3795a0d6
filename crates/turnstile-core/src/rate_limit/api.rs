//! Admission decision types
//!
//! What the request layer hands to the core ([`RequestContext`]) and what it
//! gets back ([`Admission`]).

use std::time::Duration;

use serde::Serialize;

use crate::prelude::*;

/// Reason code attached to every admission decision
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Reason {
	Ok,
	RateLimited,
	Banned,
	Blocked,
}

impl Reason {
	pub fn as_str(&self) -> &'static str {
		match self {
			Reason::Ok => "OK",
			Reason::RateLimited => "RATE_LIMITED",
			Reason::Banned => "BANNED",
			Reason::Blocked => "BLOCKED",
		}
	}
}

/// Per-request bundle produced by the request layer
#[derive(Clone, Debug)]
pub struct RequestContext {
	pub ip: Box<str>,
	pub user: Option<Box<str>>,
	pub action: Box<str>,
}

impl RequestContext {
	pub fn new(ip: impl Into<Box<str>>, action: impl Into<Box<str>>) -> Self {
		Self { ip: ip.into(), user: None, action: action.into() }
	}

	pub fn with_user(mut self, user: impl Into<Box<str>>) -> Self {
		self.user = Some(user.into());
		self
	}

	pub fn ip_identity(&self) -> Identity {
		Identity::ip(self.ip.clone())
	}

	pub fn user_identity(&self) -> Option<Identity> {
		self.user.clone().map(Identity::User)
	}
}

/// Quota figures for one scope, used for the informational headers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Quota {
	pub limit: u32,
	pub remaining: u64,
	pub window: Duration,
}

#[derive(Clone, Debug)]
pub struct Admission {
	pub reason: Reason,
	/// Seconds the caller should wait, set on rejections
	pub retry_after: Option<u64>,
	pub ip_quota: Option<Quota>,
	pub user_quota: Option<Quota>,
}

impl Admission {
	pub fn allowed(&self) -> bool {
		self.reason == Reason::Ok
	}

	pub(crate) fn ok(ip_quota: Option<Quota>, user_quota: Option<Quota>) -> Self {
		Self { reason: Reason::Ok, retry_after: None, ip_quota, user_quota }
	}

	pub(crate) fn reject(reason: Reason, retry_after: u64) -> Self {
		Self { reason, retry_after: Some(retry_after), ip_quota: None, user_quota: None }
	}
}


// vim: ts=4
