//! Caller identities and the store keys derived from them
//!
//! Identities are opaque: two spellings of the same address (with or without
//! a port, v4-mapped v6, ...) are different identities unless the caller
//! normalizes them first.
//!
//! Store keys join their parts with `:`. Parts are escaped with
//! [`key_part`] so an id or action containing `:` cannot reach another key.

use std::borrow::Cow;
use std::fmt;

/// Escape one component of a store key: `%` becomes `%25`, `:` becomes `%3A`
pub fn key_part(part: &str) -> Cow<'_, str> {
	if !part.contains([':', '%']) {
		return Cow::Borrowed(part);
	}
	let mut escaped = String::with_capacity(part.len() + 8);
	for c in part.chars() {
		match c {
			'%' => escaped.push_str("%25"),
			':' => escaped.push_str("%3A"),
			c => escaped.push(c),
		}
	}
	Cow::Owned(escaped)
}

/// Which caller dimension a check applies to
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Scope {
	Ip,
	User,
}

impl Scope {
	pub fn as_str(&self) -> &'static str {
		match self {
			Scope::Ip => "ip",
			Scope::User => "user",
		}
	}
}

impl fmt::Display for Scope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum Identity {
	/// Network address, as handed over by the request layer
	Ip(Box<str>),
	/// Authenticated user id
	User(Box<str>),
}

impl Identity {
	pub fn ip(ip: impl Into<Box<str>>) -> Self {
		Identity::Ip(ip.into())
	}

	pub fn user(user_id: impl Into<Box<str>>) -> Self {
		Identity::User(user_id.into())
	}

	pub fn scope(&self) -> Scope {
		match self {
			Identity::Ip(_) => Scope::Ip,
			Identity::User(_) => Scope::User,
		}
	}

	pub fn value(&self) -> &str {
		match self {
			Identity::Ip(v) | Identity::User(v) => v,
		}
	}

	/// Key of the fixed-window counter for `action`
	pub fn counter_key(&self, action: &str) -> String {
		format!("rate_limit:{}:{}:{}", self.scope(), key_part(self.value()), key_part(action))
	}

	/// Key of the ban flag for `scope`
	pub fn ban_key(&self, scope: &ActionScope) -> String {
		format!("ban:{}:{}:{}", self.scope(), key_part(self.value()), key_part(scope.as_str()))
	}
}

impl fmt::Display for Identity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.scope(), self.value())
	}
}

/// What a ban applies to: one named action or every action
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq)]
pub enum ActionScope {
	#[default]
	All,
	Action(Box<str>),
}

impl ActionScope {
	pub const ALL: &'static str = "all";

	pub fn as_str(&self) -> &str {
		match self {
			ActionScope::All => Self::ALL,
			ActionScope::Action(action) => action,
		}
	}

	pub fn is_all(&self) -> bool {
		matches!(self, ActionScope::All)
	}
}

impl From<&str> for ActionScope {
	fn from(value: &str) -> Self {
		if value == Self::ALL { ActionScope::All } else { ActionScope::Action(value.into()) }
	}
}

impl fmt::Display for ActionScope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}


// vim: ts=4
