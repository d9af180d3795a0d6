//! Core configuration
//!
//! One fail mode governs every store-backed decision (rate limits, bans and
//! edge throttles), so a store outage can never be allowed by one layer and
//! denied by another.

use std::str::FromStr;
use std::time::Duration;

use crate::prelude::*;

/// What to do when the counter store fails or times out
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailMode {
	/// Admit the request: counters allow, bans read as absent
	#[default]
	Open,
	/// Reject the request
	Closed,
}

impl FailMode {
	/// Outcome of an admission check whose store call failed
	pub fn allows(self) -> bool {
		matches!(self, FailMode::Open)
	}

	pub fn as_str(self) -> &'static str {
		match self {
			FailMode::Open => "open",
			FailMode::Closed => "closed",
		}
	}
}

impl FromStr for FailMode {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"open" => Ok(FailMode::Open),
			"closed" => Ok(FailMode::Closed),
			other => Err(Error::ConfigError(format!("unknown fail mode: {}", other))),
		}
	}
}

#[derive(Clone, Debug)]
pub struct CoreConfig {
	pub fail_mode: FailMode,
	/// Upper bound for a single counter store call
	pub store_timeout: Duration,
}

impl Default for CoreConfig {
	fn default() -> Self {
		Self { fail_mode: FailMode::Open, store_timeout: Duration::from_millis(200) }
	}
}


// vim: ts=4
