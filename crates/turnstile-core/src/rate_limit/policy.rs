//! Per-action policy table
//!
//! A static map from action name to the IP and user policies that guard it.
//! Overrides may replace any subset of {IP limit, IP window, user limit, user
//! window}; whatever they leave out comes from the table defaults. Every
//! combination is validated when it is inserted, so an invalid policy fails
//! at startup and never reaches request time.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::prelude::*;

const HOUR: u64 = 3600;
const MINUTE: u64 = 60;

/// Policies that apply to one action
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedPolicy {
	pub ip: Policy,
	pub user: Policy,
}

/// Partial override for one action
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PolicyOverride {
	pub ip_limit: Option<u32>,
	pub ip_window: Option<Duration>,
	pub user_limit: Option<u32>,
	pub user_window: Option<Duration>,
}

impl PolicyOverride {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn ip_limit(mut self, limit: u32) -> Self {
		self.ip_limit = Some(limit);
		self
	}

	pub fn ip_window(mut self, window: Duration) -> Self {
		self.ip_window = Some(window);
		self
	}

	pub fn user_limit(mut self, limit: u32) -> Self {
		self.user_limit = Some(limit);
		self
	}

	pub fn user_window(mut self, window: Duration) -> Self {
		self.user_window = Some(window);
		self
	}

	/// Shorthand for an IP limit per window
	pub fn ip(limit: u32, window: Duration) -> Self {
		Self::new().ip_limit(limit).ip_window(window)
	}

	/// Shorthand for a user limit per window
	pub fn user(limit: u32, window: Duration) -> Self {
		Self::new().user_limit(limit).user_window(window)
	}

	fn apply(&self, defaults: &ResolvedPolicy) -> TsResult<ResolvedPolicy> {
		let ip = Policy::new(
			self.ip_limit.unwrap_or(defaults.ip.limit()),
			self.ip_window.unwrap_or(defaults.ip.window()),
		)?;
		let user = Policy::new(
			self.user_limit.unwrap_or(defaults.user.limit()),
			self.user_window.unwrap_or(defaults.user.window()),
		)?;
		Ok(ResolvedPolicy { ip, user })
	}
}

#[derive(Clone, Debug)]
pub struct PolicyTable {
	defaults: ResolvedPolicy,
	actions: HashMap<Box<str>, ResolvedPolicy>,
}

impl PolicyTable {
	/// Empty table with the given defaults
	pub fn new(default_ip: Policy, default_user: Policy) -> Self {
		Self { defaults: ResolvedPolicy { ip: default_ip, user: default_user }, actions: HashMap::new() }
	}

	pub fn with_override(mut self, action: &str, policy: PolicyOverride) -> TsResult<Self> {
		self.insert(action, policy)?;
		Ok(self)
	}

	pub fn insert(&mut self, action: &str, policy: PolicyOverride) -> TsResult<()> {
		let resolved = policy
			.apply(&self.defaults)
			.map_err(|err| Error::InvalidPolicy(format!("action {}: {}", action, err)))?;
		self.actions.insert(action.into(), resolved);
		Ok(())
	}

	/// Policies for `action`, the defaults if it has no override
	pub fn resolve(&self, action: &str) -> ResolvedPolicy {
		self.actions.get(action).copied().unwrap_or(self.defaults)
	}

	pub fn defaults(&self) -> ResolvedPolicy {
		self.defaults
	}

	pub fn has_override(&self, action: &str) -> bool {
		self.actions.contains_key(action)
	}

	/// Parse a table from YAML
	///
	/// ```yaml
	/// defaults:
	///   ip: { limit: 100, window_secs: 3600 }
	///   user: { limit: 1000, window_secs: 3600 }
	/// actions:
	///   users#signin: { ip_limit: 10 }
	///   auth#google_signin: { ip_limit: 5, ip_window_secs: 60 }
	/// ```
	pub fn from_yaml(yaml: &str) -> TsResult<Self> {
		let file: PolicyFile = serde_yaml::from_str(yaml)?;
		let defaults = file.defaults.unwrap_or_default();
		let builtin = Self::default().defaults;
		let ip = defaults.ip.map_or(Ok(builtin.ip), PolicySpec::into_policy)?;
		let user = defaults.user.map_or(Ok(builtin.user), PolicySpec::into_policy)?;

		let mut table = Self::new(ip, user);
		for (action, entry) in file.actions {
			table.insert(&action, entry.into())?;
		}
		info!("Loaded {} policy overrides", table.actions.len());
		Ok(table)
	}

	pub async fn from_yaml_file(path: impl AsRef<Path>) -> TsResult<Self> {
		let yaml = tokio::fs::read_to_string(path.as_ref()).await?;
		Self::from_yaml(&yaml)
	}
}

impl Default for PolicyTable {
	/// Production table
	fn default() -> Self {
		let mut table = Self::new(Policy::fixed(100, HOUR), Policy::fixed(1000, HOUR));
		let hour = Duration::from_secs(HOUR);
		let overrides = [
			("users#signin", PolicyOverride::ip(10, hour)),
			("users#signup", PolicyOverride::ip(10, hour)),
			("users#reset_password", PolicyOverride::ip(3, hour)),
			("users#me", PolicyOverride::ip(1000, hour).user_limit(1000).user_window(hour)),
			("users#signout", PolicyOverride::user(50, hour)),
			("oauth#google", PolicyOverride::ip(20, hour)),
			("oauth#google_callback", PolicyOverride::ip(50, hour)),
			("auth#google_signin", PolicyOverride::ip(5, Duration::from_secs(MINUTE))),
		];
		for (action, policy) in overrides {
			// Built-in values are all positive, apply cannot fail
			if let Ok(resolved) = policy.apply(&table.defaults) {
				table.actions.insert(action.into(), resolved);
			}
		}
		table
	}
}

// YAML file format //
//******************//
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PolicyFile {
	defaults: Option<DefaultsSpec>,
	#[serde(default)]
	actions: HashMap<String, OverrideEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DefaultsSpec {
	ip: Option<PolicySpec>,
	user: Option<PolicySpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PolicySpec {
	limit: u32,
	window_secs: u64,
}

impl PolicySpec {
	fn into_policy(self) -> TsResult<Policy> {
		Policy::new(self.limit, Duration::from_secs(self.window_secs))
	}
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct OverrideEntry {
	ip_limit: Option<u32>,
	ip_window_secs: Option<u64>,
	user_limit: Option<u32>,
	user_window_secs: Option<u64>,
}

impl From<OverrideEntry> for PolicyOverride {
	fn from(entry: OverrideEntry) -> Self {
		PolicyOverride {
			ip_limit: entry.ip_limit,
			ip_window: entry.ip_window_secs.map(Duration::from_secs),
			user_limit: entry.user_limit,
			user_window: entry.user_window_secs.map(Duration::from_secs),
		}
	}
}


// vim: ts=4
