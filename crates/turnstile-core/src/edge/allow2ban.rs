//! Repeat-offender escalation
//!
//! Qualifying requests from one address are counted in a `findtime` window.
//! Below `maxretry` they are let through; the request that reaches
//! `maxretry` is still let through but bans the address for `bantime`, and
//! every request from a banned address is blocked until the ban expires.
//!
//! ```text
//! clean -> warned(n < maxretry, findtime) -> banned(bantime) -> clean
//! ```

use std::time::Duration;

use turnstile_types::identity::key_part;
use turnstile_types::store_adapter::MAX_TTL;

use super::throttle::PathMatcher;
use crate::prelude::*;
use crate::store::GuardedStore;

#[derive(Clone, Debug)]
pub struct Allow2BanConfig {
	/// Requests that count as offences
	pub qualifies: Vec<PathMatcher>,
	pub maxretry: u32,
	pub findtime: Duration,
	pub bantime: Duration,
}

impl Allow2BanConfig {
	pub fn qualifies(&self, path: &str) -> bool {
		self.qualifies.iter().all(|m| m.matches(path))
	}
}

/// Outcome for one request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Allow2BanState {
	/// Not a qualifying request and not banned
	Clean,
	/// Offence counted, `n` so far in the current findtime window
	Warned(u64),
	/// This request reached maxretry and started the ban
	Tripped,
	Banned,
}

impl Allow2BanState {
	pub fn blocks(&self) -> bool {
		matches!(self, Allow2BanState::Banned)
	}
}

#[derive(Clone, Debug)]
pub struct Allow2Ban {
	config: Allow2BanConfig,
}

impl Allow2Ban {
	pub fn new(config: Allow2BanConfig) -> TsResult<Self> {
		if config.maxretry == 0 || config.findtime.is_zero() || config.bantime.is_zero() {
			return Err(Error::InvalidPolicy("allow2ban: maxretry, findtime and bantime must be positive".into()));
		}
		if config.findtime > MAX_TTL || config.bantime > MAX_TTL {
			return Err(Error::InvalidPolicy(format!(
				"allow2ban: findtime and bantime must be at most {}s",
				MAX_TTL.as_secs()
			)));
		}
		Ok(Self { config })
	}

	pub fn config(&self) -> &Allow2BanConfig {
		&self.config
	}

	fn count_key(ip: &str) -> String {
		format!("edge:allow2ban:count:{}", key_part(ip))
	}

	fn ban_key(ip: &str) -> String {
		format!("edge:allow2ban:ban:{}", key_part(ip))
	}

	/// Check the ban, then count the request if it qualifies
	pub async fn register(&self, store: &GuardedStore, ip: &str, path: &str) -> TsResult<Allow2BanState> {
		if store.exists(&Self::ban_key(ip)).await? {
			return Ok(Allow2BanState::Banned);
		}
		if !self.config.qualifies(path) {
			return Ok(Allow2BanState::Clean);
		}

		let count = store.increment_and_get(&Self::count_key(ip), self.config.findtime).await?;
		if count < u64::from(self.config.maxretry) {
			return Ok(Allow2BanState::Warned(count));
		}

		store.set_flag(&Self::ban_key(ip), self.config.bantime).await?;
		// Start counting afresh once the ban is over
		store.clear(&Self::count_key(ip)).await?;
		warn!(ip, count, bantime = ?self.config.bantime, "Repeat offender banned");
		Ok(Allow2BanState::Tripped)
	}

	/// Lift a ban early
	pub async fn release(&self, store: &GuardedStore, ip: &str) -> TsResult<()> {
		store.clear(&Self::ban_key(ip)).await?;
		store.clear(&Self::count_key(ip)).await
	}
}


// vim: ts=4
