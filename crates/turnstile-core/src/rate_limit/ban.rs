//! Ban registry
//!
//! A ban is a flag in the counter store whose lifetime is the ban duration.
//! Flag present means banned; no flag means not banned. Bans never touch the
//! rate limit counters of the same identity, and the counters never create
//! bans: the two are composed by the admission layer, not merged.

use std::time::Duration;

use turnstile_types::store_adapter::MAX_TTL;

use crate::prelude::*;
use crate::store::GuardedStore;

/// Ban state of one (identity, scope) pair
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BanState {
	Absent,
	/// Banned, lifted automatically after the contained duration
	Expiring(Duration),
	/// Banned with no expiry on the stored flag
	Permanent,
}

impl BanState {
	pub fn is_banned(&self) -> bool {
		!matches!(self, BanState::Absent)
	}

	/// Remaining ban time in whole seconds, rounded up
	pub fn remaining_secs(&self) -> Option<u64> {
		match self {
			BanState::Expiring(d) => Some(d.as_secs() + u64::from(d.subsec_nanos() > 0)),
			BanState::Absent | BanState::Permanent => None,
		}
	}
}

#[derive(Clone, Debug)]
pub struct BanRegistry {
	store: GuardedStore,
}

impl BanRegistry {
	pub fn new(store: GuardedStore) -> Self {
		Self { store }
	}

	/// Ban `identity` for `scope`; banning again refreshes the expiry
	pub async fn ban(&self, identity: &Identity, scope: &ActionScope, duration: Duration) -> TsResult<()> {
		if duration.is_zero() {
			return Err(Error::ValidationError("ban duration must be positive".into()));
		}
		if duration > MAX_TTL {
			return Err(Error::ValidationError(format!(
				"ban duration must be at most {}s",
				MAX_TTL.as_secs()
			)));
		}
		self.store.set_flag(&identity.ban_key(scope), duration).await?;
		warn!(identity = %identity, scope = %scope, duration = ?duration, "Ban issued");
		Ok(())
	}

	/// Lift a ban; lifting an absent ban succeeds
	pub async fn unban(&self, identity: &Identity, scope: &ActionScope) -> TsResult<()> {
		self.store.clear(&identity.ban_key(scope)).await?;
		info!(identity = %identity, scope = %scope, "Ban lifted");
		Ok(())
	}

	pub async fn state(&self, identity: &Identity, scope: &ActionScope) -> TsResult<BanState> {
		let ttl = self.store.ttl(&identity.ban_key(scope)).await?;
		Ok(match ttl {
			None => BanState::Absent,
			Some(Duration::MAX) => BanState::Permanent,
			Some(remaining) => BanState::Expiring(remaining),
		})
	}

	pub async fn try_is_banned(&self, identity: &Identity, scope: &ActionScope) -> TsResult<bool> {
		self.store.exists(&identity.ban_key(scope)).await
	}

	/// Ban lookup with store failures resolved to the fail mode
	pub async fn is_banned(&self, identity: &Identity, scope: &ActionScope) -> bool {
		match self.try_is_banned(identity, scope).await {
			Ok(banned) => banned,
			Err(err) => {
				let banned = !self.store.fail_mode().allows();
				warn!(identity = %identity, scope = %scope, error = %err, banned, "Ban lookup fell back to fail mode");
				banned
			}
		}
	}

	/// Ban blocking `identity` from `action`: an `all` ban first, then an action ban
	pub async fn active_ban(&self, identity: &Identity, action: &str) -> TsResult<Option<BanState>> {
		for scope in [ActionScope::All, ActionScope::from(action)] {
			let state = self.state(identity, &scope).await?;
			if state.is_banned() {
				return Ok(Some(state));
			}
		}
		Ok(None)
	}
}


// vim: ts=4
