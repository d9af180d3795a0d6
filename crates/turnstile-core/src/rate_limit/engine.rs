//! Fixed-window rate limit engine
//!
//! A counter is created by the first increment in a window and carries that
//! window's lifetime; later increments never extend it. The call that pushes a
//! counter over its limit is still counted, so retrying a denied key keeps it
//! denied for the rest of the window.
//!
//! Burst traffic straddling a window boundary can get up to twice the limit
//! through (the end of one window plus the start of the next). This is the
//! accepted cost of keeping one integer per key.

use crate::prelude::*;
use crate::store::GuardedStore;

/// Result of one increment against a policy
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Consumption {
	/// Counter value after the increment
	pub count: u64,
	pub limit: u32,
}

impl Consumption {
	pub fn allowed(&self) -> bool {
		self.count <= u64::from(self.limit)
	}

	pub fn remaining(&self) -> u64 {
		u64::from(self.limit).saturating_sub(self.count)
	}
}

#[derive(Clone, Debug)]
pub struct RateLimitEngine {
	store: GuardedStore,
}

impl RateLimitEngine {
	pub fn new(store: GuardedStore) -> Self {
		Self { store }
	}

	/// Count one request against `policy`, surfacing store failures
	pub async fn try_check_and_consume(
		&self,
		identity: &Identity,
		action: &str,
		policy: &Policy,
	) -> TsResult<Consumption> {
		let key = identity.counter_key(action);
		let count = self.store.increment_and_get(&key, policy.window()).await?;
		Ok(Consumption { count, limit: policy.limit() })
	}

	/// Count one request against `policy`; store failures resolve to the fail mode
	pub async fn check_and_consume(&self, identity: &Identity, action: &str, policy: &Policy) -> bool {
		match self.try_check_and_consume(identity, action, policy).await {
			Ok(consumption) => consumption.allowed(),
			Err(err) => {
				let allowed = self.store.fail_mode().allows();
				warn!(identity = %identity, action, error = %err, allowed, "Rate limit check fell back to fail mode");
				allowed
			}
		}
	}

	/// Quota left in the current window, without consuming any
	pub async fn remaining(&self, identity: &Identity, action: &str, policy: &Policy) -> TsResult<u64> {
		let used = self.store.peek(&identity.counter_key(action)).await?;
		Ok(u64::from(policy.limit()).saturating_sub(used))
	}

	/// Drop the counter so the next request starts a fresh window
	pub async fn reset(&self, identity: &Identity, action: &str) -> TsResult<()> {
		self.store.clear(&identity.counter_key(action)).await?;
		info!(identity = %identity, action, "Rate limit counter reset");
		Ok(())
	}
}


// vim: ts=4
