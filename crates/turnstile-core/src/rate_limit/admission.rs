//! Per-route admission: ban gate, then IP quota, then user quota

use crate::config::FailMode;
use crate::prelude::*;
use crate::store::GuardedStore;

use super::api::{Admission, Quota, Reason, RequestContext};
use super::ban::BanRegistry;
use super::engine::RateLimitEngine;
use super::policy::{PolicyTable, ResolvedPolicy};

/// Composes the engine, the ban registry and the policy table into one decision
#[derive(Clone, Debug)]
pub struct RateLimitManager {
	engine: RateLimitEngine,
	bans: BanRegistry,
	policies: PolicyTable,
	fail_mode: FailMode,
}

impl RateLimitManager {
	pub fn new(store: GuardedStore, policies: PolicyTable) -> Self {
		Self {
			engine: RateLimitEngine::new(store.clone()),
			bans: BanRegistry::new(store.clone()),
			policies,
			fail_mode: store.fail_mode(),
		}
	}

	pub fn engine(&self) -> &RateLimitEngine {
		&self.engine
	}

	pub fn bans(&self) -> &BanRegistry {
		&self.bans
	}

	pub fn policies(&self) -> &PolicyTable {
		&self.policies
	}

	/// Decide whether the request described by `ctx` may reach its handler
	///
	/// Order: IP ban, user ban, IP quota, user quota. A ban rejects before any
	/// counter is touched, and a denied IP check never consumes user quota.
	pub async fn admit(&self, ctx: &RequestContext) -> Admission {
		self.decide(ctx, true).await
	}

	/// Quota checks only, bans are not consulted
	///
	/// For the routes that lift bans: a ban covering the operator's own
	/// address must not lock them out of undoing it.
	pub async fn admit_quota(&self, ctx: &RequestContext) -> Admission {
		self.decide(ctx, false).await
	}

	async fn decide(&self, ctx: &RequestContext, ban_gate: bool) -> Admission {
		let fail_open = self.fail_mode.allows();
		let policy = self.policies.resolve(&ctx.action);
		let ip = ctx.ip_identity();
		let user = ctx.user_identity();

		if ban_gate {
			for identity in std::iter::once(&ip).chain(user.as_ref()) {
				if let Some(rejection) = self.ban_gate(identity, ctx, &policy, fail_open).await {
					return rejection;
				}
			}
		}

		let ip_quota = match self.consume(&ip, &ctx.action, &policy.ip, fail_open).await {
			Ok(quota) => quota,
			Err(rejection) => return rejection,
		};

		let user_quota = match &user {
			Some(user) => match self.consume(user, &ctx.action, &policy.user, fail_open).await {
				Ok(quota) => quota,
				Err(rejection) => return rejection,
			},
			None => None,
		};

		Admission::ok(ip_quota, user_quota)
	}

	async fn ban_gate(
		&self,
		identity: &Identity,
		ctx: &RequestContext,
		policy: &ResolvedPolicy,
		fail_open: bool,
	) -> Option<Admission> {
		match self.bans.active_ban(identity, &ctx.action).await {
			Ok(None) => None,
			Ok(Some(state)) => {
				let retry_after = state.remaining_secs().unwrap_or(policy.ip.window_secs());
				warn!(identity = %identity, action = %ctx.action, retry_after, "Rejected banned caller");
				Some(Admission::reject(Reason::Banned, retry_after))
			}
			Err(err) if fail_open => {
				debug!(identity = %identity, error = %err, "Ban gate skipped, failing open");
				None
			}
			Err(err) => {
				warn!(identity = %identity, action = %ctx.action, error = %err, "Ban gate failed closed");
				Some(Admission::reject(Reason::RateLimited, policy.ip.window_secs()))
			}
		}
	}

	/// Quota after consuming one unit, `Ok(None)` when the store failed open
	async fn consume(
		&self,
		identity: &Identity,
		action: &str,
		policy: &Policy,
		fail_open: bool,
	) -> Result<Option<Quota>, Admission> {
		match self.engine.try_check_and_consume(identity, action, policy).await {
			Ok(consumption) if consumption.allowed() => Ok(Some(Quota {
				limit: consumption.limit,
				remaining: consumption.remaining(),
				window: policy.window(),
			})),
			Ok(consumption) => {
				warn!(
					identity = %identity,
					action,
					count = consumption.count,
					limit = consumption.limit,
					"Rate limit exceeded"
				);
				Err(Admission::reject(Reason::RateLimited, policy.window_secs()))
			}
			Err(err) if fail_open => {
				debug!(identity = %identity, action, error = %err, "Rate limit skipped, failing open");
				Ok(None)
			}
			Err(err) => {
				warn!(identity = %identity, action, error = %err, "Rate limit failed closed");
				Err(Admission::reject(Reason::RateLimited, policy.window_secs()))
			}
		}
	}
}


// vim: ts=4
