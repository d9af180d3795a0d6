//! Edge admission filter
//!
//! Screens every request before routing: named throttles first, then the
//! structural heuristics, then repeat-offender escalation. The verdict names
//! the rule that fired for the logs; the response never does.

use super::allow2ban::Allow2BanState;
use super::config::EdgeConfig;
use super::request::EdgeRequest;
use crate::prelude::*;
use crate::rate_limit::{Reason, Rejection};
use crate::store::GuardedStore;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EdgeVerdict {
	Allow,
	/// A named throttle was exceeded
	Throttled(Box<str>),
	/// A heuristic matched
	Blocked(String),
	/// Address is under a repeat-offender ban
	Banned,
	/// The store failed and the fail mode is closed
	Unavailable,
}

impl EdgeVerdict {
	pub fn allowed(&self) -> bool {
		matches!(self, EdgeVerdict::Allow)
	}
}

#[derive(Clone, Debug)]
pub struct EdgeFilter {
	store: GuardedStore,
	config: EdgeConfig,
}

impl EdgeFilter {
	pub fn new(store: GuardedStore, config: EdgeConfig) -> Self {
		Self { store, config }
	}

	pub fn config(&self) -> &EdgeConfig {
		&self.config
	}

	pub async fn evaluate(&self, req: &EdgeRequest<'_>) -> EdgeVerdict {
		let fail_open = self.store.fail_mode().allows();

		for throttle in &self.config.throttles {
			let Some(discriminator) = throttle.discriminator(req) else {
				continue;
			};
			let policy = throttle.policy();
			match self.store.increment_and_get(&throttle.counter_key(discriminator), policy.window()).await {
				Ok(count) if count > u64::from(policy.limit()) => {
					warn!(rule = throttle.name(), ip = req.ip, count, "Edge throttle exceeded");
					return EdgeVerdict::Throttled(throttle.name().into());
				}
				Ok(_) => {}
				Err(_) if fail_open => {}
				Err(_) => return EdgeVerdict::Unavailable,
			}
		}

		if let Err(err) = self.config.heuristics.check(req) {
			warn!(ip = req.ip, path = req.path, error = %err, "Edge blocklist matched");
			return EdgeVerdict::Blocked(err.to_string());
		}

		if let Some(allow2ban) = &self.config.allow2ban {
			match allow2ban.register(&self.store, req.ip, req.path).await {
				Ok(state) if state.blocks() => {
					debug!(ip = req.ip, path = req.path, "Request from banned address");
					return EdgeVerdict::Banned;
				}
				Ok(Allow2BanState::Warned(count)) => {
					debug!(ip = req.ip, count, "Offence counted");
				}
				Ok(_) => {}
				Err(_) if fail_open => {}
				Err(_) => return EdgeVerdict::Unavailable,
			}
		}

		EdgeVerdict::Allow
	}

	/// Uniform rejection for every edge verdict
	pub fn rejection(&self) -> Rejection {
		Rejection::new(Reason::Blocked, self.config.retry_after_secs())
	}

	/// Lift a repeat-offender ban on `ip`, a no-op without escalation configured
	pub async fn release(&self, ip: &str) -> TsResult<()> {
		match &self.config.allow2ban {
			Some(allow2ban) => allow2ban.release(&self.store, ip).await,
			None => Ok(()),
		}
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;
	use std::time::Duration;

	use axum::http::StatusCode;
	use store_adapter_memory::MemoryStoreAdapter;

	use super::*;
	use crate::config::{CoreConfig, FailMode};
	use crate::edge::request::testing::TestRequest;
	use crate::edge::throttle::{PathMatcher, Throttle};
	use crate::store::testing::{DownStore, StalledStore, guarded};

	fn standard() -> (EdgeFilter, GuardedStore) {
		let store = GuardedStore::new(Arc::new(MemoryStoreAdapter::new()), &CoreConfig::default());
		(EdgeFilter::new(store.clone(), EdgeConfig::standard().unwrap()), store)
	}

	#[tokio::test]
	async fn test_health_path_never_counted() {
		let (filter, store) = standard();
		let req = TestRequest::get("/api/v1/health").ip("198.51.100.7");

		for _ in 0..1000 {
			assert_eq!(filter.evaluate(&req.view()).await, EdgeVerdict::Allow);
		}
		assert_eq!(store.peek("edge:throttle:requests by ip:198.51.100.7").await.unwrap(), 0);

		// Regular traffic from the same address is still throttled
		let other = TestRequest::get("/index.html").ip("198.51.100.7");
		for _ in 0..300 {
			assert!(filter.evaluate(&other.view()).await.allowed());
		}
		assert_eq!(
			filter.evaluate(&other.view()).await,
			EdgeVerdict::Throttled("requests by ip".into())
		);
	}

	#[tokio::test]
	async fn test_overlapping_throttles() {
		let (filter, store) = standard();
		let signin = TestRequest::post("/api/v1/auth/signin").ip("203.0.113.9");

		for _ in 0..10 {
			assert!(filter.evaluate(&signin.view()).await.allowed());
		}
		assert_eq!(
			filter.evaluate(&signin.view()).await,
			EdgeVerdict::Throttled("auth requests by ip".into())
		);
		// Counted by the broad throttle as well
		assert_eq!(store.peek("edge:throttle:requests by ip:203.0.113.9").await.unwrap(), 11);
	}

	#[tokio::test]
	async fn test_user_throttle_needs_auth() {
		let store = GuardedStore::new(Arc::new(MemoryStoreAdapter::new()), &CoreConfig::default());
		let throttle = Throttle::new("by user", 2, Duration::from_secs(60), PathMatcher::Any)
			.unwrap()
			.by_user();
		let filter = EdgeFilter::new(store, EdgeConfig::empty().throttle(throttle));

		let anon = TestRequest::get("/feed");
		let alice = TestRequest::get("/feed").user("alice");
		for _ in 0..5 {
			assert!(filter.evaluate(&anon.view()).await.allowed());
		}
		assert!(filter.evaluate(&alice.view()).await.allowed());
		assert!(filter.evaluate(&alice.view()).await.allowed());
		assert!(!filter.evaluate(&alice.view()).await.allowed());
	}

	#[tokio::test]
	async fn test_heuristics_block() {
		let (filter, store) = standard();
		let req = TestRequest::get("/api/v1/posts").header("user-agent", "curl/8.5.0");
		assert!(matches!(filter.evaluate(&req.view()).await, EdgeVerdict::Blocked(_)));
		// Throttles ran first
		assert_eq!(store.peek("edge:throttle:requests by ip:192.0.2.1").await.unwrap(), 1);
	}

	#[tokio::test]
	async fn test_repeat_offender_banned() {
		let (filter, _store) = standard();
		let req = TestRequest::get("/api/v1/posts").ip("192.0.2.50");

		for _ in 0..20 {
			assert!(filter.evaluate(&req.view()).await.allowed());
		}
		assert_eq!(filter.evaluate(&req.view()).await, EdgeVerdict::Banned);
		// Banned everywhere, the health path included
		let health = TestRequest::get("/api/v1/health").ip("192.0.2.50");
		assert_eq!(filter.evaluate(&health.view()).await, EdgeVerdict::Banned);

		filter.release("192.0.2.50").await.unwrap();
		assert!(filter.evaluate(&health.view()).await.allowed());
	}

	#[tokio::test]
	async fn test_fail_open() {
		for store in [guarded(DownStore, FailMode::Open), guarded(StalledStore, FailMode::Open)] {
			let filter = EdgeFilter::new(store, EdgeConfig::standard().unwrap());
			let req = TestRequest::post("/api/v1/auth/signin");
			assert!(filter.evaluate(&req.view()).await.allowed());

			// Heuristics need no store
			let bad = TestRequest::get("/api/v1/x;y");
			assert!(matches!(filter.evaluate(&bad.view()).await, EdgeVerdict::Blocked(_)));
		}
	}

	#[tokio::test]
	async fn test_fail_closed() {
		let filter = EdgeFilter::new(guarded(DownStore, FailMode::Closed), EdgeConfig::standard().unwrap());
		let req = TestRequest::get("/index.html");
		assert_eq!(filter.evaluate(&req.view()).await, EdgeVerdict::Unavailable);
	}

	#[test]
	fn test_uniform_rejection() {
		let (filter, _store) = standard();
		let rejection = filter.rejection();
		assert_eq!(rejection.status(), StatusCode::TOO_MANY_REQUESTS);
		assert_eq!(rejection.code(), "RATE_LIMIT_EXCEEDED");
		assert_eq!(rejection.retry_after, 60);
	}
}

// vim: ts=4
