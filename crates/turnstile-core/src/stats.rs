//! Traffic statistics collaborator
//!
//! The admin console reports aggregate counts from whatever implements
//! [`TrafficStats`]. Without a metrics backend wired in, [`NullTrafficStats`]
//! reports zeros.

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TrafficSnapshot {
	pub total_requests: u64,
	pub blocked_requests: u64,
	pub rate_limited_requests: u64,
}

pub trait TrafficStats: Debug + Send + Sync {
	fn record_request(&self);
	/// Rejected by the edge filter or a ban
	fn record_blocked(&self);
	fn record_rate_limited(&self);
	fn snapshot(&self) -> TrafficSnapshot;
}

#[derive(Debug, Default)]
pub struct NullTrafficStats;

impl TrafficStats for NullTrafficStats {
	fn record_request(&self) {}
	fn record_blocked(&self) {}
	fn record_rate_limited(&self) {}
	fn snapshot(&self) -> TrafficSnapshot {
		TrafficSnapshot::default()
	}
}

/// Per-process counters since startup
#[derive(Debug, Default)]
pub struct LocalTrafficStats {
	total: AtomicU64,
	blocked: AtomicU64,
	rate_limited: AtomicU64,
}

impl LocalTrafficStats {
	pub fn new() -> Self {
		Self::default()
	}
}

impl TrafficStats for LocalTrafficStats {
	fn record_request(&self) {
		self.total.fetch_add(1, Ordering::Relaxed);
	}

	fn record_blocked(&self) {
		self.blocked.fetch_add(1, Ordering::Relaxed);
	}

	fn record_rate_limited(&self) {
		self.rate_limited.fetch_add(1, Ordering::Relaxed);
	}

	fn snapshot(&self) -> TrafficSnapshot {
		TrafficSnapshot {
			total_requests: self.total.load(Ordering::Relaxed),
			blocked_requests: self.blocked.load(Ordering::Relaxed),
			rate_limited_requests: self.rate_limited.load(Ordering::Relaxed),
		}
	}
}


// vim: ts=4
