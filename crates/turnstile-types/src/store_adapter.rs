//! Counter store adapter trait
//!
//! All shared admission state (fixed-window counters, ban flags, edge throttle
//! counters) lives behind this trait. Implementations must make every call
//! atomic for all callers sharing the backend, across processes when the
//! backend is networked: the engine never combines two calls into a
//! read-modify-write.

use async_trait::async_trait;
use std::fmt::Debug;
use std::time::Duration;

use crate::prelude::*;

/// Longest lifetime a caller may give a key
///
/// Ten years, well inside the millisecond expiry range of every backend, so a
/// value accepted by one store is accepted by all of them.
pub const MAX_TTL: Duration = Duration::from_secs(10 * 365 * 24 * 3600);

/// A `Turnstile` counter store adapter
///
/// Keys are plain strings built by the callers (see [`crate::identity::Identity`]).
/// Any backend error must be reported as [`Error::StoreUnavailable`] so the
/// configured fail mode can be applied uniformly.
#[async_trait]
pub trait StoreAdapter: Debug + Send + Sync {
	/// Atomically increments the counter at `key` and returns the new value.
	///
	/// The time-to-live is set to `window` only when this call created the key;
	/// later increments leave the remaining lifetime untouched (fixed window).
	/// Callers keep `window` within [`MAX_TTL`].
	async fn increment_and_get(&self, key: &str, window: Duration) -> TsResult<u64>;

	/// Current counter value, 0 if absent. Never mutates.
	async fn peek(&self, key: &str) -> TsResult<u64>;

	/// Whether `key` is present and not expired
	async fn exists(&self, key: &str) -> TsResult<bool>;

	/// Remaining lifetime of `key`, `None` if absent.
	///
	/// Keys without expiry report `Duration::MAX`.
	async fn ttl(&self, key: &str) -> TsResult<Option<Duration>>;

	/// Creates or refreshes a presence flag living for `ttl` (at most [`MAX_TTL`])
	async fn set_flag(&self, key: &str, ttl: Duration) -> TsResult<()>;

	/// Removes `key`. Removing an absent key succeeds.
	async fn clear(&self, key: &str) -> TsResult<()>;

	/// Short name used in logs
	fn name(&self) -> &'static str;

	/// Whether the backend coordinates more than one worker process
	fn is_distributed(&self) -> bool;
}

// vim: ts=4
