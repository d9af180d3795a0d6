//! Counter store wrapper shared by the engine, the ban registry and the edge filter
//!
//! Every call is bounded by the configured store timeout. A call that runs
//! out of time is reported as `StoreUnavailable`, exactly like a backend
//! error, and callers resolve both through [`GuardedStore::fail_mode`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use turnstile_types::store_adapter::StoreAdapter;

use crate::config::{CoreConfig, FailMode};
use crate::prelude::*;

#[derive(Clone, Debug)]
pub struct GuardedStore {
	adapter: Arc<dyn StoreAdapter>,
	timeout: Duration,
	fail_mode: FailMode,
}

impl GuardedStore {
	pub fn new(adapter: Arc<dyn StoreAdapter>, config: &CoreConfig) -> Self {
		Self { adapter, timeout: config.store_timeout, fail_mode: config.fail_mode }
	}

	pub fn fail_mode(&self) -> FailMode {
		self.fail_mode
	}

	pub fn adapter(&self) -> &Arc<dyn StoreAdapter> {
		&self.adapter
	}

	async fn guard<T>(&self, op: &'static str, fut: impl Future<Output = TsResult<T>>) -> TsResult<T> {
		match tokio::time::timeout(self.timeout, fut).await {
			Ok(Ok(value)) => Ok(value),
			Ok(Err(err)) => {
				warn!(store = self.adapter.name(), op, error = %err, "Counter store call failed");
				Err(if err.is_store_unavailable() {
					err
				} else {
					Error::StoreUnavailable(err.to_string())
				})
			}
			Err(_) => {
				warn!(store = self.adapter.name(), op, timeout = ?self.timeout, "Counter store call timed out");
				Err(Error::StoreUnavailable(format!("{} timed out after {:?}", op, self.timeout)))
			}
		}
	}

	pub async fn increment_and_get(&self, key: &str, window: Duration) -> TsResult<u64> {
		self.guard("increment", self.adapter.increment_and_get(key, window)).await
	}

	pub async fn peek(&self, key: &str) -> TsResult<u64> {
		self.guard("peek", self.adapter.peek(key)).await
	}

	pub async fn exists(&self, key: &str) -> TsResult<bool> {
		self.guard("exists", self.adapter.exists(key)).await
	}

	pub async fn ttl(&self, key: &str) -> TsResult<Option<Duration>> {
		self.guard("ttl", self.adapter.ttl(key)).await
	}

	pub async fn set_flag(&self, key: &str, ttl: Duration) -> TsResult<()> {
		self.guard("set_flag", self.adapter.set_flag(key, ttl)).await
	}

	pub async fn clear(&self, key: &str) -> TsResult<()> {
		self.guard("clear", self.adapter.clear(key)).await
	}
}

#[cfg(test)]
pub(crate) mod testing {
	//! Store doubles for exercising the fail modes

	use async_trait::async_trait;

	use super::*;

	/// Store whose every call fails
	#[derive(Debug)]
	pub struct DownStore;

	#[async_trait]
	impl StoreAdapter for DownStore {
		async fn increment_and_get(&self, _key: &str, _window: Duration) -> TsResult<u64> {
			Err(Error::StoreUnavailable("connection refused".into()))
		}
		async fn peek(&self, _key: &str) -> TsResult<u64> {
			Err(Error::StoreUnavailable("connection refused".into()))
		}
		async fn exists(&self, _key: &str) -> TsResult<bool> {
			Err(Error::StoreUnavailable("connection refused".into()))
		}
		async fn ttl(&self, _key: &str) -> TsResult<Option<Duration>> {
			Err(Error::StoreUnavailable("connection refused".into()))
		}
		async fn set_flag(&self, _key: &str, _ttl: Duration) -> TsResult<()> {
			Err(Error::StoreUnavailable("connection refused".into()))
		}
		async fn clear(&self, _key: &str) -> TsResult<()> {
			Err(Error::StoreUnavailable("connection refused".into()))
		}
		fn name(&self) -> &'static str {
			"down"
		}
		fn is_distributed(&self) -> bool {
			false
		}
	}

	/// Store that never answers within any sane timeout
	#[derive(Debug)]
	pub struct StalledStore;

	#[async_trait]
	impl StoreAdapter for StalledStore {
		async fn increment_and_get(&self, _key: &str, _window: Duration) -> TsResult<u64> {
			tokio::time::sleep(Duration::from_secs(3600)).await;
			Ok(0)
		}
		async fn peek(&self, _key: &str) -> TsResult<u64> {
			tokio::time::sleep(Duration::from_secs(3600)).await;
			Ok(0)
		}
		async fn exists(&self, _key: &str) -> TsResult<bool> {
			tokio::time::sleep(Duration::from_secs(3600)).await;
			Ok(false)
		}
		async fn ttl(&self, _key: &str) -> TsResult<Option<Duration>> {
			tokio::time::sleep(Duration::from_secs(3600)).await;
			Ok(None)
		}
		async fn set_flag(&self, _key: &str, _ttl: Duration) -> TsResult<()> {
			tokio::time::sleep(Duration::from_secs(3600)).await;
			Ok(())
		}
		async fn clear(&self, _key: &str) -> TsResult<()> {
			tokio::time::sleep(Duration::from_secs(3600)).await;
			Ok(())
		}
		fn name(&self) -> &'static str {
			"stalled"
		}
		fn is_distributed(&self) -> bool {
			false
		}
	}

	pub fn guarded(adapter: impl StoreAdapter + 'static, fail_mode: FailMode) -> GuardedStore {
		let config = CoreConfig { fail_mode, store_timeout: Duration::from_millis(20) };
		GuardedStore::new(Arc::new(adapter), &config)
	}
}


// vim: ts=4
