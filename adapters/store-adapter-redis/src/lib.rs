//! Redis-backed counter store
//!
//! Shares counters and ban flags between every worker process pointed at the
//! same Redis. The increment is a server-side Lua script, so "INCR, then set
//! the expiry if this call created the key" is a single atomic round trip.
//!
//! ## Key layout
//!
//! Keys handed in by the core are prefixed with [`RedisStoreConfig::key_prefix`]
//! so several deployments can share one Redis database.

#![forbid(unsafe_code)]

mod error;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, Script};

use turnstile::prelude::*;
use turnstile::store_adapter::{MAX_TTL, StoreAdapter};

pub use error::from_redis_error;

const INCREMENT_SCRIPT: &str = r"
local current = redis.call('INCR', KEYS[1])
if current == 1 then
	redis.call('PEXPIRE', KEYS[1], ARGV[1])
end
return current
";

#[derive(Debug, Clone)]
pub struct RedisStoreConfig {
	/// Prefix for every key written by this store (default: "turnstile:")
	pub key_prefix: String,
}

impl Default for RedisStoreConfig {
	fn default() -> Self {
		Self { key_prefix: "turnstile:".to_string() }
	}
}

pub struct RedisStoreAdapter {
	connection: ConnectionManager,
	increment: Script,
	config: RedisStoreConfig,
}

impl fmt::Debug for RedisStoreAdapter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RedisStoreAdapter").field("config", &self.config).finish_non_exhaustive()
	}
}

/// Expiry argument in milliseconds, kept within what `PEXPIRE` accepts
fn millis(duration: Duration) -> u64 {
	u64::try_from(duration.min(MAX_TTL).as_millis()).unwrap_or(u64::MAX).max(1)
}

impl RedisStoreAdapter {
	/// Connect with the default configuration
	///
	/// # Arguments
	/// * `url` - Redis connection URL (e.g., "redis://127.0.0.1/")
	pub async fn connect(url: &str) -> TsResult<Self> {
		Self::connect_with_config(url, RedisStoreConfig::default()).await
	}

	pub async fn connect_with_config(url: &str, config: RedisStoreConfig) -> TsResult<Self> {
		let client = Client::open(url).map_err(from_redis_error)?;
		let connection = ConnectionManager::new(client).await.map_err(from_redis_error)?;
		info!(prefix = %config.key_prefix, "Connected to Redis counter store");

		Ok(Self { connection, increment: Script::new(INCREMENT_SCRIPT), config })
	}

	fn key(&self, key: &str) -> String {
		format!("{}{}", self.config.key_prefix, key)
	}

	/// Round trip to the server, for readiness checks
	pub async fn ping(&self) -> TsResult<()> {
		let mut conn = self.connection.clone();
		let _: String = redis::cmd("PING").query_async(&mut conn).await.map_err(from_redis_error)?;
		Ok(())
	}
}

#[async_trait]
impl StoreAdapter for RedisStoreAdapter {
	async fn increment_and_get(&self, key: &str, window: Duration) -> TsResult<u64> {
		let mut conn = self.connection.clone();
		let count: u64 = self
			.increment
			.key(self.key(key))
			.arg(millis(window))
			.invoke_async(&mut conn)
			.await
			.map_err(from_redis_error)?;
		Ok(count)
	}

	async fn peek(&self, key: &str) -> TsResult<u64> {
		let mut conn = self.connection.clone();
		let value: Option<u64> = conn.get(self.key(key)).await.map_err(from_redis_error)?;
		Ok(value.unwrap_or(0))
	}

	async fn exists(&self, key: &str) -> TsResult<bool> {
		let mut conn = self.connection.clone();
		let exists: bool = conn.exists(self.key(key)).await.map_err(from_redis_error)?;
		Ok(exists)
	}

	async fn ttl(&self, key: &str) -> TsResult<Option<Duration>> {
		let mut conn = self.connection.clone();
		let pttl: i64 = conn.pttl(self.key(key)).await.map_err(from_redis_error)?;
		// -2: no such key, -1: no expiry
		Ok(match pttl {
			-2 => None,
			-1 => Some(Duration::MAX),
			ms => Some(Duration::from_millis(u64::try_from(ms).unwrap_or(0))),
		})
	}

	async fn set_flag(&self, key: &str, ttl: Duration) -> TsResult<()> {
		let mut conn = self.connection.clone();
		let _: () = conn.pset_ex(self.key(key), 1u8, millis(ttl)).await.map_err(from_redis_error)?;
		Ok(())
	}

	async fn clear(&self, key: &str) -> TsResult<()> {
		let mut conn = self.connection.clone();
		let _: () = conn.del(self.key(key)).await.map_err(from_redis_error)?;
		Ok(())
	}

	fn name(&self) -> &'static str {
		"redis"
	}

	fn is_distributed(&self) -> bool {
		true
	}
}


// vim: ts=4
