//! In-process counter store
//!
//! Keys are spread over a fixed number of shards, each an LRU map behind its
//! own mutex, so every operation on one key is atomic with respect to every
//! other operation on that key. Expiry is lazy: an expired entry is treated as
//! absent and dropped on the next access (or by [`MemoryStoreAdapter::purge_expired`]).
//!
//! Counters live in a bounded LRU per shard; presence flags (bans) live in a
//! separate map per shard that is never evicted, only expired. A flood of
//! distinct keys can therefore push out old counters (resetting that quota
//! early) but can never lift a ban.
//!
//! This store only coordinates the tasks of a single process. Running more than
//! one worker process against it multiplies every limit by the process count.

#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use parking_lot::Mutex;

use turnstile::prelude::*;
use turnstile::store_adapter::StoreAdapter;

const DEFAULT_SHARDS: usize = 16;
const DEFAULT_SHARD_CAPACITY: NonZeroUsize = match NonZeroUsize::new(10_000) {
	Some(v) => v,
	None => NonZeroUsize::MIN,
};

#[derive(Debug, Clone)]
pub struct MemoryStoreConfig {
	/// Number of independently locked shards
	pub shards: usize,
	/// Maximum counters per shard, least recently used ones are evicted first.
	/// Flags are not counted here and never evicted.
	pub max_entries_per_shard: usize,
}

impl Default for MemoryStoreConfig {
	fn default() -> Self {
		Self { shards: DEFAULT_SHARDS, max_entries_per_shard: DEFAULT_SHARD_CAPACITY.get() }
	}
}

#[derive(Debug, Clone, Copy)]
struct Entry {
	value: u64,
	/// `None` = never expires
	expires_at: Option<Instant>,
}

impl Entry {
	fn is_expired(&self, now: Instant) -> bool {
		self.expires_at.is_some_and(|exp| now >= exp)
	}

	fn remaining(&self, now: Instant) -> Duration {
		self.expires_at.map_or(Duration::MAX, |exp| exp.saturating_duration_since(now))
	}
}

#[derive(Debug)]
struct ShardMaps {
	counters: LruCache<Box<str>, Entry>,
	flags: HashMap<Box<str>, Entry>,
}

impl ShardMaps {
	fn new(capacity: NonZeroUsize) -> Self {
		Self { counters: LruCache::new(capacity), flags: HashMap::new() }
	}

	/// Live (unexpired) entry for `key`, dropping it if it has expired
	fn live_entry(&mut self, key: &str, now: Instant) -> Option<Entry> {
		if let Some(flag) = self.flags.get(key).copied() {
			if !flag.is_expired(now) {
				return Some(flag);
			}
			self.flags.remove(key);
		}
		let entry = *self.counters.peek(key)?;
		if entry.is_expired(now) {
			self.counters.pop(key);
			None
		} else {
			Some(entry)
		}
	}

	fn purge_expired(&mut self, now: Instant) -> usize {
		let before = self.flags.len();
		self.flags.retain(|_, entry| !entry.is_expired(now));
		let mut removed = before - self.flags.len();

		let expired: Vec<Box<str>> =
			self.counters.iter().filter(|(_, entry)| entry.is_expired(now)).map(|(key, _)| key.clone()).collect();
		for key in expired {
			self.counters.pop(&key);
			removed += 1;
		}
		removed
	}

	fn len(&self) -> usize {
		self.counters.len() + self.flags.len()
	}
}

type Shard = Mutex<ShardMaps>;

#[derive(Debug)]
pub struct MemoryStoreAdapter {
	shards: Box<[Shard]>,
}

impl MemoryStoreAdapter {
	/// Store with 16 shards of 10 000 counters each
	///
	/// Past that, the least recently used counters are evicted: under a flood
	/// of distinct keys (spoofed forwarding headers in proxy mode, say) an
	/// evicted caller starts a fresh window. Bans are kept apart and are only
	/// ever dropped when they expire or are cleared.
	pub fn new() -> Self {
		Self::with_config(MemoryStoreConfig::default())
	}

	pub fn with_config(config: MemoryStoreConfig) -> Self {
		let capacity =
			NonZeroUsize::new(config.max_entries_per_shard).unwrap_or(DEFAULT_SHARD_CAPACITY);
		let shards = (0..config.shards.max(1)).map(|_| Mutex::new(ShardMaps::new(capacity))).collect();
		Self { shards }
	}

	fn shard(&self, key: &str) -> &Shard {
		let mut hasher = DefaultHasher::new();
		key.hash(&mut hasher);
		// Modulo of a u64 by a usize-sized shard count always fits back in usize
		let idx = usize::try_from(hasher.finish() % self.shards.len() as u64).unwrap_or(0);
		&self.shards[idx]
	}

	/// Drops every expired entry, returns how many were removed
	pub fn purge_expired(&self) -> usize {
		let now = Instant::now();
		let removed: usize = self.shards.iter().map(|shard| shard.lock().purge_expired(now)).sum();
		if removed > 0 {
			debug!("Purged {} expired counter store entries", removed);
		}
		removed
	}

	/// Number of entries currently held, expired ones included
	pub fn len(&self) -> usize {
		self.shards.iter().map(|s| s.lock().len()).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl Default for MemoryStoreAdapter {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl StoreAdapter for MemoryStoreAdapter {
	async fn increment_and_get(&self, key: &str, window: Duration) -> TsResult<u64> {
		let now = Instant::now();
		let mut shard = self.shard(key).lock();

		if let Some(entry) = shard.counters.get_mut(key) {
			if !entry.is_expired(now) {
				entry.value = entry.value.saturating_add(1);
				return Ok(entry.value);
			}
		}

		shard.counters.put(key.into(), Entry { value: 1, expires_at: now.checked_add(window) });
		Ok(1)
	}

	async fn peek(&self, key: &str) -> TsResult<u64> {
		Ok(self.shard(key).lock().live_entry(key, Instant::now()).map_or(0, |e| e.value))
	}

	async fn exists(&self, key: &str) -> TsResult<bool> {
		Ok(self.shard(key).lock().live_entry(key, Instant::now()).is_some())
	}

	async fn ttl(&self, key: &str) -> TsResult<Option<Duration>> {
		let now = Instant::now();
		Ok(self.shard(key).lock().live_entry(key, now).map(|e| e.remaining(now)))
	}

	async fn set_flag(&self, key: &str, ttl: Duration) -> TsResult<()> {
		let now = Instant::now();
		let mut shard = self.shard(key).lock();
		shard.counters.pop(key);
		shard.flags.insert(key.into(), Entry { value: 1, expires_at: now.checked_add(ttl) });
		Ok(())
	}

	async fn clear(&self, key: &str) -> TsResult<()> {
		let mut shard = self.shard(key).lock();
		shard.counters.pop(key);
		shard.flags.remove(key);
		Ok(())
	}

	fn name(&self) -> &'static str {
		"memory"
	}

	fn is_distributed(&self) -> bool {
		false
	}
}

// vim: ts=4
