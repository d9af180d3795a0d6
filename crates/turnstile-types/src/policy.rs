//! Rate limit policy: a quota per fixed window

use std::num::NonZeroU32;
use std::time::Duration;

use crate::error::{Error, TsResult};
use crate::store_adapter::MAX_TTL;

/// `limit` requests per `window`
///
/// Both values are non-zero by construction; a zero window would make every
/// counter expire immediately and is rejected at configuration time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Policy {
	limit: NonZeroU32,
	window: Duration,
}

impl Policy {
	pub fn new(limit: u32, window: Duration) -> TsResult<Self> {
		let limit = NonZeroU32::new(limit)
			.ok_or_else(|| Error::InvalidPolicy("limit must be positive".into()))?;
		if window.is_zero() {
			return Err(Error::InvalidPolicy("window must be positive".into()));
		}
		if window > MAX_TTL {
			return Err(Error::InvalidPolicy(format!("window must be at most {}s", MAX_TTL.as_secs())));
		}
		Ok(Self { limit, window })
	}

	/// Const constructor for built-in tables, values are clamped into range
	pub const fn fixed(limit: u32, window_secs: u64) -> Self {
		let limit = match NonZeroU32::new(limit) {
			Some(v) => v,
			None => NonZeroU32::MIN,
		};
		let window_secs = if window_secs == 0 {
			1
		} else if window_secs > MAX_TTL.as_secs() {
			MAX_TTL.as_secs()
		} else {
			window_secs
		};
		Self { limit, window: Duration::from_secs(window_secs) }
	}

	pub fn limit(&self) -> u32 {
		self.limit.get()
	}

	pub fn window(&self) -> Duration {
		self.window
	}

	/// Window rounded up to whole seconds, never below one
	pub fn window_secs(&self) -> u64 {
		let secs = self.window.as_secs();
		let secs = if self.window.subsec_nanos() > 0 { secs + 1 } else { secs };
		secs.max(1)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_rejects_zero_limit() {
		let result = Policy::new(0, Duration::from_secs(60));
		assert!(matches!(result, Err(Error::InvalidPolicy(_))));
	}

	#[test]
	fn test_rejects_zero_window() {
		let result = Policy::new(10, Duration::ZERO);
		assert!(matches!(result, Err(Error::InvalidPolicy(_))));
	}

	#[test]
	fn test_rejects_window_past_store_range() {
		let result = Policy::new(10, Duration::from_secs(u64::MAX));
		assert!(matches!(result, Err(Error::InvalidPolicy(_))));
		assert!(Policy::new(10, MAX_TTL).is_ok());
		assert_eq!(Policy::fixed(10, u64::MAX).window(), MAX_TTL);
	}

	#[test]
	fn test_window_secs_rounds_up() {
		let policy = Policy::new(5, Duration::from_millis(1500)).unwrap();
		assert_eq!(policy.window_secs(), 2);

		let policy = Policy::new(5, Duration::from_millis(100)).unwrap();
		assert_eq!(policy.window_secs(), 1);

		let policy = Policy::new(5, Duration::from_secs(3600)).unwrap();
		assert_eq!(policy.window_secs(), 3600);
		assert_eq!(policy.limit(), 5);
	}

	#[test]
	fn test_fixed_clamps_zero() {
		let policy = Policy::fixed(0, 0);
		assert_eq!(policy.limit(), 1);
		assert_eq!(policy.window(), Duration::from_secs(1));
		assert_eq!(Policy::fixed(10, 3600), Policy::new(10, Duration::from_secs(3600)).unwrap());
	}
}

// vim: ts=4
