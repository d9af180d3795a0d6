use std::fmt;

use turnstile::error::Error;

/// Every backend failure surfaces as `StoreUnavailable` so the core can apply
/// its fail mode
pub fn from_redis_error<E: fmt::Display>(err: E) -> Error {
	Error::StoreUnavailable(format!("redis: {}", err))
}

// vim: ts=4
