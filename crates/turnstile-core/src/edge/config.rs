//! Edge filter configuration

use std::time::Duration;

use axum::http::Method;

use super::allow2ban::{Allow2Ban, Allow2BanConfig};
use super::blocklist::Heuristics;
use super::throttle::{PathMatcher, Throttle};
use crate::prelude::*;

pub const HEALTH_PREFIX: &str = "/api/v1/health";
pub const API_PREFIX: &str = "/api/v1/";

const MINUTE: Duration = Duration::from_secs(60);
const HOUR: Duration = Duration::from_secs(3600);

#[derive(Clone, Debug)]
pub struct EdgeConfig {
	/// Evaluated in order, the first exceeded one rejects
	pub throttles: Vec<Throttle>,
	pub heuristics: Heuristics,
	pub allow2ban: Option<Allow2Ban>,
	/// Reported for every edge rejection, whichever rule fired
	pub retry_after: Duration,
}

impl EdgeConfig {
	/// Empty battery: no throttles, default heuristics, no escalation
	pub fn empty() -> Self {
		Self { throttles: Vec::new(), heuristics: Heuristics::default(), allow2ban: None, retry_after: MINUTE }
	}

	/// Production battery
	pub fn standard() -> TsResult<Self> {
		let throttles = vec![
			Throttle::new("requests by ip", 300, 5 * MINUTE, PathMatcher::Outside(HEALTH_PREFIX.into()))?,
			Throttle::new(
				"auth requests by ip",
				10,
				MINUTE,
				PathMatcher::pattern("^/api/v1/auth/(signin|signup|google|reset-password)")?,
			)?,
			Throttle::new("google oauth by ip", 5, MINUTE, PathMatcher::pattern("^/api/v1/auth/google")?)?,
			Throttle::new(
				"password reset by ip",
				3,
				HOUR,
				PathMatcher::pattern("^/api/v1/auth/reset-password")?,
			)?,
			Throttle::new("authenticated requests by user", 1000, HOUR, PathMatcher::Prefix(API_PREFIX.into()))?
				.method(Method::GET)
				.by_user(),
		];

		let allow2ban = Allow2Ban::new(Allow2BanConfig {
			qualifies: vec![PathMatcher::Prefix(API_PREFIX.into()), PathMatcher::Outside(HEALTH_PREFIX.into())],
			maxretry: 20,
			findtime: MINUTE,
			bantime: HOUR,
		})?;

		Ok(Self { throttles, heuristics: Heuristics::default(), allow2ban: Some(allow2ban), retry_after: MINUTE })
	}

	pub fn throttle(mut self, throttle: Throttle) -> Self {
		self.throttles.push(throttle);
		self
	}

	pub fn retry_after_secs(&self) -> u64 {
		self.retry_after.as_secs().max(1)
	}
}


// vim: ts=4
