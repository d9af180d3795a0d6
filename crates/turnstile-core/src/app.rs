//! App state type

use std::sync::Arc;

use turnstile_types::auth_adapter::AuthResolver;

use crate::edge::{EdgeConfig, EdgeFilter};
use crate::rate_limit::{PolicyTable, RateLimitManager};
use crate::stats::TrafficStats;
use crate::store::GuardedStore;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// How the server is reached, decides where the client address comes from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ServerMode {
	/// Clients connect directly, the socket peer is the client
	#[default]
	Standalone,
	/// Behind a reverse proxy, the forwarding headers name the client
	Proxy,
}

impl std::str::FromStr for ServerMode {
	type Err = turnstile_types::error::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"standalone" => Ok(ServerMode::Standalone),
			"proxy" => Ok(ServerMode::Proxy),
			other => Err(Self::Err::ConfigError(format!("unknown server mode: {}", other))),
		}
	}
}

pub struct AppState {
	pub opts: AppBuilderOpts,
	pub store: GuardedStore,

	// Admission
	pub rate_limiter: RateLimitManager,
	pub edge: EdgeFilter,

	// Collaborators
	pub auth: Arc<dyn AuthResolver>,
	pub stats: Arc<dyn TrafficStats>,
}

pub type App = Arc<AppState>;

impl AppState {
	/// Wire every admission component onto one shared store
	pub fn new(
		opts: AppBuilderOpts,
		store: GuardedStore,
		policies: PolicyTable,
		edge: EdgeConfig,
		auth: Arc<dyn AuthResolver>,
		stats: Arc<dyn TrafficStats>,
	) -> App {
		Arc::new(Self {
			opts,
			rate_limiter: RateLimitManager::new(store.clone(), policies),
			edge: EdgeFilter::new(store.clone(), edge),
			store,
			auth,
			stats,
		})
	}
}

#[derive(Debug, Clone)]
pub struct AppBuilderOpts {
	pub mode: ServerMode,
	pub listen: Box<str>,
}

impl Default for AppBuilderOpts {
	fn default() -> Self {
		Self { mode: ServerMode::Standalone, listen: "127.0.0.1:8080".into() }
	}
}


// vim: ts=4
