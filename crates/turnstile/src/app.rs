//! App builder - constructs and runs the Turnstile application

use std::sync::Arc;
use std::time::Duration;

use axum::Router;

use crate::prelude::*;
use crate::{routes, webserver};
pub use turnstile_core::app::{App, AppBuilderOpts, AppState, ServerMode, VERSION};
use turnstile_core::auth::StaticTokenAuth;
use turnstile_core::config::{CoreConfig, FailMode};
use turnstile_core::edge::EdgeConfig;
use turnstile_core::rate_limit::PolicyTable;
use turnstile_core::stats::{NullTrafficStats, TrafficStats};
use turnstile_core::store::GuardedStore;
use turnstile_types::auth_adapter::AuthResolver;
use turnstile_types::store_adapter::StoreAdapter;

/// Builds the application routes once the app exists
type RoutesFn = Box<dyn FnOnce(&App) -> Router + Send>;

pub struct AppBuilder {
	opts: AppBuilderOpts,
	core: CoreConfig,
	store: Option<Arc<dyn StoreAdapter>>,
	policies: PolicyTable,
	edge: Option<EdgeConfig>,
	auth: Option<Arc<dyn AuthResolver>>,
	stats: Option<Arc<dyn TrafficStats>>,
	routes: Vec<RoutesFn>,
}

impl AppBuilder {
	pub fn new() -> Self {
		// A second builder in the same process keeps the first subscriber
		let _ = tracing_subscriber::fmt()
			.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
			.with_target(false)
			.try_init();
		AppBuilder {
			opts: AppBuilderOpts::default(),
			core: CoreConfig::default(),
			store: None,
			policies: PolicyTable::default(),
			edge: None,
			auth: None,
			stats: None,
			routes: Vec::new(),
		}
	}

	// Opts
	pub fn mode(&mut self, mode: ServerMode) -> &mut Self {
		self.opts.mode = mode;
		self
	}
	pub fn listen(&mut self, listen: impl Into<Box<str>>) -> &mut Self {
		self.opts.listen = listen.into();
		self
	}
	pub fn fail_mode(&mut self, fail_mode: FailMode) -> &mut Self {
		self.core.fail_mode = fail_mode;
		self
	}
	pub fn store_timeout(&mut self, timeout: Duration) -> &mut Self {
		self.core.store_timeout = timeout;
		self
	}

	// Admission
	pub fn policies(&mut self, policies: PolicyTable) -> &mut Self {
		self.policies = policies;
		self
	}
	pub fn edge_config(&mut self, edge: EdgeConfig) -> &mut Self {
		self.edge = Some(edge);
		self
	}

	// Collaborators
	pub fn store(&mut self, store: Arc<dyn StoreAdapter>) -> &mut Self {
		self.store = Some(store);
		self
	}
	pub fn auth(&mut self, auth: Arc<dyn AuthResolver>) -> &mut Self {
		self.auth = Some(auth);
		self
	}
	pub fn stats(&mut self, stats: Arc<dyn TrafficStats>) -> &mut Self {
		self.stats = Some(stats);
		self
	}

	/// Register application routes, built once the app exists so they can
	/// carry admission layers
	pub fn routes<F>(&mut self, f: F) -> &mut Self
	where
		F: FnOnce(&App) -> Router + Send + 'static,
	{
		self.routes.push(Box::new(f));
		self
	}

	/// Assemble the app and its router without serving
	pub fn build(self) -> TsResult<(App, Router)> {
		let Some(store) = self.store else {
			error!("FATAL: No counter store configured");
			return Err(Error::ConfigError("No counter store configured".into()));
		};
		if !store.is_distributed() {
			warn!(
				store = store.name(),
				"In-process counter store: limits are per process and cannot be coordinated across workers"
			);
		}

		let edge = match self.edge {
			Some(edge) => edge,
			None => EdgeConfig::standard().inspect_err(|e| error!("FATAL: Invalid edge configuration: {}", e))?,
		};
		let auth = self.auth.unwrap_or_else(|| {
			info!("No auth resolver configured, every caller is anonymous");
			Arc::new(StaticTokenAuth::new())
		});
		let stats = self.stats.unwrap_or_else(|| Arc::new(NullTrafficStats));

		info!(
			store = store.name(),
			fail_mode = self.core.fail_mode.as_str(),
			store_timeout = ?self.core.store_timeout,
			throttles = edge.throttles.len(),
			"Admission layer configured"
		);

		let store = GuardedStore::new(store, &self.core);
		let app = AppState::new(self.opts, store, self.policies, edge, auth, stats);
		let extra: Vec<Router> = self.routes.into_iter().map(|f| f(&app)).collect();
		let router = routes::init(&app, extra);

		Ok((app, router))
	}

	pub async fn run(self) -> TsResult<()> {
		info!("  _                      _   _ _");
		info!(" | |_ _  _ _ _ _ _  ___| |_(_) |___");
		info!(" |  _| || | '_| ' \\(_-<  _| | / -_)");
		info!("  \\__|\\_,_|_| |_||_/__/\\__|_|_\\___|");
		info!("V{}", VERSION);
		info!("");

		let (app, router) = self.build()?;
		webserver::serve(app, router).await
	}
}

impl Default for AppBuilder {
	fn default() -> Self {
		Self::new()
	}
}

// vim: ts=4
