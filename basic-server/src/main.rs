//! Turnstile demo server
//!
//! Configured from the environment:
//!
//! - `LISTEN` - address to bind (default `127.0.0.1:8080`)
//! - `MODE` - `standalone` or `proxy` (default `standalone`)
//! - `REDIS_URL` - counter store; without it an in-process store is used
//! - `FAIL_MODE` - `open` or `closed` (default `open`)
//! - `STORE_TIMEOUT_MS` - bound on every store call (default 200)
//! - `POLICY_FILE` - YAML policy table replacing the built-in one
//! - `ADMIN_TOKEN` - bearer token granting the admin role

use std::{env, sync::Arc, time::Duration};

use axum::{
	Json, Router,
	routing::{get, post},
};

use store_adapter_memory::MemoryStoreAdapter;
use store_adapter_redis::RedisStoreAdapter;
use turnstile::auth::StaticTokenAuth;
use turnstile::auth_adapter::AuthCtx;
use turnstile::config::FailMode;
use turnstile::error::{Error, TsResult};
use turnstile::extract::Auth;
use turnstile::rate_limit::{AdmissionLayer, PolicyTable};
use turnstile::stats::LocalTrafficStats;
use turnstile::store_adapter::StoreAdapter;
use turnstile::types::ApiResponse;
use turnstile::{App, AppBuilder, ServerMode};

const PURGE_INTERVAL: Duration = Duration::from_secs(60);

pub struct Config {
	pub listen: String,
	pub mode: ServerMode,
	pub redis_url: Option<String>,
	pub fail_mode: FailMode,
	pub store_timeout: Duration,
	pub policy_file: Option<String>,
	pub admin_token: Option<String>,
}

impl Config {
	fn from_env() -> TsResult<Self> {
		let store_timeout = match env::var("STORE_TIMEOUT_MS") {
			Ok(ms) => Duration::from_millis(
				ms.parse().map_err(|_| Error::ConfigError(format!("invalid STORE_TIMEOUT_MS: {}", ms)))?,
			),
			Err(_) => Duration::from_millis(200),
		};
		Ok(Self {
			listen: env::var("LISTEN").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
			mode: env::var("MODE").ok().map(|m| m.parse()).transpose()?.unwrap_or_default(),
			redis_url: env::var("REDIS_URL").ok().filter(|u| !u.is_empty()),
			fail_mode: env::var("FAIL_MODE").ok().map(|m| m.parse()).transpose()?.unwrap_or_default(),
			store_timeout,
			policy_file: env::var("POLICY_FILE").ok().filter(|p| !p.is_empty()),
			admin_token: env::var("ADMIN_TOKEN").ok().filter(|t| !t.is_empty()),
		})
	}
}

async fn open_store(config: &Config) -> TsResult<Arc<dyn StoreAdapter>> {
	if let Some(url) = &config.redis_url {
		let redis = RedisStoreAdapter::connect(url).await?;
		redis.ping().await?;
		tracing::info!("Counter store: redis");
		return Ok(Arc::new(redis));
	}

	tracing::warn!("REDIS_URL not set, using the in-process counter store (single worker process only)");
	let memory = Arc::new(MemoryStoreAdapter::new());
	let purger = memory.clone();
	tokio::spawn(async move {
		let mut interval = tokio::time::interval(PURGE_INTERVAL);
		loop {
			interval.tick().await;
			let purged = purger.purge_expired();
			if purged > 0 {
				tracing::debug!(purged, "Expired counters purged");
			}
		}
	});
	Ok(memory)
}

// Demo routes //
//*************//
async fn post_signin() -> Json<ApiResponse<()>> {
	Json(ApiResponse::message("Signed in"))
}

async fn get_me(Auth(auth): Auth) -> Json<ApiResponse<String>> {
	Json(ApiResponse::new(auth.user_id.to_string()))
}

async fn post_signout(Auth(auth): Auth) -> Json<ApiResponse<()>> {
	Json(ApiResponse::message(format!("Signed out {}", auth.user_id)))
}

fn demo_routes(app: &App) -> Router {
	let limit = |action| AdmissionLayer::new(app.clone(), action);
	Router::new()
		.route("/api/v1/auth/signin", post(post_signin).layer(limit("users#signin")))
		.route("/api/v1/auth/me", get(get_me).layer(limit("users#me")))
		.route("/api/v1/auth/signout", post(post_signout).layer(limit("users#signout")))
}

#[tokio::main]
async fn main() -> TsResult<()> {
	let config = Config::from_env()?;

	let mut builder = AppBuilder::new();
	builder
		.listen(config.listen.as_str())
		.mode(config.mode)
		.fail_mode(config.fail_mode)
		.store_timeout(config.store_timeout)
		.store(open_store(&config).await?)
		.stats(Arc::new(LocalTrafficStats::new()))
		.routes(demo_routes);

	if let Some(path) = &config.policy_file {
		builder.policies(PolicyTable::from_yaml_file(path).await?);
	}
	if let Some(token) = &config.admin_token {
		let auth = StaticTokenAuth::new().with_token(token.as_str(), AuthCtx::new("admin").with_roles(["admin"]));
		builder.auth(Arc::new(auth));
	}

	builder.run().await
}

// vim: ts=4
