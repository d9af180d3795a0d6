//! Router assembly
//!
//! The edge filter wraps everything, the health check included; only the
//! per-address throttle exempts the health path.

use axum::{Json, Router, extract::State, middleware, routing::get};
use serde::Serialize;

use crate::prelude::*;
use turnstile_core::edge::edge_filter;
use turnstile_types::types::ApiResponse;

pub const HEALTH_PATH: &str = "/api/v1/health";

#[derive(Debug, Serialize)]
pub struct Health {
	pub version: &'static str,
	pub store: &'static str,
	pub distributed: bool,
}

async fn get_health(State(app): State<App>) -> Json<ApiResponse<Health>> {
	let adapter = app.store.adapter();
	Json(ApiResponse::new(Health {
		version: crate::VERSION,
		store: adapter.name(),
		distributed: adapter.is_distributed(),
	}))
}

async fn not_found() -> Error {
	Error::NotFound
}

pub fn init(app: &App, extra: Vec<Router>) -> Router {
	let mut router = Router::new()
		.route(HEALTH_PATH, get(get_health))
		.with_state(app.clone())
		.nest("/api/v1/admin", turnstile_admin::router(app));

	for routes in extra {
		router = router.merge(routes);
	}

	router.fallback(not_found).layer(middleware::from_fn_with_state(app.clone(), edge_filter))
}

// vim: ts=4
