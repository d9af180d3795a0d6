//! Common test utilities and helpers

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::middleware;
use http_body_util::BodyExt;
use store_adapter_memory::MemoryStoreAdapter;
use tower::ServiceExt;

use turnstile_core::auth::StaticTokenAuth;
use turnstile_core::edge::EdgeConfig;
use turnstile_core::middleware::optional_auth;
use turnstile_core::rate_limit::PolicyTable;
use turnstile_core::stats::LocalTrafficStats;
use turnstile_core::{App, AppBuilderOpts, AppState, CoreConfig, GuardedStore, ServerMode};
use turnstile_types::auth_adapter::AuthCtx;

pub const ADMIN_TOKEN: &str = "admin-token";
pub const USER_TOKEN: &str = "user-token";
pub const ADMIN_IP: &str = "10.0.0.1";

pub fn test_app() -> App {
	let store = GuardedStore::new(Arc::new(MemoryStoreAdapter::new()), &CoreConfig::default());
	let auth = StaticTokenAuth::new()
		.with_token(ADMIN_TOKEN, AuthCtx::new("root").with_roles(["admin"]))
		.with_token(USER_TOKEN, AuthCtx::new("alice"));
	let opts = AppBuilderOpts { mode: ServerMode::Proxy, ..AppBuilderOpts::default() };
	AppState::new(
		opts,
		store,
		PolicyTable::default(),
		EdgeConfig::standard().unwrap(),
		Arc::new(auth),
		Arc::new(LocalTrafficStats::new()),
	)
}

pub fn admin_router(app: &App) -> Router {
	Router::new()
		.nest("/api/v1/admin", turnstile_admin::router(app))
		.layer(middleware::from_fn_with_state(app.clone(), optional_auth))
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
	let mut req = Request::get(uri).header("x-forwarded-for", ADMIN_IP);
	if let Some(token) = token {
		req = req.header("authorization", format!("Bearer {}", token));
	}
	req.body(Body::empty()).unwrap()
}

pub fn post(uri: &str, token: &str, body: serde_json::Value) -> Request<Body> {
	Request::post(uri)
		.header("x-forwarded-for", ADMIN_IP)
		.header("authorization", format!("Bearer {}", token))
		.header("content-type", "application/json")
		.body(Body::from(body.to_string()))
		.unwrap()
}

pub async fn send(router: &Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
	let res: Response<Body> = router.clone().oneshot(req).await.unwrap();
	let status = res.status();
	let bytes = res.into_body().collect().await.unwrap().to_bytes();
	(status, serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null))
}

// vim: ts=4
