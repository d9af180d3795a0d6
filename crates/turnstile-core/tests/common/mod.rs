//! Common test utilities and helpers
//!
//! Builds an [`App`] on the in-process store and drives routers with
//! `oneshot`, addressing callers through `X-Forwarded-For` in proxy mode.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use http_body_util::BodyExt;
use store_adapter_memory::MemoryStoreAdapter;
use tower::ServiceExt;

use turnstile_core::auth::StaticTokenAuth;
use turnstile_core::edge::EdgeConfig;
use turnstile_core::rate_limit::PolicyTable;
use turnstile_core::stats::LocalTrafficStats;
use turnstile_core::{App, AppBuilderOpts, AppState, CoreConfig, GuardedStore, ServerMode};
use turnstile_types::auth_adapter::AuthCtx;

pub const USER_TOKEN: &str = "user-token";
pub const ADMIN_TOKEN: &str = "admin-token";

pub fn setup_test_logging() {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub fn test_auth() -> StaticTokenAuth {
	StaticTokenAuth::new()
		.with_token(USER_TOKEN, AuthCtx::new("alice"))
		.with_token(ADMIN_TOKEN, AuthCtx::new("root").with_roles(["admin"]))
}

pub fn test_app(policies: PolicyTable, edge: EdgeConfig) -> App {
	setup_test_logging();
	let store = GuardedStore::new(Arc::new(MemoryStoreAdapter::new()), &CoreConfig::default());
	let opts = AppBuilderOpts { mode: ServerMode::Proxy, ..AppBuilderOpts::default() };
	AppState::new(opts, store, policies, edge, Arc::new(test_auth()), Arc::new(LocalTrafficStats::new()))
}

pub fn get(uri: &str, ip: &str) -> Request<Body> {
	Request::get(uri).header("x-forwarded-for", ip).body(Body::empty()).unwrap()
}

pub fn get_as(uri: &str, ip: &str, token: &str) -> Request<Body> {
	Request::get(uri)
		.header("x-forwarded-for", ip)
		.header("authorization", format!("Bearer {}", token))
		.body(Body::empty())
		.unwrap()
}

pub async fn send(router: &Router, req: Request<Body>) -> Response<Body> {
	router.clone().oneshot(req).await.unwrap()
}

pub async fn status(router: &Router, req: Request<Body>) -> StatusCode {
	send(router, req).await.status()
}

pub async fn json(res: Response<Body>) -> serde_json::Value {
	let bytes = res.into_body().collect().await.unwrap().to_bytes();
	serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(res: Response<Body>) -> String {
	let bytes = res.into_body().collect().await.unwrap().to_bytes();
	String::from_utf8(bytes.to_vec()).unwrap()
}

// vim: ts=4
