//! Common test utilities and helpers

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use store_adapter_memory::MemoryStoreAdapter;
use tower::ServiceExt;

use turnstile::AppBuilder;
use turnstile::auth::StaticTokenAuth;
use turnstile::auth_adapter::AuthCtx;
use turnstile::stats::LocalTrafficStats;

pub const USER_TOKEN: &str = "user-token";
pub const ADMIN_TOKEN: &str = "admin-token";

/// Builder wired to a fresh in-process store
pub fn builder() -> AppBuilder {
	let mut builder = AppBuilder::new();
	builder
		.store(Arc::new(MemoryStoreAdapter::new()))
		.auth(Arc::new(
			StaticTokenAuth::new()
				.with_token(USER_TOKEN, AuthCtx::new("alice"))
				.with_token(ADMIN_TOKEN, AuthCtx::new("root").with_roles(["admin"])),
		))
		.stats(Arc::new(LocalTrafficStats::new()));
	builder
}

/// Request arriving from `ip` over a direct connection
pub fn request(method: &str, uri: &str, ip: &str) -> axum::http::request::Builder {
	let peer: SocketAddr = format!("{}:40000", ip).parse().unwrap();
	Request::builder().method(method).uri(uri).extension(ConnectInfo(peer))
}

pub fn get(uri: &str, ip: &str) -> Request<Body> {
	request("GET", uri, ip).body(Body::empty()).unwrap()
}

pub async fn send(router: &Router, req: Request<Body>) -> (StatusCode, axum::http::HeaderMap, serde_json::Value) {
	let res = router.clone().oneshot(req).await.unwrap();
	let status = res.status();
	let headers = res.headers().clone();
	let bytes = res.into_body().collect().await.unwrap().to_bytes();
	(status, headers, serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null))
}

// vim: ts=4
