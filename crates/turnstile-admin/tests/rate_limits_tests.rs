//! Admin console endpoint tests

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;

use common::*;
use turnstile_core::edge::EdgeRequest;
use turnstile_core::rate_limit::BanState;
use turnstile_types::prelude::*;

const BASE: &str = "/api/v1/admin/rate_limits";

#[tokio::test]
async fn test_requires_admin() {
	let app = test_app();
	let router = admin_router(&app);

	let (status, body) = send(&router, get(BASE, None)).await;
	assert_eq!(status, StatusCode::UNAUTHORIZED);
	assert_eq!(body["status"], "error");

	let (status, body) = send(&router, get(BASE, Some(USER_TOKEN))).await;
	assert_eq!(status, StatusCode::FORBIDDEN);
	assert_eq!(body["message"], "Admin access required");

	let (status, _) = send(&router, post(&format!("{}/ban_ip", BASE), USER_TOKEN, json!({"ip": "1.2.3.4"}))).await;
	assert_eq!(status, StatusCode::FORBIDDEN);
	assert!(!app.rate_limiter.bans().is_banned(&Identity::ip("1.2.3.4"), &ActionScope::All).await);
}

#[tokio::test]
async fn test_stats() {
	let app = test_app();
	let router = admin_router(&app);
	app.stats.record_request();
	app.stats.record_request();
	app.stats.record_blocked();

	let (status, body) = send(&router, get(BASE, Some(ADMIN_TOKEN))).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["status"], "success");
	assert_eq!(body["data"]["total_requests"], json!({"count": 2, "period": "24h"}));
	assert_eq!(body["data"]["blocked_requests"]["count"], 1);
	assert_eq!(body["data"]["rate_limited_requests"]["count"], 0);
}

#[tokio::test]
async fn test_ip_snapshot() {
	let app = test_app();
	let router = admin_router(&app);
	let ip = Identity::ip("203.0.113.9");
	let signin = app.rate_limiter.policies().resolve("users#signin");
	for _ in 0..4 {
		app.rate_limiter.engine().check_and_consume(&ip, "users#signin", &signin.ip).await;
	}

	let (status, body) = send(&router, get(&format!("{}/snapshot?ip=203.0.113.9", BASE), Some(ADMIN_TOKEN))).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(
		body["data"],
		json!({
			"ip": "203.0.113.9",
			"banned": false,
			"rate_limits": {"auth": 6, "google_oauth": 5, "password_reset": 3}
		})
	);
}

#[tokio::test]
async fn test_user_snapshot_reads_user_bans() {
	let app = test_app();
	let router = admin_router(&app);
	app.rate_limiter.bans().ban(&Identity::user("42"), &ActionScope::All, Duration::from_secs(300)).await.unwrap();

	let (status, body) = send(&router, get(&format!("{}/snapshot?user_id=42", BASE), Some(ADMIN_TOKEN))).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"]["user_id"], "42");
	assert_eq!(body["data"]["banned"], true);
	assert!(body["data"]["ban_expires_in"].as_u64().unwrap() <= 300);
	assert_eq!(body["data"]["rate_limits"], json!({"general": 1000, "signout": 50}));
}

#[tokio::test]
async fn test_snapshot_requires_identity() {
	let app = test_app();
	let router = admin_router(&app);
	let (status, body) = send(&router, get(&format!("{}/snapshot", BASE), Some(ADMIN_TOKEN))).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["message"], "IP or user_id required");
}

#[tokio::test]
async fn test_ban_and_unban_ip() {
	let app = test_app();
	let router = admin_router(&app);
	let ip = Identity::ip("198.51.100.4");

	let (status, body) =
		send(&router, post(&format!("{}/ban_ip", BASE), ADMIN_TOKEN, json!({"ip": "198.51.100.4"}))).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["message"], "IP 198.51.100.4 banned for all for 3600s");
	match app.rate_limiter.bans().state(&ip, &ActionScope::All).await.unwrap() {
		BanState::Expiring(left) => assert!(left <= Duration::from_secs(3600) && left > Duration::from_secs(3500)),
		other => unreachable!("unexpected ban state {:?}", other),
	}

	// Banning again refreshes, unbanning twice is fine
	let (status, _) = send(
		&router,
		post(&format!("{}/ban_ip", BASE), ADMIN_TOKEN, json!({"ip": "198.51.100.4", "duration": 60})),
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	for _ in 0..2 {
		let (status, body) =
			send(&router, post(&format!("{}/unban_ip", BASE), ADMIN_TOKEN, json!({"ip": "198.51.100.4"}))).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["message"], "IP 198.51.100.4 unbanned for all");
	}
	assert!(!app.rate_limiter.bans().is_banned(&ip, &ActionScope::All).await);
}

#[tokio::test]
async fn test_action_scoped_user_ban() {
	let app = test_app();
	let router = admin_router(&app);
	let user = Identity::user("7");
	let signout = ActionScope::from("users#signout");

	let body = json!({"user_id": "7", "action": "users#signout", "duration": 120});
	let (status, body) = send(&router, post(&format!("{}/ban_user", BASE), ADMIN_TOKEN, body)).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["message"], "User 7 banned for users#signout for 120s");
	assert!(app.rate_limiter.bans().is_banned(&user, &signout).await);
	assert!(!app.rate_limiter.bans().is_banned(&user, &ActionScope::All).await);

	let body = json!({"user_id": "7", "action": "users#signout"});
	let (status, _) = send(&router, post(&format!("{}/unban_user", BASE), ADMIN_TOKEN, body)).await;
	assert_eq!(status, StatusCode::OK);
	assert!(!app.rate_limiter.bans().is_banned(&user, &signout).await);
}

#[tokio::test]
async fn test_ban_validation() {
	let app = test_app();
	let router = admin_router(&app);

	let (status, _) = send(&router, post(&format!("{}/ban_ip", BASE), ADMIN_TOKEN, json!({"ip": ""}))).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);

	let body = json!({"user_id": "7", "duration": 0});
	let (status, _) = send(&router, post(&format!("{}/ban_user", BASE), ADMIN_TOKEN, body)).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_oversized_ban_duration_rejected() {
	let app = test_app();
	let router = admin_router(&app);

	let body = json!({"ip": "198.51.100.8", "duration": u64::MAX});
	let (status, body) = send(&router, post(&format!("{}/ban_ip", BASE), ADMIN_TOKEN, body)).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["status"], "error");
	assert!(!app.rate_limiter.bans().is_banned(&Identity::ip("198.51.100.8"), &ActionScope::All).await);
}

#[tokio::test]
async fn test_admin_can_lift_ban_on_own_address() {
	let app = test_app();
	let router = admin_router(&app);

	let (status, _) = send(&router, post(&format!("{}/ban_ip", BASE), ADMIN_TOKEN, json!({"ip": ADMIN_IP}))).await;
	assert_eq!(status, StatusCode::OK);
	let (status, _) = send(&router, post(&format!("{}/ban_user", BASE), ADMIN_TOKEN, json!({"user_id": "root"}))).await;
	assert_eq!(status, StatusCode::OK);

	// The console stays reachable from the banned address
	let (status, body) = send(&router, get(&format!("{}/snapshot?ip={}", BASE, ADMIN_IP), Some(ADMIN_TOKEN))).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"]["banned"], true);

	let (status, body) = send(&router, post(&format!("{}/unban_ip", BASE), ADMIN_TOKEN, json!({"ip": ADMIN_IP}))).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["message"], format!("IP {} unbanned for all", ADMIN_IP));
	let (status, _) = send(&router, post(&format!("{}/unban_user", BASE), ADMIN_TOKEN, json!({"user_id": "root"}))).await;
	assert_eq!(status, StatusCode::OK);

	assert!(!app.rate_limiter.bans().is_banned(&Identity::ip(ADMIN_IP), &ActionScope::All).await);
	assert!(!app.rate_limiter.bans().is_banned(&Identity::user("root"), &ActionScope::All).await);
}

#[tokio::test]
async fn test_unban_ip_releases_edge_ban() {
	let app = test_app();
	let router = admin_router(&app);
	let method = axum::http::Method::GET;
	let uri: axum::http::Uri = "/api/v1/posts".parse().unwrap();
	let headers = axum::http::HeaderMap::new();
	let req = EdgeRequest::from_parts(&method, &uri, &headers, "192.0.2.77", None);

	for _ in 0..20 {
		assert!(app.edge.evaluate(&req).await.allowed());
	}
	assert!(!app.edge.evaluate(&req).await.allowed());

	let (status, _) =
		send(&router, post(&format!("{}/unban_ip", BASE), ADMIN_TOKEN, json!({"ip": "192.0.2.77"}))).await;
	assert_eq!(status, StatusCode::OK);
	assert!(app.edge.evaluate(&req).await.allowed());
}

#[tokio::test]
async fn test_reset_counter() {
	let app = test_app();
	let router = admin_router(&app);
	let ip = Identity::ip("203.0.113.50");
	let policy = app.rate_limiter.policies().resolve("users#reset_password").ip;
	for _ in 0..3 {
		assert!(app.rate_limiter.engine().check_and_consume(&ip, "users#reset_password", &policy).await);
	}
	assert!(!app.rate_limiter.engine().check_and_consume(&ip, "users#reset_password", &policy).await);

	let body = json!({"ip": "203.0.113.50", "action": "users#reset_password"});
	let (status, _) = send(&router, post(&format!("{}/reset", BASE), ADMIN_TOKEN, body)).await;
	assert_eq!(status, StatusCode::OK);
	assert!(app.rate_limiter.engine().check_and_consume(&ip, "users#reset_password", &policy).await);
}

#[tokio::test]
async fn test_admin_routes_are_rate_limited() {
	let app = test_app();
	let router = admin_router(&app);
	// Default IP policy: 100 per hour
	for _ in 0..100 {
		let (status, _) = send(&router, get(BASE, Some(ADMIN_TOKEN))).await;
		assert_eq!(status, StatusCode::OK);
	}
	let (status, body) = send(&router, get(BASE, Some(ADMIN_TOKEN))).await;
	assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
	assert_eq!(body["code"], "RATE_LIMIT_EXCEEDED");
}

// vim: ts=4
