//! Rate limit console: aggregate counters, per-identity snapshots and
//! out-of-band bans

use std::collections::BTreeMap;
use std::time::Duration;

use axum::{
	Json,
	extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::prelude::*;
use turnstile_core::extract::Auth;
use turnstile_core::rate_limit::BanState;
use turnstile_types::types::ApiResponse;

/// Ban length when the request names none
pub const DEFAULT_BAN_SECS: u64 = 3600;

/// Actions reported in an IP snapshot, by label
const IP_SNAPSHOT_ACTIONS: [(&str, &str); 3] = [
	("auth", "users#signin"),
	("google_oauth", "auth#google_signin"),
	("password_reset", "users#reset_password"),
];

/// Actions reported in a user snapshot, by label
const USER_SNAPSHOT_ACTIONS: [(&str, &str); 2] = [("signout", "users#signout"), ("general", "users#index")];

// Stats //
//*******//
#[derive(Debug, Serialize)]
pub struct CountStat {
	pub count: u64,
	pub period: &'static str,
}

impl CountStat {
	fn daily(count: u64) -> Self {
		Self { count, period: "24h" }
	}
}

#[derive(Debug, Serialize)]
pub struct TrafficStatsResponse {
	pub total_requests: CountStat,
	pub blocked_requests: CountStat,
	pub rate_limited_requests: CountStat,
}

/// GET /api/v1/admin/rate_limits - Aggregate traffic counters
pub async fn get_stats(State(app): State<App>) -> Json<ApiResponse<TrafficStatsResponse>> {
	let snapshot = app.stats.snapshot();
	Json(ApiResponse::new(TrafficStatsResponse {
		total_requests: CountStat::daily(snapshot.total_requests),
		blocked_requests: CountStat::daily(snapshot.blocked_requests),
		rate_limited_requests: CountStat::daily(snapshot.rate_limited_requests),
	}))
}

// Snapshot //
//**********//
#[derive(Debug, Deserialize)]
pub struct SnapshotQuery {
	pub ip: Option<String>,
	pub user_id: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Serialize)]
pub struct IdentitySnapshot {
	pub ip: Option<String>,
	pub user_id: Option<String>,
	/// Banned for all actions
	pub banned: bool,
	/// Seconds left on that ban, absent for permanent flags
	pub ban_expires_in: Option<u64>,
	/// Remaining quota per labelled action
	pub rate_limits: BTreeMap<&'static str, u64>,
}

async fn snapshot(
	app: &App,
	identity: &Identity,
	actions: &[(&'static str, &'static str)],
) -> TsResult<(BanState, BTreeMap<&'static str, u64>)> {
	let ban = app.rate_limiter.bans().state(identity, &ActionScope::All).await?;

	let mut rate_limits = BTreeMap::new();
	for (label, action) in actions {
		let resolved = app.rate_limiter.policies().resolve(action);
		let policy = match identity.scope() {
			Scope::Ip => resolved.ip,
			Scope::User => resolved.user,
		};
		let remaining = app.rate_limiter.engine().remaining(identity, action, &policy).await?;
		rate_limits.insert(*label, remaining);
	}

	Ok((ban, rate_limits))
}

/// GET /api/v1/admin/rate_limits/snapshot?ip=...|user_id=... - Ban state and remaining quota
pub async fn get_snapshot(
	State(app): State<App>,
	Query(query): Query<SnapshotQuery>,
) -> TsResult<Json<ApiResponse<IdentitySnapshot>>> {
	let (identity, actions) = match (query.ip, query.user_id) {
		(Some(ip), _) if !ip.is_empty() => (Identity::ip(ip), &IP_SNAPSHOT_ACTIONS[..]),
		(_, Some(user_id)) if !user_id.is_empty() => (Identity::user(user_id), &USER_SNAPSHOT_ACTIONS[..]),
		_ => return Err(Error::ValidationError("IP or user_id required".into())),
	};

	let (ban, rate_limits) = snapshot(&app, &identity, actions).await?;
	let value = identity.value().to_string();
	let (ip, user_id) = match identity.scope() {
		Scope::Ip => (Some(value), None),
		Scope::User => (None, Some(value)),
	};

	Ok(Json(ApiResponse::new(IdentitySnapshot {
		ip,
		user_id,
		banned: ban.is_banned(),
		ban_expires_in: ban.remaining_secs(),
		rate_limits,
	})))
}

// Bans //
//******//
#[derive(Debug, Deserialize)]
pub struct BanIpRequest {
	pub ip: String,
	pub action: Option<String>,
	/// Seconds
	pub duration: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct UnbanIpRequest {
	pub ip: String,
	pub action: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BanUserRequest {
	pub user_id: String,
	pub action: Option<String>,
	/// Seconds
	pub duration: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct UnbanUserRequest {
	pub user_id: String,
	pub action: Option<String>,
}

fn required(field: &str, value: &str) -> TsResult<()> {
	if value.trim().is_empty() {
		return Err(Error::ValidationError(format!("{} required", field)));
	}
	Ok(())
}

fn action_scope(action: Option<&str>) -> ActionScope {
	action.filter(|a| !a.is_empty()).map_or(ActionScope::All, ActionScope::from)
}

fn label(identity: &Identity) -> &'static str {
	match identity.scope() {
		Scope::Ip => "IP",
		Scope::User => "User",
	}
}

async fn ban(
	app: &App,
	admin: &str,
	identity: Identity,
	action: Option<&str>,
	duration: Option<u64>,
) -> TsResult<ApiResponse<()>> {
	let scope = action_scope(action);
	let secs = duration.unwrap_or(DEFAULT_BAN_SECS);
	app.rate_limiter.bans().ban(&identity, &scope, Duration::from_secs(secs)).await?;

	info!(admin, identity = %identity, scope = %scope, secs, "Admin ban issued");
	Ok(ApiResponse::message(format!("{} {} banned for {} for {}s", label(&identity), identity.value(), scope, secs)))
}

async fn unban(app: &App, admin: &str, identity: Identity, action: Option<&str>) -> TsResult<ApiResponse<()>> {
	let scope = action_scope(action);
	app.rate_limiter.bans().unban(&identity, &scope).await?;
	// A full IP unban also lifts a repeat-offender ban at the edge
	if identity.scope() == Scope::Ip && scope.is_all() {
		app.edge.release(identity.value()).await?;
	}

	info!(admin, identity = %identity, scope = %scope, "Admin ban lifted");
	Ok(ApiResponse::message(format!("{} {} unbanned for {}", label(&identity), identity.value(), scope)))
}

/// POST /api/v1/admin/rate_limits/ban_ip - Ban an address
pub async fn post_ban_ip(
	State(app): State<App>,
	Auth(auth): Auth,
	Json(req): Json<BanIpRequest>,
) -> TsResult<Json<ApiResponse<()>>> {
	required("ip", &req.ip)?;
	let res = ban(&app, &auth.user_id, Identity::ip(req.ip), req.action.as_deref(), req.duration).await?;
	Ok(Json(res))
}

/// POST /api/v1/admin/rate_limits/unban_ip - Lift an address ban
pub async fn post_unban_ip(
	State(app): State<App>,
	Auth(auth): Auth,
	Json(req): Json<UnbanIpRequest>,
) -> TsResult<Json<ApiResponse<()>>> {
	required("ip", &req.ip)?;
	Ok(Json(unban(&app, &auth.user_id, Identity::ip(req.ip), req.action.as_deref()).await?))
}

/// POST /api/v1/admin/rate_limits/ban_user - Ban a user
pub async fn post_ban_user(
	State(app): State<App>,
	Auth(auth): Auth,
	Json(req): Json<BanUserRequest>,
) -> TsResult<Json<ApiResponse<()>>> {
	required("user_id", &req.user_id)?;
	let res = ban(&app, &auth.user_id, Identity::user(req.user_id), req.action.as_deref(), req.duration).await?;
	Ok(Json(res))
}

/// POST /api/v1/admin/rate_limits/unban_user - Lift a user ban
pub async fn post_unban_user(
	State(app): State<App>,
	Auth(auth): Auth,
	Json(req): Json<UnbanUserRequest>,
) -> TsResult<Json<ApiResponse<()>>> {
	required("user_id", &req.user_id)?;
	Ok(Json(unban(&app, &auth.user_id, Identity::user(req.user_id), req.action.as_deref()).await?))
}

// Reset //
//*******//
#[derive(Debug, Deserialize)]
pub struct ResetRequest {
	pub ip: Option<String>,
	pub user_id: Option<String>,
	pub action: String,
}

/// POST /api/v1/admin/rate_limits/reset - Clear one counter early
pub async fn post_reset(
	State(app): State<App>,
	Auth(auth): Auth,
	Json(req): Json<ResetRequest>,
) -> TsResult<Json<ApiResponse<()>>> {
	required("action", &req.action)?;
	let identity = match (req.ip, req.user_id) {
		(Some(ip), _) if !ip.is_empty() => Identity::ip(ip),
		(_, Some(user_id)) if !user_id.is_empty() => Identity::user(user_id),
		_ => return Err(Error::ValidationError("IP or user_id required".into())),
	};

	app.rate_limiter.engine().reset(&identity, &req.action).await?;
	info!(admin = %auth.user_id, identity = %identity, action = %req.action, "Counter reset");
	Ok(Json(ApiResponse::message(format!("Counter {} reset for {}", req.action, identity))))
}


// vim: ts=4
