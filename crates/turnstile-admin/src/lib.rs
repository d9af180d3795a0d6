//! Admin API handlers for rate limit and ban management

pub mod perm;
pub mod rate_limits;

mod prelude;

use axum::{
	Router, middleware,
	routing::{get, post},
};

use turnstile_core::rate_limit::AdmissionLayer;

use crate::prelude::*;

/// Admin routes, to be nested under `/api/v1/admin`
///
/// Every route is admin-only and quota-limited under its own action. Bans
/// are not consulted here, so an operator whose own address falls under a
/// ban can still lift it.
pub fn router(app: &App) -> Router {
	let limit = |action| AdmissionLayer::new(app.clone(), action).quota_only();

	Router::new()
		.route("/rate_limits", get(rate_limits::get_stats).layer(limit("rate_limits#index")))
		.route("/rate_limits/snapshot", get(rate_limits::get_snapshot).layer(limit("rate_limits#show")))
		.route("/rate_limits/ban_ip", post(rate_limits::post_ban_ip).layer(limit("rate_limits#ban_ip")))
		.route("/rate_limits/unban_ip", post(rate_limits::post_unban_ip).layer(limit("rate_limits#unban_ip")))
		.route("/rate_limits/ban_user", post(rate_limits::post_ban_user).layer(limit("rate_limits#ban_user")))
		.route(
			"/rate_limits/unban_user",
			post(rate_limits::post_unban_user).layer(limit("rate_limits#unban_user")),
		)
		.route("/rate_limits/reset", post(rate_limits::post_reset).layer(limit("rate_limits#reset")))
		.route_layer(middleware::from_fn(perm::require_admin))
		.with_state(app.clone())
}

// vim: ts=4
