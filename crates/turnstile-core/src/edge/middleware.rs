//! Edge filter middleware, applied to the whole router

use axum::{
	body::Body,
	extract::State,
	http::{Request, Response},
	middleware::Next,
	response::IntoResponse,
};

use super::filter::EdgeVerdict;
use super::request::EdgeRequest;
use crate::extract::caller;
use crate::middleware::resolve_auth;
use crate::prelude::*;
use crate::rate_limit::extractors::client_ip_key;

/// Screen a request before routing
///
/// Resolves the bearer token first, the per-user throttle keys on it.
pub async fn edge_filter(State(app): State<App>, mut req: Request<Body>, next: Next) -> Response<Body> {
	app.stats.record_request();
	resolve_auth(&app, &mut req).await;

	let ip = client_ip_key(&req, app.opts.mode);
	let verdict = {
		let auth = caller(req.extensions());
		let edge_req = EdgeRequest::from_parts(req.method(), req.uri(), req.headers(), &ip, auth);
		app.edge.evaluate(&edge_req).await
	};

	match verdict {
		EdgeVerdict::Allow => next.run(req).await,
		EdgeVerdict::Throttled(_) => {
			app.stats.record_rate_limited();
			app.edge.rejection().into_response()
		}
		EdgeVerdict::Blocked(_) | EdgeVerdict::Banned | EdgeVerdict::Unavailable => {
			app.stats.record_blocked();
			app.edge.rejection().into_response()
		}
	}
}

// vim: ts=4
