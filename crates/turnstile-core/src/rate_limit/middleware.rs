//! Per-route admission middleware
//!
//! Tower layer guarding one action. Runs the ban gate and both quota checks
//! before the handler, and decorates admitted responses with the quota
//! headers.

use std::task::{Context, Poll};

use axum::body::Body;
use axum::response::{IntoResponse, Response};
use futures::future::BoxFuture;
use hyper::Request;
use tower::{Layer, Service};

use super::api::{Reason, RequestContext};
use super::extractors::client_ip_key;
use super::headers;
use crate::extract::caller;
use crate::prelude::*;

/// Admission layer for one action
#[derive(Clone)]
pub struct AdmissionLayer {
	app: App,
	action: &'static str,
	ban_gate: bool,
}

impl AdmissionLayer {
	/// Create a new admission layer
	pub fn new(app: App, action: &'static str) -> Self {
		Self { app, action, ban_gate: true }
	}

	/// Skip the ban gate and enforce quota only, for ban management routes
	pub fn quota_only(mut self) -> Self {
		self.ban_gate = false;
		self
	}
}

impl<S> Layer<S> for AdmissionLayer {
	type Service = AdmissionService<S>;

	fn layer(&self, inner: S) -> Self::Service {
		AdmissionService { inner, app: self.app.clone(), action: self.action, ban_gate: self.ban_gate }
	}
}

/// Admission middleware service
#[derive(Clone)]
pub struct AdmissionService<S> {
	inner: S,
	app: App,
	action: &'static str,
	ban_gate: bool,
}

impl<S> Service<Request<Body>> for AdmissionService<S>
where
	S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
	S::Future: Send + 'static,
{
	type Response = S::Response;
	type Error = S::Error;
	type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

	fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
		self.inner.poll_ready(cx)
	}

	fn call(&mut self, req: Request<Body>) -> Self::Future {
		let app = self.app.clone();
		let action = self.action;
		let ban_gate = self.ban_gate;
		// Take the service that was driven to readiness, leave a fresh clone behind
		let clone = self.inner.clone();
		let mut inner = std::mem::replace(&mut self.inner, clone);

		Box::pin(async move {
			let mut ctx = RequestContext::new(client_ip_key(&req, app.opts.mode), action);
			if let Some(auth) = caller(req.extensions()) {
				ctx = ctx.with_user(auth.user_id.clone());
			}

			let admission = if ban_gate {
				app.rate_limiter.admit(&ctx).await
			} else {
				app.rate_limiter.admit_quota(&ctx).await
			};
			if let Some(rejection) = admission.rejection() {
				match rejection.reason {
					Reason::Banned => app.stats.record_blocked(),
					_ => app.stats.record_rate_limited(),
				}
				return Ok(rejection.into_response());
			}

			let mut response = inner.call(req).await?;
			headers::apply(response.headers_mut(), &admission);
			Ok(response)
		})
	}
}

// vim: ts=4
