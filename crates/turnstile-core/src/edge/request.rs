//! Read-only view of a request as the edge rules see it

use axum::http::{HeaderMap, Method, header};

use turnstile_types::auth_adapter::AuthCtx;

#[derive(Debug)]
pub struct EdgeRequest<'a> {
	pub method: &'a Method,
	/// Raw path, not percent-decoded
	pub path: &'a str,
	pub query: Option<&'a str>,
	pub headers: &'a HeaderMap,
	pub ip: &'a str,
	/// User resolved from the bearer token, if any
	pub user: Option<&'a str>,
}

impl<'a> EdgeRequest<'a> {
	pub fn from_parts(
		method: &'a Method,
		uri: &'a axum::http::Uri,
		headers: &'a HeaderMap,
		ip: &'a str,
		auth: Option<&'a AuthCtx>,
	) -> Self {
		Self {
			method,
			path: uri.path(),
			query: uri.query(),
			headers,
			ip,
			user: auth.map(|a| a.user_id.as_ref()),
		}
	}

	pub fn user_agent(&self) -> Option<&'a str> {
		self.headers.get(header::USER_AGENT).and_then(|v| v.to_str().ok())
	}

	/// Declared body size; unparsable values count as absent
	pub fn content_length(&self) -> Option<u64> {
		self.headers
			.get(header::CONTENT_LENGTH)
			.and_then(|v| v.to_str().ok())
			.and_then(|v| v.trim().parse().ok())
	}

	/// Decoded query pairs
	pub fn query_pairs(&self) -> url::form_urlencoded::Parse<'a> {
		url::form_urlencoded::parse(self.query.unwrap_or_default().as_bytes())
	}
}



// vim: ts=4
