//! Client address extraction
//!
//! The request layer decides which address identifies the caller: the socket
//! peer when serving directly, or the forwarding headers when running behind
//! a reverse proxy.

use std::net::{IpAddr, SocketAddr};

use axum::extract::ConnectInfo;
use hyper::Request;

use crate::app::ServerMode;

/// Identity value used when no address can be determined
pub const UNKNOWN_IP: &str = "unknown";

/// Extract client IP from request based on ServerMode
///
/// - Standalone mode: Use peer IP directly from ConnectInfo
/// - Proxy mode: Check forwarding headers first
pub fn extract_client_ip<B>(req: &Request<B>, mode: ServerMode) -> Option<IpAddr> {
	match mode {
		ServerMode::Standalone => peer_ip(req),
		ServerMode::Proxy => extract_from_xff(req)
			.or_else(|| extract_from_x_real_ip(req))
			.or_else(|| extract_from_forwarded(req))
			.or_else(|| peer_ip(req)),
	}
}

/// Client IP as an identity value, [`UNKNOWN_IP`] if there is none
pub fn client_ip_key<B>(req: &Request<B>, mode: ServerMode) -> Box<str> {
	extract_client_ip(req, mode).map_or_else(|| UNKNOWN_IP.into(), |ip| ip.to_string().into())
}

fn peer_ip<B>(req: &Request<B>) -> Option<IpAddr> {
	req.extensions().get::<ConnectInfo<SocketAddr>>().map(|ci| ci.0.ip())
}

/// Extract IP from X-Forwarded-For header
fn extract_from_xff<B>(req: &Request<B>) -> Option<IpAddr> {
	req.headers()
		.get("x-forwarded-for")
		.and_then(|h| h.to_str().ok())
		// Leftmost entry is the original client
		.and_then(|s| s.split(',').next().map(str::trim).and_then(|ip| ip.parse().ok()))
}

/// Extract IP from X-Real-IP header
fn extract_from_x_real_ip<B>(req: &Request<B>) -> Option<IpAddr> {
	req.headers()
		.get("x-real-ip")
		.and_then(|h| h.to_str().ok())
		.and_then(|s| s.trim().parse().ok())
}

/// Extract IP from Forwarded header (RFC 7239)
fn extract_from_forwarded<B>(req: &Request<B>) -> Option<IpAddr> {
	let value = req.headers().get("forwarded").and_then(|h| h.to_str().ok())?;
	// "for=192.0.2.60;proto=http" or "for=\"[2001:db8::1]\"", first hop only
	value.split(',').next()?.split(';').find_map(|part| {
		let (name, value) = part.trim().split_once('=')?;
		if !name.eq_ignore_ascii_case("for") {
			return None;
		}
		let cleaned = value.trim_matches('"');
		let cleaned = cleaned.strip_prefix('[').map_or(cleaned, |v| v.split(']').next().unwrap_or(v));
		cleaned.parse().ok()
	})
}


// vim: ts=4
