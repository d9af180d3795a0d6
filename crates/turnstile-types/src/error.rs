//! Error taxonomy shared by every Turnstile crate
//!
//! Store failures, policy validation and heuristic rejections each have their
//! own variant so callers can route them to the right outcome. Apart from
//! validation messages, `IntoResponse` only emits a generic message; the
//! detail goes to the logs.

use axum::{
	Json,
	http::StatusCode,
	response::{IntoResponse, Response},
};

pub type TsResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	/// The counter store could not be reached or did not answer in time
	StoreUnavailable(String),
	/// A policy has a zero limit or a zero window
	InvalidPolicy(String),
	/// A blocklist heuristic matched the raw request
	MalformedRequest(String),
	PermissionDenied,
	Unauthorized,
	NotFound,
	ValidationError(String),
	ConfigError(String),
	Internal(String),

	// externals
	Io(std::io::Error),
}

impl Error {
	pub fn is_store_unavailable(&self) -> bool {
		matches!(self, Error::StoreUnavailable(_))
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Error::StoreUnavailable(msg) => write!(f, "counter store unavailable: {}", msg),
			Error::InvalidPolicy(msg) => write!(f, "invalid policy: {}", msg),
			Error::MalformedRequest(msg) => write!(f, "malformed request: {}", msg),
			Error::PermissionDenied => write!(f, "permission denied"),
			Error::Unauthorized => write!(f, "unauthorized"),
			Error::NotFound => write!(f, "not found"),
			Error::ValidationError(msg) => write!(f, "validation error: {}", msg),
			Error::ConfigError(msg) => write!(f, "configuration error: {}", msg),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
			Error::Io(err) => write!(f, "io error: {}", err),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Error::Io(err) => Some(err),
			_ => None,
		}
	}
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Self::ValidationError(err.to_string())
	}
}

impl From<serde_yaml::Error> for Error {
	fn from(err: serde_yaml::Error) -> Self {
		Self::ConfigError(err.to_string())
	}
}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		let (status, message): (StatusCode, String) = match &self {
			Error::PermissionDenied => (StatusCode::FORBIDDEN, "Admin access required".into()),
			Error::Unauthorized => (StatusCode::UNAUTHORIZED, "Authentication required".into()),
			Error::NotFound => (StatusCode::NOT_FOUND, "Not found".into()),
			Error::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
			Error::MalformedRequest(_) => (
				StatusCode::TOO_MANY_REQUESTS,
				"Too many requests. Please try again later.".to_string(),
			),
			Error::StoreUnavailable(_) => {
				(StatusCode::SERVICE_UNAVAILABLE, "Service temporarily unavailable".into())
			}
			Error::InvalidPolicy(_) | Error::ConfigError(_) | Error::Internal(_) | Error::Io(_) => {
				(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".into())
			}
		};
		if status.is_server_error() {
			tracing::error!(error = %self, "request failed");
		} else {
			tracing::debug!(error = %self, "request rejected");
		}

		let body = serde_json::json!({
			"status": "error",
			"message": message,
		});
		(status, Json(body)).into_response()
	}
}


// vim: ts=4
