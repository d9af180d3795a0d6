//! Small shared API types

use serde::Serialize;
use serde_with::skip_serializing_none;

/// Current unix time in seconds
pub fn now_epoch_secs() -> i64 {
	chrono::Utc::now().timestamp()
}

/// Success envelope used by the JSON surfaces: `{status: "success", ...}`
#[skip_serializing_none]
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
	pub status: &'static str,
	pub data: Option<T>,
	pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
	pub fn new(data: T) -> Self {
		Self { status: "success", data: Some(data), message: None }
	}
}

impl ApiResponse<()> {
	pub fn message(message: impl Into<String>) -> Self {
		Self { status: "success", data: None, message: Some(message.into()) }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_envelope_shapes() {
		let json = serde_json::to_value(ApiResponse::new(3)).unwrap();
		assert_eq!(json, serde_json::json!({"status": "success", "data": 3}));

		let json = serde_json::to_value(ApiResponse::message("done")).unwrap();
		assert_eq!(json, serde_json::json!({"status": "success", "message": "done"}));
	}
}

// vim: ts=4
