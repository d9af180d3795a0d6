//! Structural blocklist heuristics
//!
//! Pattern checks over the raw request, independent of any counting. The
//! first matching predicate rejects the request; its name only reaches the
//! logs.

use super::request::EdgeRequest;
use crate::prelude::*;

#[derive(Clone, Debug)]
pub struct Heuristics {
	pub max_header_len: usize,
	/// Lowercase substrings rejected in the User-Agent
	pub blocked_agents: Vec<Box<str>>,
	pub max_path_len: usize,
	pub forbidden_path_chars: Box<str>,
	pub max_path_dots: usize,
	pub max_query_params: usize,
	pub max_query_value_len: usize,
	pub max_content_length: u64,
}

impl Default for Heuristics {
	fn default() -> Self {
		Self {
			max_header_len: 1000,
			blocked_agents: ["bot", "crawler", "spider", "scraper", "curl", "wget", "python", "java"]
				.into_iter()
				.map(Into::into)
				.collect(),
			max_path_len: 500,
			forbidden_path_chars: "<>\"'&;".into(),
			max_path_dots: 10,
			max_query_params: 50,
			max_query_value_len: 1000,
			max_content_length: 10 * 1024 * 1024,
		}
	}
}

impl Heuristics {
	/// `Err(MalformedRequest)` naming the first predicate that matched
	pub fn check(&self, req: &EdgeRequest<'_>) -> TsResult<()> {
		if let Some(name) = self.oversized_header(req) {
			return Err(Error::MalformedRequest(format!("oversized header {}", name)));
		}

		if let Some(agent) = req.user_agent() {
			let agent = agent.to_ascii_lowercase();
			if let Some(hit) = self.blocked_agents.iter().find(|b| agent.contains(b.as_ref())) {
				return Err(Error::MalformedRequest(format!("blocked user agent ({})", hit)));
			}
		}

		if req.path.len() > self.max_path_len {
			return Err(Error::MalformedRequest("path too long".into()));
		}
		if req.path.chars().any(|c| self.forbidden_path_chars.contains(c)) {
			return Err(Error::MalformedRequest("suspicious path characters".into()));
		}
		if req.path.matches('.').count() > self.max_path_dots {
			return Err(Error::MalformedRequest("too many dots in path".into()));
		}

		let mut params = 0;
		for (_, value) in req.query_pairs() {
			params += 1;
			if params > self.max_query_params {
				return Err(Error::MalformedRequest("too many query parameters".into()));
			}
			if value.len() > self.max_query_value_len {
				return Err(Error::MalformedRequest("oversized query parameter".into()));
			}
		}

		if req.content_length().is_some_and(|len| len > self.max_content_length) {
			return Err(Error::MalformedRequest("oversized body".into()));
		}

		Ok(())
	}

	fn oversized_header<'a>(&self, req: &EdgeRequest<'a>) -> Option<&'a str> {
		req.headers
			.iter()
			.find(|(_, value)| value.len() > self.max_header_len)
			.map(|(name, _)| name.as_str())
	}
}


// vim: ts=4
