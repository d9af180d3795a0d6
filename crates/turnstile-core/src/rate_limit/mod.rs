//! Per-route rate limiting
//!
//! Fixed-window counters per (scope, identity, action), a ban registry checked
//! before them, and the static per-action policy table. All state lives in
//! the counter store; this module holds none of its own.

pub mod admission;
pub mod api;
pub mod ban;
pub mod engine;
pub mod error;
pub mod extractors;
pub mod headers;
pub mod middleware;
pub mod policy;

pub use admission::RateLimitManager;
pub use api::{Admission, Quota, Reason, RequestContext};
pub use ban::{BanRegistry, BanState};
pub use engine::{Consumption, RateLimitEngine};
pub use error::Rejection;
pub use extractors::extract_client_ip;
pub use middleware::AdmissionLayer;
pub use policy::{PolicyOverride, PolicyTable, ResolvedPolicy};

// vim: ts=4
