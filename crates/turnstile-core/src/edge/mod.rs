//! Edge admission filter
//!
//! Coarse screening of all traffic before routing, independent of the
//! per-route policies: named throttles, structural blocklist heuristics and
//! repeat-offender escalation.

pub mod allow2ban;
pub mod blocklist;
pub mod config;
pub mod filter;
pub mod middleware;
pub mod request;
pub mod throttle;

pub use allow2ban::{Allow2Ban, Allow2BanConfig, Allow2BanState};
pub use blocklist::Heuristics;
pub use config::EdgeConfig;
pub use filter::{EdgeFilter, EdgeVerdict};
pub use middleware::edge_filter;
pub use request::EdgeRequest;
pub use throttle::{PathMatcher, Throttle, ThrottleKey};

// vim: ts=4
