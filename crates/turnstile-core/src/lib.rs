//! Core of the Turnstile admission layer.
//!
//! Everything that decides whether a request may proceed lives here: the
//! fixed-window rate limit engine, the ban registry, the per-action policy
//! table, the edge filter that screens all traffic before routing, and the
//! tower/axum glue that wires them in front of handlers. Shared mutable state
//! lives exclusively in the counter store behind [`store::GuardedStore`].

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod app;
pub mod auth;
pub mod config;
pub mod edge;
pub mod extract;
pub mod middleware;
pub mod prelude;
pub mod rate_limit;
pub mod stats;
pub mod store;

// Re-export commonly used types
pub use app::{App, AppBuilderOpts, AppState, ServerMode};
pub use config::{CoreConfig, FailMode};
pub use extract::{Auth, OptionalAuth};
pub use store::GuardedStore;

// vim: ts=4
