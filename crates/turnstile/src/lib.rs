//! Turnstile decides, before any business logic runs, whether a request may
//! proceed.
//!
//! # Layers
//!
//! - Edge filter on all traffic
//!     - named throttles (per address or per user)
//!     - structural blocklist heuristics
//!     - repeat-offender bans
//! - Per-route admission
//!     - ban gate
//!     - fixed-window quota per address, then per user
//!     - informational `X-RateLimit-*` headers
//! - Admin console for snapshots, bans and counter resets
//!
//! All shared state lives in a pluggable counter store (Redis for multiple
//! worker processes, in-process memory for a single one).

#![forbid(unsafe_code)]

// Re-export shared types and adapter traits from turnstile-types
pub use turnstile_types::auth_adapter;
pub use turnstile_types::error;
pub use turnstile_types::identity;
pub use turnstile_types::policy;
pub use turnstile_types::store_adapter;
pub use turnstile_types::types;

// Core re-exports
pub use turnstile_core::auth;
pub use turnstile_core::config;
pub use turnstile_core::edge;
pub use turnstile_core::extract;
pub use turnstile_core::middleware;
pub use turnstile_core::rate_limit;
pub use turnstile_core::stats;

// Feature crate re-exports
pub use turnstile_admin as admin;

pub mod app;
pub mod prelude;
pub mod routes;
pub mod webserver;

pub use app::{App, AppBuilder, AppBuilderOpts, AppState, ServerMode, VERSION};

// vim: ts=4
