//! Shared types, adapter traits, and core utilities for Turnstile.
//!
//! This crate contains the foundational types that are shared between the
//! core admission crate, the admin surface and all store adapter
//! implementations.

#![forbid(unsafe_code)]

pub mod auth_adapter;
pub mod error;
pub mod identity;
pub mod policy;
pub mod prelude;
pub mod store_adapter;
pub mod types;

// vim: ts=4
