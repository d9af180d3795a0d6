pub use crate::app::{App, AppState};
pub use turnstile_types::prelude::*;

// vim: ts=4
