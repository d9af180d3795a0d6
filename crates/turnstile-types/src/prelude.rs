pub use crate::error::{Error, TsResult};
pub use crate::identity::{ActionScope, Identity, Scope};
pub use crate::policy::Policy;

pub use tracing::{debug, error, info, warn};

// vim: ts=4
