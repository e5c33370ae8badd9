//! HTTP plumbing shared by every slice: the state registry and system routes.

mod health;
pub mod router;
mod state;

pub use state::{ApiState, ApiStateBuilder, ApiStateError, ApiStateErrorExt, ApiStateInner};

/// OpenAPI tag of kernel-owned routes.
pub const SYSTEM_TAG: &str = "System";
