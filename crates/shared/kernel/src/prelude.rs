pub use crate::config::{ConfigError, load_config};
pub use quarry_domain::config::AppConfig;
pub use quarry_domain::registry::{FeatureSlice, InitializedSlice};
pub use quarry_domain::{ConfigValue, ValueKind};

#[cfg(feature = "server")]
pub use crate::server::{ApiState, ApiStateError};
