//! # Domain Models
//!
//! Pure Quarry types with minimal dependencies (`serde`, `bitflags`): option
//! values, option paths, option flags and the application config. No I/O here.

pub mod config;
pub mod flags;
pub mod path;
pub mod registry;
pub mod value;

pub use value::{ConfigValue, ValueKind};
