//! Kernel utilities shared across Quarry slices: layered config loading and,
//! behind the `server` feature, the HTTP state registry and system routes.
//!
//! ```rust,no_run
//! use quarry_kernel::config::load_config;
//! use quarry_kernel::domain::config::AppConfig;
//!
//! let cfg: AppConfig = load_config(None::<&str>).unwrap_or_default();
//! println!("listening on port {}", cfg.server.port);
//! ```

pub mod config;
pub mod prelude;
#[cfg(feature = "server")]
pub mod server;

pub use quarry_domain as domain;
