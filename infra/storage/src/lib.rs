//! Sandboxed file storage for Quarry's persisted configuration.
//!
//! - every path is resolved below a canonical root; `..`, absolute paths and
//!   symlinked escapes are rejected
//! - writes go through a unique temp file, `fsync` and rename, so readers never
//!   observe a half-written document
//! - namespaces partition the root (`setup/`, `prefs_<user>/`)
//! - stale temp files from crashed writers are swept on connect
//!
//! ```rust
//! use quarry_storage::{Storage, StorageError};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), StorageError> {
//! # let tmp = tempfile::tempdir().unwrap();
//! let storage = Storage::builder().root(tmp.path()).pretty(false).connect().await?;
//! storage.write("notes.txt", b"hello").await?;
//! assert_eq!(storage.read("notes.txt").await?, b"hello");
//! # Ok(())
//! # }
//! ```

mod builder;
mod engine;
mod error;
mod maintenance;
mod namespace;
mod security;

pub use builder::StorageBuilder;
pub use engine::{Storage, StorageInner};
pub use error::{StorageError, StorageErrorExt};
pub use namespace::{NamespaceName, NamespacedStorage};
