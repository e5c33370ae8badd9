use crate::engine::{Storage, StorageInner};
use crate::error::{StorageError, StorageErrorExt};
use private::Sealed;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use tokio::fs;
use tracing::info;

#[derive(Debug, Clone)]
struct StorageOptions {
    create: bool,
    pretty: bool,
}

impl Default for StorageOptions {
    fn default() -> Self {
        Self { create: true, pretty: true }
    }
}

#[derive(Debug, Default)]
pub struct NoRoot;
#[derive(Debug)]
pub struct WithRoot(PathBuf);

mod private {
    pub(super) trait Sealed {}
}
impl Sealed for NoRoot {}
impl Sealed for WithRoot {}

#[allow(private_bounds)]
#[derive(Debug, Default)]
pub struct StorageBuilder<S: Sealed = NoRoot> {
    state: S,
    options: StorageOptions,
}

#[allow(private_bounds)]
impl<S: Sealed> StorageBuilder<S> {
    /// Create the root directory when it is missing (default: `true`).
    #[must_use]
    pub const fn create(mut self, enable: bool) -> Self {
        self.options.create = enable;
        self
    }

    /// Indent JSON documents written through [`Storage::write_json`] (default: `true`).
    #[must_use]
    pub const fn pretty(mut self, enable: bool) -> Self {
        self.options.pretty = enable;
        self
    }

    fn transition<N: Sealed>(self, state: N) -> StorageBuilder<N> {
        StorageBuilder { state, options: self.options }
    }
}

impl StorageBuilder<NoRoot> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn root(self, path: impl Into<PathBuf>) -> StorageBuilder<WithRoot> {
        self.transition(WithRoot(path.into()))
    }
}

impl StorageBuilder<WithRoot> {
    /// Opens the store.
    ///
    /// The root is created when requested, canonicalized so that every later
    /// path check compares physical locations, and swept for temp files that a
    /// crashed writer left behind.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] when the root is missing (and `create` is off)
    /// or cannot be created or resolved.
    pub async fn connect(self) -> Result<Storage, StorageError> {
        let root = &self.state.0;

        if self.options.create {
            fs::create_dir_all(root)
                .await
                .context(format!("Cannot create storage root {}", root.display()))?;
        }

        let canonical = fs::canonicalize(root)
            .await
            .context(format!("Cannot resolve storage root {}", root.display()))?;
        info!(path = %canonical.display(), "Storage root ready");

        let storage = Storage {
            inner: Arc::new(StorageInner {
                root: canonical,
                pretty: self.options.pretty,
                tmp_counter: AtomicU64::new(1),
            }),
        };

        storage.purge_tmp().await;

        Ok(storage)
    }
}
