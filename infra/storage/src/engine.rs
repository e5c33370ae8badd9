//! The [`Storage`] handle: sandboxed, atomic file I/O plus typed JSON documents.

use crate::builder::StorageBuilder;
use crate::error::{StorageError, StorageErrorExt};
use crate::maintenance;
use crate::namespace::{NamespaceName, NamespacedStorage};
use crate::security;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Suffix marker of in-flight writes. Anything carrying it is garbage after a crash.
pub(crate) const TMP_MARKER: &str = ".quarrytmp.";

#[derive(Debug)]
pub struct StorageInner {
    /// Canonical physical root; every resolved path must stay below it.
    pub(crate) root: PathBuf,
    pub(crate) pretty: bool,
    pub(crate) tmp_counter: AtomicU64,
}

impl StorageInner {
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Cheaply cloneable handle to a sandboxed directory.
///
/// ```rust
/// use quarry_storage::{Storage, StorageError};
///
/// #[tokio::main]
/// async fn main() -> Result<(), StorageError> {
///     # let tmp = tempfile::tempdir().unwrap();
///     let storage = Storage::builder().root(tmp.path().join("data")).connect().await?;
///
///     let setup = storage.namespace("setup")?;
///     setup.write_json("config.json", &serde_json::json!({ "MaxRows": 50 })).await?;
///
///     let stored: Option<serde_json::Value> = setup.load_json("config.json").await?;
///     assert_eq!(stored.unwrap()["MaxRows"], 50);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Storage {
    pub(crate) inner: Arc<StorageInner>,
}

impl Deref for Storage {
    type Target = StorageInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Storage {
    #[must_use = "The storage engine is not initialized until you call .connect()"]
    pub fn builder() -> StorageBuilder {
        StorageBuilder::new()
    }

    /// Scoped view whose paths live under `<root>/<name>/`.
    ///
    /// Names are lowercased and may only hold ASCII alphanumerics and `_`.
    ///
    /// # Errors
    /// Returns [`StorageError::InvalidNamespace`] for empty or illegal names.
    pub fn namespace<N>(&self, name: N) -> Result<NamespacedStorage, StorageError>
    where
        N: TryInto<NamespaceName, Error = StorageError>,
    {
        let ns = name.try_into()?;
        Ok(NamespacedStorage::new(self.clone(), ns.0))
    }

    /// Maps a relative path to its physical location inside the sandbox.
    ///
    /// # Errors
    /// Returns [`StorageError::PathTraversalAttempt`] if the path would escape the root.
    pub fn resolve(&self, path: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
        security::resolve_scoped(&self.root, None, path)
    }

    /// # Errors
    /// [`StorageError::FileNotFound`] when the file is missing, [`StorageError::Io`] otherwise.
    pub async fn read(&self, path: impl AsRef<Path>) -> Result<Vec<u8>, StorageError> {
        self.read_scoped(None, path).await
    }

    /// Replaces the file atomically (unique temp file, `fsync`, rename).
    ///
    /// Parent directories are created on demand.
    ///
    /// # Errors
    /// [`StorageError::PathTraversalAttempt`] or [`StorageError::Io`].
    pub async fn write(&self, path: impl AsRef<Path>, data: &[u8]) -> Result<(), StorageError> {
        self.write_scoped(None, path, data).await
    }

    /// # Errors
    /// [`StorageError::FileNotFound`] when there is nothing to delete.
    pub async fn delete(&self, path: impl AsRef<Path>) -> Result<(), StorageError> {
        self.delete_scoped(None, path).await
    }

    /// # Errors
    /// Fails only when the path itself is rejected by the sandbox.
    pub fn exists(&self, path: impl AsRef<Path>) -> Result<bool, StorageError> {
        Ok(self.resolve(path)?.is_file())
    }

    /// Reads and deserializes a JSON document.
    ///
    /// # Errors
    /// [`StorageError::FileNotFound`], [`StorageError::Io`] or [`StorageError::Json`].
    pub async fn read_json<T: DeserializeOwned>(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<T, StorageError> {
        self.read_json_scoped(None, path).await
    }

    /// Like [`Storage::read_json`] but maps a missing file to `None`.
    ///
    /// # Errors
    /// [`StorageError::Io`] or [`StorageError::Json`].
    pub async fn load_json<T: DeserializeOwned>(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<Option<T>, StorageError> {
        optional(self.read_json_scoped(None, path).await)
    }

    /// Serializes `value` and writes it atomically.
    ///
    /// # Errors
    /// [`StorageError::Json`] when serialization fails, otherwise as [`Storage::write`].
    pub async fn write_json<T: Serialize + ?Sized>(
        &self,
        path: impl AsRef<Path>,
        value: &T,
    ) -> Result<(), StorageError> {
        self.write_json_scoped(None, path, value).await
    }

    pub async fn purge_tmp(&self) {
        maintenance::purge_tmp(&self.root).await;
    }

    pub(crate) async fn read_scoped(
        &self,
        namespace: Option<&str>,
        path: impl AsRef<Path>,
    ) -> Result<Vec<u8>, StorageError> {
        let resolved = security::resolve_scoped(&self.root, namespace, path)?;

        match fs::read(&resolved).await {
            Ok(data) => Ok(data),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(StorageError::FileNotFound {
                message: resolved.display().to_string().into(),
                context: None,
            }),
            Err(err) => Err(StorageError::Io {
                source: err,
                context: Some(format!("Read failed: {}", resolved.display()).into()),
            }),
        }
    }

    pub(crate) async fn write_scoped(
        &self,
        namespace: Option<&str>,
        path: impl AsRef<Path>,
        data: &[u8],
    ) -> Result<(), StorageError> {
        let resolved = security::resolve_scoped(&self.root, namespace, path)?;

        if let Some(parent) = resolved.parent() {
            fs::create_dir_all(parent)
                .await
                .context(format!("Cannot create {}", parent.display()))?;
        }

        let temp = unique_tmp_path(&resolved, &self.tmp_counter);
        {
            let mut file = fs::OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(&temp)
                .await
                .context(format!("Temp creation failed: {}", temp.display()))?;
            file.write_all(data).await.context("Write failed")?;
            file.sync_all().await.context("Sync failed")?;
        }

        if let Err(err) = fs::rename(&temp, &resolved).await {
            if err.kind() != ErrorKind::AlreadyExists {
                let _ = fs::remove_file(&temp).await;
                return Err(StorageError::Io {
                    source: err,
                    context: Some(format!("Rename failed: {}", resolved.display()).into()),
                });
            }
            fs::remove_file(&resolved)
                .await
                .context(format!("Cannot replace {}", resolved.display()))?;
            fs::rename(&temp, &resolved)
                .await
                .context(format!("Rename failed: {}", resolved.display()))?;
        }

        if let Some(parent) = resolved.parent() {
            sync_dir(parent).await;
        }

        debug!(path = %resolved.display(), bytes = data.len(), "File written");
        Ok(())
    }

    pub(crate) async fn delete_scoped(
        &self,
        namespace: Option<&str>,
        path: impl AsRef<Path>,
    ) -> Result<(), StorageError> {
        let resolved = security::resolve_scoped(&self.root, namespace, path)?;
        match fs::remove_file(&resolved).await {
            Ok(()) => {
                debug!(path = %resolved.display(), "File deleted");
                Ok(())
            },
            Err(err) if err.kind() == ErrorKind::NotFound => Err(StorageError::FileNotFound {
                message: resolved.display().to_string().into(),
                context: None,
            }),
            Err(err) => Err(StorageError::Io {
                source: err,
                context: Some(format!("Delete failed: {}", resolved.display()).into()),
            }),
        }
    }

    pub(crate) async fn read_json_scoped<T: DeserializeOwned>(
        &self,
        namespace: Option<&str>,
        path: impl AsRef<Path>,
    ) -> Result<T, StorageError> {
        let path = path.as_ref();
        let bytes = self.read_scoped(namespace, path).await?;
        serde_json::from_slice(&bytes).context(format!("Cannot parse {}", path.display()))
    }

    pub(crate) async fn write_json_scoped<T: Serialize + ?Sized>(
        &self,
        namespace: Option<&str>,
        path: impl AsRef<Path>,
        value: &T,
    ) -> Result<(), StorageError> {
        let path = path.as_ref();
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(value)
        } else {
            serde_json::to_vec(value)
        }
        .context(format!("Cannot serialize {}", path.display()))?;
        self.write_scoped(namespace, path, &bytes).await
    }
}

pub(crate) fn optional<T>(result: Result<T, StorageError>) -> Result<Option<T>, StorageError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err),
    }
}

async fn sync_dir(path: &Path) {
    match fs::File::open(path).await {
        Ok(dir) => {
            if let Err(err) = dir.sync_all().await {
                tracing::warn!(path = %path.display(), error = %err, "Directory sync failed");
            }
        },
        Err(err) => tracing::warn!(path = %path.display(), error = %err, "Directory open failed"),
    }
}

fn unique_tmp_path(target: &Path, counter: &AtomicU64) -> PathBuf {
    let id = counter.fetch_add(1, Ordering::Relaxed);
    let file_name = target.file_name().and_then(|s| s.to_str()).unwrap_or("document");
    target.with_file_name(format!("{file_name}{TMP_MARKER}{id}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tmp_names_are_unique_siblings() {
        let counter = AtomicU64::new(7);
        let first = unique_tmp_path(Path::new("/data/setup/config.json"), &counter);
        let second = unique_tmp_path(Path::new("/data/setup/config.json"), &counter);

        assert_eq!(first, Path::new("/data/setup/config.json.quarrytmp.7"));
        assert_eq!(second, Path::new("/data/setup/config.json.quarrytmp.8"));
    }

    #[test]
    fn optional_only_swallows_not_found() {
        let missing: Result<(), _> =
            Err(StorageError::FileNotFound { message: "x".into(), context: None });
        assert!(matches!(optional(missing), Ok(None)));

        let denied: Result<(), _> =
            Err(StorageError::PathTraversalAttempt { message: "x".into(), context: None });
        assert!(optional(denied).is_err());
    }
}
