use crate::engine::{Storage, optional};
use crate::error::StorageError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A validated namespace directory name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamespaceName(pub String);

impl TryFrom<String> for NamespaceName {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, StorageError> {
        Self::try_from(value.as_str())
    }
}

impl TryFrom<&String> for NamespaceName {
    type Error = StorageError;

    fn try_from(value: &String) -> Result<Self, StorageError> {
        Self::try_from(value.as_str())
    }
}

impl TryFrom<&str> for NamespaceName {
    type Error = StorageError;

    fn try_from(value: &str) -> Result<Self, StorageError> {
        let name = value.to_lowercase();

        if name.is_empty() {
            return Err(StorageError::InvalidNamespace {
                message: "namespace cannot be empty".into(),
                context: None,
            });
        }

        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(StorageError::InvalidNamespace {
                message: name.into(),
                context: Some("only a-z, 0-9 and '_' are allowed".into()),
            });
        }

        Ok(Self(name))
    }
}

impl fmt::Display for NamespaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A [`Storage`] view rooted at one namespace directory.
///
/// Shares the sandbox and write settings of its parent; cloning is cheap.
#[derive(Debug, Clone)]
pub struct NamespacedStorage {
    storage: Storage,
    namespace: Arc<str>,
}

impl NamespacedStorage {
    pub(crate) fn new(storage: Storage, namespace: String) -> Self {
        Self { storage, namespace: namespace.into() }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.namespace
    }

    /// # Errors
    /// Returns [`StorageError::PathTraversalAttempt`] if the path would leave the namespace root.
    pub fn resolve(&self, path: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
        crate::security::resolve_scoped(self.storage.root(), Some(&self.namespace), path)
    }

    /// # Errors
    /// See [`Storage::read`].
    pub async fn read(&self, path: impl AsRef<Path>) -> Result<Vec<u8>, StorageError> {
        self.storage.read_scoped(Some(&self.namespace), path).await
    }

    /// # Errors
    /// See [`Storage::write`].
    pub async fn write(&self, path: impl AsRef<Path>, data: &[u8]) -> Result<(), StorageError> {
        self.storage.write_scoped(Some(&self.namespace), path, data).await
    }

    /// # Errors
    /// See [`Storage::delete`].
    pub async fn delete(&self, path: impl AsRef<Path>) -> Result<(), StorageError> {
        self.storage.delete_scoped(Some(&self.namespace), path).await
    }

    /// # Errors
    /// See [`Storage::exists`].
    pub fn exists(&self, path: impl AsRef<Path>) -> Result<bool, StorageError> {
        Ok(self.resolve(path)?.is_file())
    }

    /// # Errors
    /// See [`Storage::read_json`].
    pub async fn read_json<T: DeserializeOwned>(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<T, StorageError> {
        self.storage.read_json_scoped(Some(&self.namespace), path).await
    }

    /// # Errors
    /// See [`Storage::load_json`].
    pub async fn load_json<T: DeserializeOwned>(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<Option<T>, StorageError> {
        optional(self.storage.read_json_scoped(Some(&self.namespace), path).await)
    }

    /// # Errors
    /// See [`Storage::write_json`].
    pub async fn write_json<T: Serialize + ?Sized>(
        &self,
        path: impl AsRef<Path>,
        value: &T,
    ) -> Result<(), StorageError> {
        self.storage.write_json_scoped(Some(&self.namespace), path, value).await
    }
}
