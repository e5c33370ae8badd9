use crate::error::StorageError;
use std::path::{Component, Path, PathBuf};

/// Folds `.` and `..` lexically. `..` may not climb above the relative base.
fn normalize_relative(path: &Path) -> Result<PathBuf, StorageError> {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::Normal(segment) => out.push(segment),
            Component::ParentDir if out.pop() => {},
            Component::ParentDir => {
                return Err(traversal(path, "'..' escapes the sandbox"));
            },
            Component::RootDir | Component::Prefix(_) => {
                return Err(traversal(path, "absolute paths are not allowed"));
            },
        }
    }

    if out.as_os_str().is_empty() {
        return Err(traversal(path, "path is empty"));
    }
    Ok(out)
}

/// Joins `namespace/path` below `root` and checks the result cannot escape it,
/// including through symlinked ancestors.
pub(crate) fn resolve_scoped(
    root: &Path,
    namespace: Option<&str>,
    path: impl AsRef<Path>,
) -> Result<PathBuf, StorageError> {
    let relative = normalize_relative(path.as_ref())?;
    let joined = match namespace {
        Some(ns) => root.join(ns).join(relative),
        None => root.join(relative),
    };

    match joined.canonicalize() {
        Ok(canonical) if canonical.starts_with(root) => Ok(canonical),
        Ok(canonical) => Err(traversal(&canonical, "resolves outside the sandbox")),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => check_ancestors(root, joined),
        Err(e) => Err(StorageError::Io { source: e, context: None }),
    }
}

/// For paths that do not exist yet: the nearest existing ancestor decides.
fn check_ancestors(root: &Path, joined: PathBuf) -> Result<PathBuf, StorageError> {
    for ancestor in joined.ancestors() {
        if ancestor == root {
            return Ok(joined);
        }
        if ancestor.exists() {
            return match ancestor.canonicalize() {
                Ok(canonical) if canonical.starts_with(root) => Ok(joined),
                Ok(canonical) => Err(traversal(&canonical, "ancestor links outside the sandbox")),
                Err(e) => Err(StorageError::Io {
                    source: e,
                    context: Some("Cannot verify parent directory".into()),
                }),
            };
        }
    }

    Err(traversal(&joined, "no ancestor inside the sandbox"))
}

fn traversal(path: &Path, reason: &'static str) -> StorageError {
    StorageError::PathTraversalAttempt {
        message: path.display().to_string().into(),
        context: Some(reason.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_segments_fold_inside_the_base() {
        let folded = normalize_relative(Path::new("setup/./drafts/../config.json")).unwrap();
        assert_eq!(folded, Path::new("setup/config.json"));
    }

    #[test]
    fn escaping_paths_are_rejected() {
        for bad in ["../secret", "a/../../b", "/etc/passwd", "", "."] {
            assert!(normalize_relative(Path::new(bad)).is_err(), "{bad} was accepted");
        }
    }

    #[test]
    fn missing_files_resolve_below_the_namespace() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().canonicalize().unwrap();

        let resolved = resolve_scoped(&root, Some("setup"), "config.json").unwrap();
        assert_eq!(resolved, root.join("setup").join("config.json"));
    }
}
