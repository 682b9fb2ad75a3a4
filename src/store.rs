//! Object-store upload seam.
//!
//! The batch driver pushes rewritten documents through `ObjectStore`
//! without knowing the backing service; local runs and tests use the
//! filesystem-rooted implementation.

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::RewrapError;
use crate::types::StoreKey;

/// Destination for rewritten documents.
///
/// Uploads are one-at-a-time with no retry; a failed upload surfaces as a
/// `Storage` error the caller decides how to record.
pub trait ObjectStore: Send + Sync {
    /// Stable store identifier used in logs.
    fn id(&self) -> &str;
    /// Copy a local file into the store under `key`.
    fn put_file(&self, local: &Path, key: &str) -> Result<(), RewrapError>;
}

/// Filesystem-rooted store that mirrors keys below a root directory.
pub struct DirObjectStore {
    root: PathBuf,
}

impl DirObjectStore {
    /// Create a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory the store mirrors keys into.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ObjectStore for DirObjectStore {
    fn id(&self) -> &str {
        "dir_store"
    }

    fn put_file(&self, local: &Path, key: &str) -> Result<(), RewrapError> {
        let destination = self.root.join(key);
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|error| {
                RewrapError::Storage(format!(
                    "cannot create store path '{}': {error}",
                    parent.display()
                ))
            })?;
        }
        fs::copy(local, &destination).map_err(|error| {
            RewrapError::Storage(format!(
                "upload of '{}' to '{}' failed: {error}",
                local.display(),
                destination.display()
            ))
        })?;
        Ok(())
    }
}

/// Build the store key for an uploaded document.
pub fn object_key(prefix: &str, file_name: &str) -> StoreKey {
    if prefix.is_empty() {
        file_name.to_string()
    } else {
        format!("{}/{file_name}", prefix.trim_end_matches('/'))
    }
}
