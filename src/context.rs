//! Scoped run context.
//!
//! Components that need scratch storage receive an explicit `RunContext`
//! instead of reaching for a process-wide temp directory; the scratch
//! directory is created at process start and removed when the context is
//! dropped.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::errors::RewrapError;

/// Per-run resources handed to the batch driver.
pub struct RunContext {
    scratch: TempDir,
}

impl RunContext {
    /// Acquire a fresh scratch directory for staging rewritten documents.
    pub fn create() -> Result<Self, RewrapError> {
        Ok(Self {
            scratch: tempfile::tempdir()?,
        })
    }

    /// Root of the scratch directory.
    pub fn scratch_dir(&self) -> &Path {
        self.scratch.path()
    }

    /// Path of a staging file inside the scratch directory.
    pub fn scratch_path(&self, file_name: impl AsRef<Path>) -> PathBuf {
        self.scratch.path().join(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn scratch_directory_is_released_on_drop() {
        let ctx = RunContext::create().unwrap();
        let scratch = ctx.scratch_dir().to_path_buf();
        fs::write(ctx.scratch_path("staged.json"), b"{}").unwrap();
        assert!(scratch.exists());
        drop(ctx);
        assert!(!scratch.exists());
    }
}
