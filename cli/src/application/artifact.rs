//! Scoped ownership of the transient descriptor file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::LocalFs;

/// Owns the descriptor path for the duration of one run.
///
/// Dropping the guard removes the file, whether the run returned normally,
/// bailed out with `?`, was interrupted, or unwound from a panic. A file that
/// was never written is not an error.
pub struct ArtifactGuard<'a, F: LocalFs> {
    fs: &'a F,
    path: PathBuf,
}

impl<'a, F: LocalFs> ArtifactGuard<'a, F> {
    /// Take ownership of `path`. Nothing is written yet.
    #[must_use]
    pub fn acquire(fs: &'a F, path: &Path) -> Self {
        tracing::debug!(path = %path.display(), "acquired compose artifact");
        Self {
            fs,
            path: path.to_path_buf(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the rendered descriptor to the guarded path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write(&self, content: &str) -> Result<()> {
        self.fs
            .write(&self.path, content)
            .with_context(|| format!("writing compose file {}", self.path.display()))
    }
}

impl<F: LocalFs> Drop for ArtifactGuard<'_, F> {
    fn drop(&mut self) {
        if !self.fs.exists(&self.path) {
            return;
        }
        match self.fs.remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "removed compose artifact"),
            Err(e) => tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "failed to remove compose artifact"
            ),
        }
    }
}
