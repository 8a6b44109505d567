use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Destination for transformed file content.
pub trait StorageProvider {
    /// Stores `content` as the new content of `path`.
    ///
    /// # Arguments
    /// * `path`: The file being replaced. It must exist.
    /// * `content`: The complete new content.
    ///
    /// # Returns
    /// `Result<bool>`, whether the filesystem was modified.
    fn commit(&mut self, path: &Path, content: &[u8]) -> Result<bool>;
}

/// Replaces files atomically: the content goes to a temporary sibling, is
/// flushed to disk and is then renamed over the original, so an interrupted
/// run never leaves a half-written file behind.
///
/// Symlinks are resolved first. The link stays a link and its target gets
/// the new content.
pub struct AtomicFileStorage;

impl AtomicFileStorage {
    pub fn new() -> Self {
        Self
    }

    /// Resolves `path` to the file that actually holds the content.
    fn resolve(path: &Path) -> Result<PathBuf> {
        fs::canonicalize(path).with_context(|| format!("Failed to resolve {}", path.display()))
    }

    fn write_and_persist(target: &Path, content: &[u8]) -> Result<()> {
        let parent = target.parent().unwrap_or_else(|| Path::new("."));
        let mut temp = NamedTempFile::new_in(parent)
            .with_context(|| format!("Failed to create temporary file in {}", parent.display()))?;

        temp.write_all(content)
            .with_context(|| format!("Failed to write temporary file {}", temp.path().display()))?;
        temp.as_file()
            .sync_all()
            .with_context(|| format!("Failed to sync temporary file {}", temp.path().display()))?;

        // keep the original mode, rename would otherwise install the temp's
        let permissions = fs::metadata(target)
            .with_context(|| format!("Failed to read metadata of {}", target.display()))?
            .permissions();
        fs::set_permissions(temp.path(), permissions)
            .with_context(|| format!("Failed to copy permissions to {}", temp.path().display()))?;

        // a failed persist drops the temp file, which removes it
        temp.persist(target)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to rename temporary file over {}", target.display()))?;
        Ok(())
    }
}

impl Default for AtomicFileStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageProvider for AtomicFileStorage {
    fn commit(&mut self, path: &Path, content: &[u8]) -> Result<bool> {
        let target = Self::resolve(path)?;
        debug!(path = %path.display(), target = %target.display(), "replacing file");

        Self::write_and_persist(&target, content)?;
        Ok(true)
    }
}

/// Dry-run storage: never touches the filesystem and keeps nothing.
pub struct DryRunStorage;

impl StorageProvider for DryRunStorage {
    fn commit(&mut self, path: &Path, content: &[u8]) -> Result<bool> {
        debug!(path = %path.display(), bytes = content.len(), "dry run, not writing");
        Ok(false)
    }
}
