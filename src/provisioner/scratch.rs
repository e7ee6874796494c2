//! Scratch space for one acquisition run.

use super::error::Result;
use super::utils;
use std::path::{Path, PathBuf};

/// Ephemeral download + extraction area under the run's scratch directory.
///
/// The guard removes the whole area on drop, so the temporary archive and
/// the extraction tree are cleaned up on every exit path: success, user
/// cancellation, and failure. The staged executable lives one level up and
/// survives until the post-install placement hook consumes it.
pub(super) struct DownloadScratch {
    root: PathBuf,
}

impl DownloadScratch {
    /// Creates a fresh download area, clearing leftovers from any earlier
    /// aborted run first.
    pub(super) async fn create(scratch_dir: &Path) -> Result<Self> {
        let root = scratch_dir.join("download");
        utils::fs::remove_dir_all(&root).await?;
        utils::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// Where the archive is downloaded to.
    pub(super) fn archive_path(&self) -> PathBuf {
        self.root.join("archive.zip")
    }

    /// Where the archive is unpacked.
    pub(super) fn extraction_dir(&self) -> PathBuf {
        self.root.join("extracted")
    }
}

impl Drop for DownloadScratch {
    fn drop(&mut self) {
        // Best-effort cleanup - ignore errors
        let _ = std::fs::remove_dir_all(&self.root);
    }
}
