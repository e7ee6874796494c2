//! Zip archive extraction and executable staging.
//!
//! Extraction is a first-class library call with typed errors, not a
//! shell-out: a corrupt archive or an unwritable entry surfaces as
//! [`Error::ExtractionFailed`] instead of a process exit code.

use super::error::{Error, ErrorExt, Result};
use super::utils;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Upper bound on a single archive extraction.
const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(120);

/// Extracts a zip archive into a destination directory.
///
/// Returns the extracted regular-file paths in central-directory order.
/// Entry paths that escape the destination directory are skipped.
///
/// # Errors
///
/// Returns [`Error::ExtractionFailed`] when the archive is corrupt or an
/// entry cannot be written, and [`Error::ExtractionTimeout`] when the work
/// exceeds the allotted window.
pub async fn extract_archive(archive_path: &Path, dest_dir: &Path) -> Result<Vec<PathBuf>> {
    log::info!("Extracting {}", archive_path.display());

    utils::fs::create_dir_all(dest_dir).await?;

    let archive = archive_path.to_path_buf();
    let dest = dest_dir.to_path_buf();

    let task = tokio::task::spawn_blocking(move || extract_blocking(&archive, &dest));

    let extracted = match tokio::time::timeout(EXTRACTION_TIMEOUT, task).await {
        Ok(joined) => joined.map_err(|e| {
            Error::GenericError(format!("archive extraction task panicked: {e}"))
        })??,
        Err(_) => {
            return Err(Error::ExtractionTimeout {
                archive: archive_path.to_path_buf(),
                seconds: EXTRACTION_TIMEOUT.as_secs(),
            });
        }
    };

    log::debug!("Extracted {} entries", extracted.len());
    Ok(extracted)
}

fn extract_blocking(archive_path: &Path, dest_dir: &Path) -> Result<Vec<PathBuf>> {
    let file = File::open(archive_path).fs_context("opening archive", archive_path)?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| extraction_error(archive_path, &e.to_string()))?;

    let mut extracted = Vec::new();

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| extraction_error(archive_path, &e.to_string()))?;

        let Some(relative) = entry.enclosed_name() else {
            log::warn!("Skipping archive entry with unsafe path: {}", entry.name());
            continue;
        };
        let out_path = dest_dir.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path)
                .fs_context("creating extracted directory", &out_path)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent)
                .fs_context("creating extracted directory", parent)?;
        }

        let mut out_file =
            File::create(&out_path).fs_context("creating extracted file", &out_path)?;
        io::copy(&mut entry, &mut out_file)
            .map_err(|e| extraction_error(archive_path, &e.to_string()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                std::fs::set_permissions(&out_path, std::fs::Permissions::from_mode(mode))
                    .fs_context("restoring entry permissions", &out_path)?;
            }
        }

        extracted.push(out_path);
    }

    Ok(extracted)
}

/// Searches the extraction tree recursively for the required executable and
/// copies the first match to the fixed scratch path.
///
/// The match is name-based only: the first regular file whose file name
/// equals `name` in deterministic traversal order wins, at any depth. No
/// content verification or hashing is applied.
///
/// # Errors
///
/// Returns [`Error::ExecutableNotFoundInArchive`] when no entry in the tree
/// carries the required file name.
pub async fn stage_executable(
    extraction_dir: &Path,
    name: &str,
    staged_path: &Path,
) -> Result<PathBuf> {
    let root = extraction_dir.to_path_buf();
    let wanted = name.to_string();

    let found = tokio::task::spawn_blocking(move || find_first_match(&root, &wanted))
        .await
        .map_err(|e| Error::GenericError(format!("executable search task panicked: {e}")))?;

    let Some(source) = found else {
        return Err(Error::ExecutableNotFoundInArchive {
            name: name.to_string(),
        });
    };

    log::debug!("Found {} at {}", name, source.display());

    utils::fs::copy_file(&source, staged_path).await?;
    utils::fs::mark_executable(staged_path).await?;

    log::info!("✓ Staged {} at {}", name, staged_path.display());
    Ok(staged_path.to_path_buf())
}

/// First regular file named `wanted`, walking depth-first with file-name
/// ordering so the tie-break is stable across platforms.
fn find_first_match(root: &Path, wanted: &str) -> Option<PathBuf> {
    walkdir::WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .find(|e| e.file_name().to_str() == Some(wanted))
        .map(|e| e.into_path())
}

fn extraction_error(archive: &Path, reason: &str) -> Error {
    Error::ExtractionFailed {
        archive: archive.to_path_buf(),
        reason: reason.to_string(),
    }
}
