//! Idempotent post-install placement.

use super::error::{Error, Result};
use super::utils;
use std::path::{Path, PathBuf};

/// Copies the staged executable into the install directory.
///
/// Placement is deliberately conservative:
///
/// - an existing destination file is never overwritten; the call is a no-op
///   returning the existing path;
/// - a missing staged file is a legitimate skip (the bundled copy was placed
///   by the ordinary file-copy step), returning `None`;
/// - the copy goes through a partial file that is renamed into place, so a
///   failure mid-write leaves no half-written executable at the destination.
///
/// # Errors
///
/// Returns [`Error::Placement`] when the install directory cannot be written.
pub async fn place_executable(staged: &Path, dest: &Path) -> Result<Option<PathBuf>> {
    if dest.is_file() {
        log::debug!("{} already installed, leaving it untouched", dest.display());
        return Ok(Some(dest.to_path_buf()));
    }

    if !staged.is_file() {
        log::debug!("Nothing staged at {}, skipping placement", staged.display());
        return Ok(None);
    }

    let dest_dir = dest
        .parent()
        .ok_or_else(|| placement_error(dest, "destination has no parent directory"))?;
    tokio::fs::create_dir_all(dest_dir)
        .await
        .map_err(|e| placement_error(dest, &e.to_string()))?;

    let partial = partial_path(dest);
    if let Err(e) = tokio::fs::copy(staged, &partial).await {
        let _ = utils::fs::remove_file(&partial).await;
        return Err(placement_error(dest, &e.to_string()));
    }

    if let Err(e) = tokio::fs::rename(&partial, dest).await {
        let _ = utils::fs::remove_file(&partial).await;
        return Err(placement_error(dest, &e.to_string()));
    }

    utils::fs::mark_executable(dest).await?;

    log::info!("✓ Placed {}", dest.display());
    Ok(Some(dest.to_path_buf()))
}

fn partial_path(dest: &Path) -> PathBuf {
    let file_name = dest.file_name().unwrap_or_default().to_string_lossy();
    dest.with_file_name(format!(".{file_name}.partial"))
}

fn placement_error(dest: &Path, reason: &str) -> Error {
    Error::Placement {
        dest: dest.to_path_buf(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn places_staged_file_once() {
        let dir = tempfile::tempdir().unwrap();
        let staged = dir.path().join("staged/ffmpeg.exe");
        tokio::fs::create_dir_all(staged.parent().unwrap())
            .await
            .unwrap();
        tokio::fs::write(&staged, b"fresh").await.unwrap();

        let dest = dir.path().join("install/ffmpeg.exe");
        let placed = place_executable(&staged, &dest).await.unwrap();

        assert_eq!(placed, Some(dest.clone()));
        assert_eq!(tokio::fs::read(&dest).await.unwrap(), b"fresh");
    }

    #[tokio::test]
    async fn never_overwrites_existing_destination() {
        let dir = tempfile::tempdir().unwrap();
        let staged = dir.path().join("ffmpeg.exe.staged");
        tokio::fs::write(&staged, b"new bytes").await.unwrap();

        let dest = dir.path().join("ffmpeg.exe");
        tokio::fs::write(&dest, b"original").await.unwrap();

        let placed = place_executable(&staged, &dest).await.unwrap();

        assert_eq!(placed, Some(dest.clone()));
        assert_eq!(tokio::fs::read(&dest).await.unwrap(), b"original");
    }

    #[tokio::test]
    async fn missing_staged_file_is_a_skip() {
        let dir = tempfile::tempdir().unwrap();
        let placed = place_executable(
            &dir.path().join("absent.staged"),
            &dir.path().join("ffmpeg.exe"),
        )
        .await
        .unwrap();
        assert_eq!(placed, None);
        assert!(!dir.path().join("ffmpeg.exe").exists());
    }

    #[tokio::test]
    async fn leaves_no_partial_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let staged = dir.path().join("staged.bin");
        tokio::fs::write(&staged, b"data").await.unwrap();

        let dest = dir.path().join("out/tool.exe");
        place_executable(&staged, &dest).await.unwrap();

        assert!(!dest.parent().unwrap().join(".tool.exe.partial").exists());
    }
}
