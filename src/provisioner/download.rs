//! Archive download with progress reporting and cancellation.
//!
//! Streams the response body chunk by chunk so the packaging host can render
//! byte-level progress and abort mid-transfer. A cancelled or failed
//! transfer never leaves a partial file behind.

use super::error::{Context, Error, ErrorExt, Result};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Connection establishment limit.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Inactivity window per body chunk. The transfer as a whole has no hard
/// limit; a healthy stream just has to keep producing data.
const CHUNK_TIMEOUT: Duration = Duration::from_secs(30);

/// A completed transfer.
#[derive(Clone, Debug)]
pub struct Download {
    /// Total bytes written to the local path
    pub size: u64,

    /// Hex-encoded SHA-256 of the downloaded bytes
    pub digest: String,
}

/// Outcome of a single transfer attempt.
#[derive(Clone, Debug)]
pub enum DownloadStatus {
    /// Body fully written to the local path.
    Complete(Download),

    /// The progress callback asked to stop; the partial file was removed.
    Cancelled,
}

/// Downloads a file from a URL to a local path.
///
/// The progress callback receives `(bytes_done, bytes_total)` after every
/// chunk, where `bytes_total` is `None` when the server sends no
/// Content-Length. Returning `false` cancels the transfer.
///
/// # Errors
///
/// Returns [`Error::DownloadFailed`] for transport failures and non-success
/// HTTP statuses, and [`Error::DownloadStalled`] when no data arrives within
/// the inactivity window. On any failure the partial local file is removed.
pub async fn download(
    url: &str,
    local_path: &Path,
    mut on_progress: impl FnMut(u64, Option<u64>) -> bool,
) -> Result<DownloadStatus> {
    log::info!("Downloading {}", url);

    let client = reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .context("building HTTP client")?;

    let mut response = client
        .get(url)
        .send()
        .await
        .map_err(|e| transport_error(url, &e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(transport_error(url, &format!("HTTP status {status}")));
    }

    let total = response.content_length();

    if let Some(parent) = local_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .fs_context("creating download directory", parent)?;
    }
    let mut file = tokio::fs::File::create(local_path)
        .await
        .fs_context("creating download file", local_path)?;

    let mut hasher = Sha256::new();
    let mut done: u64 = 0;

    if !on_progress(0, total) {
        return cancel(file, local_path).await;
    }

    loop {
        let chunk = match tokio::time::timeout(CHUNK_TIMEOUT, response.chunk()).await {
            Ok(Ok(Some(chunk))) => chunk,
            Ok(Ok(None)) => break,
            Ok(Err(e)) => {
                drop(file);
                super::utils::fs::remove_file(local_path).await?;
                return Err(transport_error(url, &e.to_string()));
            }
            Err(_) => {
                drop(file);
                super::utils::fs::remove_file(local_path).await?;
                return Err(Error::DownloadStalled {
                    url: url.to_string(),
                    seconds: CHUNK_TIMEOUT.as_secs(),
                });
            }
        };

        hasher.update(&chunk);
        file.write_all(&chunk)
            .await
            .fs_context("writing download chunk", local_path)?;
        done += chunk.len() as u64;

        if !on_progress(done, total) {
            return cancel(file, local_path).await;
        }
    }

    file.flush()
        .await
        .fs_context("flushing download file", local_path)?;
    drop(file);

    let digest = format!("{:x}", hasher.finalize());
    log::debug!("Downloaded {} bytes, sha256 {}", done, digest);

    Ok(DownloadStatus::Complete(Download { size: done, digest }))
}

/// Drop the open handle and remove the partial file before reporting
/// cancellation; the install directory is never touched.
async fn cancel(file: tokio::fs::File, local_path: &Path) -> Result<DownloadStatus> {
    drop(file);
    super::utils::fs::remove_file(local_path).await?;
    log::warn!("Download cancelled, removed partial file");
    Ok(DownloadStatus::Cancelled)
}

fn transport_error(url: &str, reason: &str) -> Error {
    Error::DownloadFailed {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}
