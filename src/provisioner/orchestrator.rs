//! Provisioning orchestration across the installer lifecycle points.

use crate::bail;

use super::download::{self, DownloadStatus};
use super::error::{Error, Result};
use super::extract;
use super::outcome::{DownloadOutcome, Provenance, Provisioned};
use super::place;
use super::request::{AcquisitionMode, ProvisioningRequest};
use super::scratch::DownloadScratch;
use std::path::PathBuf;

/// Where the required executable currently is, if anywhere.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Presence {
    /// Shipped next to the installer payload.
    Bundled(PathBuf),

    /// Already in the install directory.
    Installed(PathBuf),

    /// Nowhere local; acquisition would be needed.
    Absent,
}

/// Dependency provisioner.
///
/// Guarantees that the required executable exists at the install path before
/// installation completes. The packaging host invokes it at two lifecycle
/// points: [`acquire`](Self::acquire) immediately before the user commits to
/// the install, and [`place`](Self::place) after ordinary file placement.
/// [`ensure_dependency`](Self::ensure_dependency) runs the whole chain for
/// hosts without distinct phases.
///
/// # Examples
///
/// ```no_run
/// use dep_provisioner::provisioner::{Provisioner, RequestBuilder};
///
/// # async fn example() -> dep_provisioner::provisioner::Result<()> {
/// let request = RequestBuilder::new()
///     .executable_name("ffmpeg.exe")
///     .archive_url("https://example.com/ffmpeg-release-essentials.zip")
///     .source_dir("payload")
///     .dest_dir("install")
///     .build()?;
///
/// let provisioner = Provisioner::new(request);
/// let provisioned = provisioner.ensure_dependency().await?;
/// println!("{} ({})", provisioned.path.display(), provisioned.provenance);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Provisioner {
    request: ProvisioningRequest,
}

impl Provisioner {
    /// Creates a provisioner for one install run.
    pub fn new(request: ProvisioningRequest) -> Self {
        Self { request }
    }

    /// Returns the request this provisioner was created with.
    pub fn request(&self) -> &ProvisioningRequest {
        &self.request
    }

    /// Probes where the executable currently is. No side effects.
    pub async fn check_presence(&self) -> Result<Presence> {
        let bundled = self.request.bundled_path();
        if tokio::fs::try_exists(&bundled).await.unwrap_or(false) {
            return Ok(Presence::Bundled(bundled));
        }

        let installed = self.request.installed_path();
        if tokio::fs::try_exists(&installed).await.unwrap_or(false) {
            return Ok(Presence::Installed(installed));
        }

        Ok(Presence::Absent)
    }

    /// Pre-commit lifecycle hook without progress reporting.
    ///
    /// See [`acquire_with_progress`](Self::acquire_with_progress).
    pub async fn acquire(&self) -> Result<DownloadOutcome> {
        self.acquire_with_progress(|_, _| true).await
    }

    /// Pre-commit lifecycle hook.
    ///
    /// Checks for a bundled copy first; when present, acquisition is skipped
    /// entirely and the ordinary file-copy step is expected to place it.
    /// Otherwise, under [`AcquisitionMode::DownloadOnDemand`], downloads the
    /// archive to scratch, extracts it, and stages the first matching
    /// executable at the fixed scratch path for the post-install hook.
    ///
    /// The progress callback receives `(bytes_done, bytes_total)` and
    /// returns whether to keep downloading; `false` aborts the transfer and
    /// yields [`DownloadOutcome::Cancelled`] with the install directory
    /// untouched. The temporary archive and extraction tree are removed on
    /// every exit path.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingAndBundleRequired`] under
    ///   [`AcquisitionMode::RequireBundled`] with no bundled copy, before
    ///   any network call or filesystem write
    /// - [`Error::DownloadFailed`] / [`Error::DownloadStalled`] for
    ///   transport failures
    /// - [`Error::ExtractionFailed`] / [`Error::ExtractionTimeout`] for
    ///   archive failures
    /// - [`Error::ExecutableNotFoundInArchive`] when the archive has no
    ///   matching entry
    pub async fn acquire_with_progress(
        &self,
        on_progress: impl FnMut(u64, Option<u64>) -> bool,
    ) -> Result<DownloadOutcome> {
        let name = self.request.executable_name();

        match self.check_presence().await? {
            Presence::Bundled(path) => {
                log::info!("✓ {} is bundled with the installer", name);
                return Ok(DownloadOutcome::AlreadyPresent { path });
            }
            Presence::Installed(path) => {
                log::info!("✓ {} is already installed", name);
                return Ok(DownloadOutcome::AlreadyPresent { path });
            }
            Presence::Absent => {}
        }

        if self.request.mode() == AcquisitionMode::RequireBundled {
            return Err(Error::MissingAndBundleRequired {
                name: name.to_string(),
                dir: self.request.source_dir().to_path_buf(),
            });
        }

        log::info!("{} is missing, acquiring from remote archive", name);

        let scratch = DownloadScratch::create(&self.request.scratch_dir()).await?;

        let archive_path = scratch.archive_path();
        let downloaded =
            match download::download(self.request.archive_url(), &archive_path, on_progress)
                .await?
            {
                DownloadStatus::Complete(download) => download,
                DownloadStatus::Cancelled => return Ok(DownloadOutcome::Cancelled),
            };

        extract::extract_archive(&archive_path, &scratch.extraction_dir()).await?;

        let staged =
            extract::stage_executable(&scratch.extraction_dir(), name, &self.request.staged_path())
                .await?;

        Ok(DownloadOutcome::Downloaded {
            staged,
            archive_size: downloaded.size,
            archive_digest: downloaded.digest,
        })
    }

    /// Post-install lifecycle hook.
    ///
    /// Copies the staged executable into the install directory, only when a
    /// staged file exists and the destination does not. Returns the placed
    /// (or pre-existing) path, or `None` when there was nothing to place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Placement`] when the install directory cannot be
    /// written.
    pub async fn place(&self) -> Result<Option<PathBuf>> {
        place::place_executable(&self.request.staged_path(), &self.request.installed_path()).await
    }

    /// Full provisioning chain without progress reporting.
    pub async fn ensure_dependency(&self) -> Result<Provisioned> {
        self.ensure_dependency_with_progress(|_, _| true).await
    }

    /// Full provisioning chain: acquire, then place.
    ///
    /// # Errors
    ///
    /// All errors of [`acquire_with_progress`](Self::acquire_with_progress)
    /// and [`place`](Self::place); a cancelled download surfaces as
    /// [`Error::DownloadCancelled`] because the guarantee cannot be met.
    pub async fn ensure_dependency_with_progress(
        &self,
        on_progress: impl FnMut(u64, Option<u64>) -> bool,
    ) -> Result<Provisioned> {
        match self.acquire_with_progress(on_progress).await? {
            DownloadOutcome::AlreadyPresent { path } => {
                let provenance = if path == self.request.installed_path() {
                    Provenance::AlreadyInstalled
                } else {
                    Provenance::Bundled
                };
                Ok(Provisioned { path, provenance })
            }
            DownloadOutcome::Downloaded { staged, .. } => {
                let Some(placed) = self.place().await? else {
                    bail!(
                        "staged executable {} vanished before placement",
                        staged.display()
                    );
                };
                Ok(Provisioned {
                    path: placed,
                    provenance: Provenance::Downloaded,
                })
            }
            DownloadOutcome::Cancelled => Err(Error::DownloadCancelled),
        }
    }
}
