//! Outcome types threaded between the lifecycle steps.

use std::path::PathBuf;

/// Result of the pre-commit acquisition step.
///
/// Produced by [`Provisioner::acquire`](super::Provisioner::acquire),
/// consumed by the placement step and by the packaging host's reporting.
#[derive(Clone, Debug)]
pub enum DownloadOutcome {
    /// The executable is already available; no acquisition took place and
    /// no network call was made.
    AlreadyPresent {
        /// Where the executable was found (bundled or installed path)
        path: PathBuf,
    },

    /// The archive was fetched and the executable staged for post-install
    /// placement.
    Downloaded {
        /// Fixed scratch path the executable was staged at
        staged: PathBuf,
        /// Size of the downloaded archive in bytes
        archive_size: u64,
        /// Hex-encoded SHA-256 of the downloaded archive
        archive_digest: String,
    },

    /// The user aborted the transfer. Nothing was staged, the install
    /// directory is untouched, and the partial archive was removed.
    Cancelled,
}

/// How the final executable came to exist.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Provenance {
    /// Shipped next to the installer; ordinary file copy places it.
    Bundled,

    /// Already present in the install directory from an earlier run.
    AlreadyInstalled,

    /// Acquired through the download, extract, place chain this run.
    Downloaded,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bundled => write!(f, "bundled with installer"),
            Self::AlreadyInstalled => write!(f, "already installed"),
            Self::Downloaded => write!(f, "downloaded"),
        }
    }
}

/// Result of the full provisioning chain.
#[derive(Clone, Debug)]
pub struct Provisioned {
    /// Path the executable is guaranteed to exist at
    pub path: PathBuf,

    /// How the executable got there
    pub provenance: Provenance,
}
