//! Error types for provisioning operations.
//!
//! Every failure surfaces as a single human-readable message so the
//! packaging host can show it to the installing user and abort the install.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for provisioning operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for all provisioning operations
#[derive(Error, Debug)]
pub enum Error {
    /// Request rejected before any I/O (bad URL, bad executable name).
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Strict policy: the executable must ship next to the installer.
    #[error(
        "required executable `{name}` is not bundled in {dir} - re-download the installer package"
    )]
    MissingAndBundleRequired {
        /// Executable file name that was expected
        name: String,
        /// Source directory that was searched
        dir: PathBuf,
    },

    /// User aborted the transfer from the progress dialog.
    #[error("download cancelled by user")]
    DownloadCancelled,

    /// Transport-level download failure (DNS, connect, HTTP status, stream).
    #[error("download of {url} failed: {reason}")]
    DownloadFailed {
        /// URL that was being fetched
        url: String,
        /// Human-readable transport diagnostic
        reason: String,
    },

    /// No data arrived within the per-chunk inactivity window.
    #[error("download of {url} stalled: no data received for {seconds}s")]
    DownloadStalled {
        /// URL that was being fetched
        url: String,
        /// Inactivity window that elapsed
        seconds: u64,
    },

    /// Archive downloaded fine but contains no matching file anywhere.
    #[error("archive contains no file named `{name}`")]
    ExecutableNotFoundInArchive {
        /// Executable file name that was searched for
        name: String,
    },

    /// Archive is corrupt or an entry could not be written out.
    #[error("failed to extract {archive}: {reason}")]
    ExtractionFailed {
        /// Archive that was being extracted
        archive: PathBuf,
        /// Underlying extraction diagnostic
        reason: String,
    },

    /// Extraction did not finish within the allotted window.
    #[error("extraction of {archive} did not finish within {seconds}s")]
    ExtractionTimeout {
        /// Archive that was being extracted
        archive: PathBuf,
        /// Timeout that elapsed
        seconds: u64,
    },

    /// Final copy into the install directory failed.
    #[error("failed to place executable at {dest}: {reason}")]
    Placement {
        /// Destination path that could not be written
        dest: PathBuf,
        /// Underlying filesystem diagnostic
        reason: String,
    },

    /// Filesystem operation failed with path context attached.
    #[error("{context} ({path}): {source}")]
    FsError {
        /// What was being attempted
        context: String,
        /// Path involved in the operation
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// IO errors without additional context
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic errors
    #[error("{0}")]
    GenericError(String),
}

/// Return early with a [`crate::provisioner::Error::GenericError`] built
/// from a format string.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::provisioner::Error::GenericError(format!($($arg)*)).into())
    };
}

/// Extension trait attaching operation + path context to IO results.
pub trait ErrorExt<T> {
    /// Convert an IO error into [`Error::FsError`] with context.
    fn fs_context(self, context: &str, path: &Path) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &str, path: &Path) -> Result<T> {
        self.map_err(|source| Error::FsError {
            context: context.to_string(),
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Extension trait attaching a message to options and fallible results.
pub trait Context<T> {
    /// Wrap the failure in a [`Error::GenericError`] prefixed with `msg`.
    fn context(self, msg: &str) -> Result<T>;
}

impl<T> Context<T> for Option<T> {
    fn context(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| Error::GenericError(msg.to_string()))
    }
}

impl<T, E: std::fmt::Display> Context<T> for std::result::Result<T, E> {
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| Error::GenericError(format!("{msg}: {e}")))
    }
}
