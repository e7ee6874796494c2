//! Top-level error types for the packaging host binary.
//!
//! The provisioner library has its own typed errors in
//! [`crate::provisioner::error`]; this module wraps them together with the
//! CLI-surface failures so `main` reports a single message and exits.

use thiserror::Error;

/// Result type alias for host operations
pub type Result<T> = std::result::Result<T, HostError>;

/// Main error type for the packaging host
#[derive(Error, Debug)]
pub enum HostError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Provisioning errors
    #[error("{0}")]
    Provision(#[from] crate::provisioner::Error),

    /// Generic errors from anyhow
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// A required path could not be resolved
    #[error("Cannot resolve {what}: {reason}")]
    PathResolution {
        /// What was being resolved
        what: String,
        /// Reason for the error
        reason: String,
    },
}
