//! Install-time runtime dependency provisioner
//!
//! This library guarantees that a required external executable (for example
//! `ffmpeg.exe`) is present in an application's install directory before
//! installation completes:
//! - a copy bundled next to the installer is used as-is,
//! - otherwise the configured archive is downloaded with cancellable
//!   progress, the executable is extracted and staged, and a later
//!   lifecycle hook places it without ever overwriting an existing install.
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod cli;
pub mod error;
pub mod provisioner;

// Re-export commonly used types
pub use error::{CliError, HostError, Result};
