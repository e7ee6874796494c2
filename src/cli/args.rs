//! Command line argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Install-time runtime dependency provisioner
#[derive(Parser, Debug)]
#[command(
    name = "dep-provisioner",
    version,
    about = "Ensures a required executable is present in the install directory",
    long_about = "Ensures a required external executable is present in the install directory, \
downloading and extracting it from a remote archive when it is missing.

Reads a declarative manifest (provision.toml) naming the executable, its archive URL, \
and the acquisition policy, then runs the requested installer lifecycle hook.

Usage:
  dep-provisioner --dest-dir 'C:/Program Files/MyApp' check
  dep-provisioner --dest-dir 'C:/Program Files/MyApp' acquire
  dep-provisioner --dest-dir 'C:/Program Files/MyApp' ensure

Exit code 0 after `ensure` guarantees the executable exists in the install directory."
)]
pub struct Args {
    /// Path to the declarative install manifest
    #[arg(short, long, value_name = "PATH", default_value = "provision.toml")]
    pub manifest: PathBuf,

    /// Installer payload directory holding the optional bundled copy
    ///
    /// Default: the directory this binary was launched from.
    #[arg(long, value_name = "DIR")]
    pub source_dir: Option<PathBuf>,

    /// Scratch directory for download and extraction
    ///
    /// Default: the system temporary directory.
    #[arg(long, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Application install directory
    #[arg(short, long, value_name = "DIR")]
    pub dest_dir: PathBuf,

    /// Installer lifecycle hook to run
    #[command(subcommand)]
    pub command: Command,
}

/// The provisioner's installer lifecycle hooks.
#[derive(Subcommand, Clone, Copy, Debug, Eq, PartialEq)]
pub enum Command {
    /// Report where the executable currently is; no side effects
    Check,

    /// Pre-commit hook: download and stage the executable if missing
    Acquire,

    /// Post-install hook: copy the staged executable into the install dir
    Place,

    /// Full chain: acquire, then place
    Ensure,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
