//! Command line interface for the packaging host.
//!
//! Wires the provisioner's lifecycle hooks to subcommands, renders download
//! progress, and maps Ctrl-C to the cancellation contract.

mod args;
mod progress;

pub use args::{Args, Command};
pub use progress::format_bytes;

use crate::error::{CliError, Result};
use crate::provisioner::{
    AcquisitionMode, DownloadOutcome, Error as ProvisionError, InstallManifest, Presence,
    Provisioner,
};
use std::path::PathBuf;
use std::sync::atomic::Ordering;

/// Exit code reported when the user cancels the download. Distinct from
/// plain failures so a wrapping installer can tell "user backed out" from
/// "something broke".
const EXIT_CANCELLED: i32 = 3;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();

    let source_dir = resolve_source_dir(args.source_dir.clone())?;
    let temp_dir = args.temp_dir.clone().unwrap_or_else(std::env::temp_dir);

    let manifest = InstallManifest::load(&args.manifest).await?;
    let request = manifest.into_request(&source_dir, &temp_dir, &args.dest_dir)?;
    let provisioner = Provisioner::new(request);

    match args.command {
        Command::Check => check(&provisioner).await,
        Command::Acquire => acquire(&provisioner).await,
        Command::Place => place(&provisioner).await,
        Command::Ensure => ensure(&provisioner).await,
    }
}

/// Presence probe; in require-bundled mode an absent executable fails the
/// run with the descriptive presence error.
async fn check(provisioner: &Provisioner) -> Result<i32> {
    let request = provisioner.request();
    let name = request.executable_name();

    match provisioner.check_presence().await? {
        Presence::Bundled(path) => println!("✓ {name} bundled at {}", path.display()),
        Presence::Installed(path) => println!("✓ {name} installed at {}", path.display()),
        Presence::Absent => {
            if request.mode() == AcquisitionMode::RequireBundled {
                return Err(ProvisionError::MissingAndBundleRequired {
                    name: name.to_string(),
                    dir: request.source_dir().to_path_buf(),
                }
                .into());
            }
            println!("{name} is absent and will be downloaded during install");
        }
    }

    Ok(0)
}

/// Pre-commit hook with console progress and Ctrl-C cancellation.
async fn acquire(provisioner: &Provisioner) -> Result<i32> {
    let name = provisioner.request().executable_name().to_string();

    let cancelled = progress::cancellation_flag();
    let mut line = progress::ProgressLine::new();

    let outcome = provisioner
        .acquire_with_progress(|done, total| {
            line.update(done, total);
            !cancelled.load(Ordering::SeqCst)
        })
        .await;
    line.finish();

    match outcome? {
        DownloadOutcome::AlreadyPresent { path } => {
            println!("✓ {name} already present at {}", path.display());
        }
        DownloadOutcome::Downloaded {
            staged,
            archive_size,
            archive_digest,
        } => {
            println!(
                "✓ {name} downloaded ({}) and staged at {}",
                format_bytes(archive_size),
                staged.display()
            );
            log::info!("Archive sha256: {archive_digest}");
        }
        DownloadOutcome::Cancelled => {
            println!("Download cancelled; install aborted");
            return Ok(EXIT_CANCELLED);
        }
    }

    Ok(0)
}

/// Post-install hook.
async fn place(provisioner: &Provisioner) -> Result<i32> {
    let name = provisioner.request().executable_name().to_string();

    match provisioner.place().await? {
        Some(path) => println!("✓ {name} in place at {}", path.display()),
        None => println!("Nothing staged for {name}; placement skipped"),
    }

    Ok(0)
}

/// Full chain with console progress and Ctrl-C cancellation.
async fn ensure(provisioner: &Provisioner) -> Result<i32> {
    let name = provisioner.request().executable_name().to_string();

    let cancelled = progress::cancellation_flag();
    let mut line = progress::ProgressLine::new();

    let outcome = provisioner
        .ensure_dependency_with_progress(|done, total| {
            line.update(done, total);
            !cancelled.load(Ordering::SeqCst)
        })
        .await;
    line.finish();

    match outcome {
        Ok(provisioned) => {
            println!(
                "✓ {name} present at {} ({})",
                provisioned.path.display(),
                provisioned.provenance
            );
            Ok(0)
        }
        Err(ProvisionError::DownloadCancelled) => {
            println!("Download cancelled; install aborted");
            Ok(EXIT_CANCELLED)
        }
        Err(e) => Err(e.into()),
    }
}

/// The bundled copy is looked for next to the installer binary unless the
/// host points elsewhere.
fn resolve_source_dir(flag: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir);
    }

    let exe = std::env::current_exe().map_err(|e| CliError::PathResolution {
        what: "installer source directory".to_string(),
        reason: e.to_string(),
    })?;

    match exe.parent() {
        Some(parent) => Ok(parent.to_path_buf()),
        None => Err(CliError::PathResolution {
            what: "installer source directory".to_string(),
            reason: "installer binary path has no parent directory".to_string(),
        }
        .into()),
    }
}
