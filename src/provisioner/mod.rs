//! Runtime dependency provisioning.
//!
//! Guarantees that a required external executable exists at a target install
//! path before installation completes, downloading and extracting it on
//! demand when it is not bundled with the installer.
//!
//! # Lifecycle
//!
//! The packaging host drives the provisioner at two points:
//!
//! 1. **Pre-commit** ([`Provisioner::acquire`]) - right before the user
//!    confirms the install: check for a bundled copy, otherwise download the
//!    archive with visible, cancellable progress and stage the extracted
//!    executable in scratch space.
//! 2. **Post-install** ([`Provisioner::place`]) - after ordinary file
//!    placement: copy the staged executable into the install directory,
//!    never overwriting an existing one.
//!
//! [`Provisioner::ensure_dependency`] runs both in sequence.
//!
//! # Module Organization
//!
//! - [`request`] - immutable per-run request and acquisition policy
//! - [`manifest`] - declarative TOML configuration surface
//! - [`download`] - streaming HTTP fetch with progress and cancellation
//! - [`extract`] - zip extraction and recursive executable search
//! - [`place`] - idempotent placement into the install directory
//! - [`error`] - typed failures, one human-readable message each

pub mod error;

mod download;
mod extract;
mod manifest;
mod orchestrator;
mod outcome;
mod place;
mod request;
mod scratch;
mod utils;

pub use download::{Download, DownloadStatus, download};
pub use error::{Context, Error, ErrorExt, Result};
pub use extract::{extract_archive, stage_executable};
pub use manifest::InstallManifest;
pub use orchestrator::{Presence, Provisioner};
pub use outcome::{DownloadOutcome, Provenance, Provisioned};
pub use place::place_executable;
pub use request::{AcquisitionMode, ProvisioningRequest, RequestBuilder};
