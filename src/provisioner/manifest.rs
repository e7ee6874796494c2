//! Declarative install manifest.
//!
//! The manifest carries exactly the configuration surface the packaging host
//! exposes: which executable is required, where its archive lives, and which
//! acquisition policy applies. Directories are supplied by the host at run
//! time, not persisted in the manifest.

use super::error::{Error, ErrorExt, Result};
use super::request::{AcquisitionMode, ProvisioningRequest, RequestBuilder};
use std::path::Path;

/// Parsed `provision.toml`.
///
/// # Format
///
/// ```toml
/// executable = "ffmpeg.exe"
/// archive_url = "https://www.gyan.dev/ffmpeg/builds/ffmpeg-release-essentials.zip"
/// mode = "download-on-demand"
/// ```
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstallManifest {
    /// File name of the required executable
    pub executable: String,

    /// HTTP(S) URL of the zip archive containing the executable
    pub archive_url: String,

    /// Acquisition policy; defaults to download-on-demand
    #[serde(default)]
    pub mode: AcquisitionMode,
}

impl InstallManifest {
    /// Loads and parses a manifest file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when the TOML does not match the
    /// manifest schema.
    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .fs_context("reading install manifest", path)?;
        Self::parse(&text)
            .map_err(|e| Error::Configuration(format!("manifest {}: {e}", path.display())))
    }

    /// Parses manifest TOML text.
    pub fn parse(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Combines the manifest with host-supplied directories into a
    /// validated request.
    pub fn into_request(
        self,
        source_dir: &Path,
        temp_dir: &Path,
        dest_dir: &Path,
    ) -> Result<ProvisioningRequest> {
        RequestBuilder::new()
            .executable_name(self.executable)
            .archive_url(self.archive_url)
            .mode(self.mode)
            .source_dir(source_dir)
            .temp_dir(temp_dir)
            .dest_dir(dest_dir)
            .build()
    }
}
