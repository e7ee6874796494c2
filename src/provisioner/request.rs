//! Provisioning request construction and validation.

use super::error::{Context, Error, Result};
use std::path::{Path, PathBuf};

/// Acquisition policy for a missing executable.
///
/// The two variants mirror the two installer policies seen in the field:
/// fall back to a network download, or refuse to install without a bundled
/// copy.
///
/// # Configuration
///
/// ```toml
/// mode = "download-on-demand"  # or "require-bundled"
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AcquisitionMode {
    /// Use the bundled copy when present, otherwise download the archive.
    #[default]
    DownloadOnDemand,

    /// The executable must ship next to the installer; no network fallback.
    RequireBundled,
}

/// Immutable description of one provisioning run.
///
/// Created once per install run via [`RequestBuilder`], then threaded through
/// the lifecycle hooks. Nothing in here changes after construction.
///
/// # Examples
///
/// ```no_run
/// use dep_provisioner::provisioner::{AcquisitionMode, RequestBuilder};
///
/// # fn example() -> dep_provisioner::provisioner::Result<()> {
/// let request = RequestBuilder::new()
///     .executable_name("ffmpeg.exe")
///     .archive_url("https://example.com/ffmpeg-release-essentials.zip")
///     .source_dir("C:/installer-payload")
///     .dest_dir("C:/Program Files/MyApp")
///     .mode(AcquisitionMode::DownloadOnDemand)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct ProvisioningRequest {
    executable_name: String,
    source_dir: PathBuf,
    archive_url: String,
    temp_dir: PathBuf,
    dest_dir: PathBuf,
    mode: AcquisitionMode,
}

impl ProvisioningRequest {
    /// Returns the required executable's file name.
    pub fn executable_name(&self) -> &str {
        &self.executable_name
    }

    /// Returns the installer's own source directory (bundled payload).
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Returns the remote archive URL.
    pub fn archive_url(&self) -> &str {
        &self.archive_url
    }

    /// Returns the host-supplied temporary directory.
    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// Returns the application install directory.
    pub fn dest_dir(&self) -> &Path {
        &self.dest_dir
    }

    /// Returns the acquisition policy.
    pub fn mode(&self) -> AcquisitionMode {
        self.mode
    }

    /// Path the executable would occupy if bundled with the installer.
    pub fn bundled_path(&self) -> PathBuf {
        self.source_dir.join(&self.executable_name)
    }

    /// Path the executable occupies once installed.
    pub fn installed_path(&self) -> PathBuf {
        self.dest_dir.join(&self.executable_name)
    }

    /// Root of this run's scratch area under the temporary directory.
    ///
    /// Survives between the pre-commit and post-install lifecycle points so
    /// a staged executable can be handed from one hook to the other.
    pub fn scratch_dir(&self) -> PathBuf {
        self.temp_dir.join("dep-provisioner")
    }

    /// Fixed scratch path the extracted executable is staged at.
    pub fn staged_path(&self) -> PathBuf {
        self.scratch_dir().join(&self.executable_name)
    }
}

/// Builder for constructing a validated [`ProvisioningRequest`].
///
/// Validation happens in [`build`](RequestBuilder::build), before any I/O:
/// the executable name must be a bare, non-empty file name and the archive
/// URL must be well-formed HTTP(S).
#[derive(Default)]
pub struct RequestBuilder {
    executable_name: Option<String>,
    source_dir: Option<PathBuf>,
    archive_url: Option<String>,
    temp_dir: Option<PathBuf>,
    dest_dir: Option<PathBuf>,
    mode: AcquisitionMode,
}

impl RequestBuilder {
    /// Creates a new request builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the required executable's file name.
    ///
    /// # Required
    pub fn executable_name(mut self, name: impl Into<String>) -> Self {
        self.executable_name = Some(name.into());
        self
    }

    /// Sets the installer's own source directory.
    ///
    /// # Required
    pub fn source_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.source_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Sets the remote archive URL.
    ///
    /// # Required
    pub fn archive_url(mut self, url: impl Into<String>) -> Self {
        self.archive_url = Some(url.into());
        self
    }

    /// Sets the scratch directory.
    ///
    /// Default: the system temporary directory.
    pub fn temp_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.temp_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Sets the application install directory.
    ///
    /// # Required
    pub fn dest_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.dest_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Sets the acquisition policy.
    ///
    /// Default: [`AcquisitionMode::DownloadOnDemand`]
    pub fn mode(mut self, mode: AcquisitionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Builds the request.
    ///
    /// # Errors
    ///
    /// Returns an error when a required field is missing, and
    /// [`Error::Configuration`] when a field fails validation. No I/O is
    /// performed here.
    pub fn build(self) -> Result<ProvisioningRequest> {
        let executable_name = self
            .executable_name
            .context("executable_name is required")?;
        validate_executable_name(&executable_name)?;

        let archive_url = self.archive_url.context("archive_url is required")?;
        validate_archive_url(&archive_url)?;

        Ok(ProvisioningRequest {
            executable_name,
            source_dir: self.source_dir.context("source_dir is required")?,
            archive_url,
            temp_dir: self.temp_dir.unwrap_or_else(std::env::temp_dir),
            dest_dir: self.dest_dir.context("dest_dir is required")?,
            mode: self.mode,
        })
    }
}

/// The executable name must be a bare file name: non-empty, no separators,
/// no traversal components.
fn validate_executable_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Configuration(
            "executable name must not be empty".into(),
        ));
    }

    if Path::new(name).file_name().and_then(|f| f.to_str()) != Some(name) {
        return Err(Error::Configuration(format!(
            "executable name `{name}` must be a bare file name"
        )));
    }

    Ok(())
}

/// The archive URL must parse and use an http or https scheme.
fn validate_archive_url(raw: &str) -> Result<()> {
    let url = url::Url::parse(raw)
        .map_err(|e| Error::Configuration(format!("archive URL `{raw}` is malformed: {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(Error::Configuration(format!(
            "archive URL `{raw}` uses unsupported scheme `{scheme}`"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> RequestBuilder {
        RequestBuilder::new()
            .executable_name("ffmpeg.exe")
            .archive_url("https://example.com/ffmpeg.zip")
            .source_dir("/payload")
            .dest_dir("/opt/app")
    }

    #[test]
    fn builds_with_defaults() {
        let request = builder().build().unwrap();
        assert_eq!(request.mode(), AcquisitionMode::DownloadOnDemand);
        assert_eq!(request.bundled_path(), Path::new("/payload/ffmpeg.exe"));
        assert_eq!(request.installed_path(), Path::new("/opt/app/ffmpeg.exe"));
        assert!(request.staged_path().ends_with("dep-provisioner/ffmpeg.exe"));
    }

    #[test]
    fn rejects_empty_executable_name() {
        let err = builder().executable_name("").build().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn rejects_path_bearing_executable_name() {
        let err = builder()
            .executable_name("bin/ffmpeg.exe")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn rejects_non_http_archive_url() {
        let err = builder()
            .archive_url("ftp://example.com/ffmpeg.zip")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn rejects_malformed_archive_url() {
        let err = builder().archive_url("not a url").build().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
