//! End-to-end provisioning behavior against a mock archive server.

use dep_provisioner::provisioner::{
    AcquisitionMode, DownloadOutcome, Error, Provenance, Provisioner, ProvisioningRequest,
    RequestBuilder,
};
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::PathBuf;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Build a zip archive in memory with the given files.
/// Each entry is (path_in_zip, content).
fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();

    for (entry_path, content) in entries {
        writer.start_file(*entry_path, options).unwrap();
        writer.write_all(content).unwrap();
    }

    writer.finish().unwrap().into_inner()
}

struct InstallDirs {
    _root: tempfile::TempDir,
    source: PathBuf,
    temp: PathBuf,
    dest: PathBuf,
}

fn install_dirs() -> InstallDirs {
    let root = tempfile::tempdir().unwrap();
    let source = root.path().join("payload");
    let temp = root.path().join("tmp");
    let dest = root.path().join("install");
    for dir in [&source, &temp, &dest] {
        std::fs::create_dir_all(dir).unwrap();
    }
    InstallDirs {
        _root: root,
        source,
        temp,
        dest,
    }
}

fn request_for(dirs: &InstallDirs, url: &str, mode: AcquisitionMode) -> ProvisioningRequest {
    RequestBuilder::new()
        .executable_name("ffmpeg.exe")
        .archive_url(url)
        .source_dir(&dirs.source)
        .temp_dir(&dirs.temp)
        .dest_dir(&dirs.dest)
        .mode(mode)
        .build()
        .unwrap()
}

async fn serve_archive(body: Vec<u8>) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ffmpeg.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/zip"))
        .mount(&server)
        .await;
    server
}

fn archive_url(server: &MockServer) -> String {
    format!("{}/ffmpeg.zip", server.uri())
}

#[tokio::test]
async fn bundled_executable_skips_network_entirely() {
    let dirs = install_dirs();
    std::fs::write(dirs.source.join("ffmpeg.exe"), b"bundled build").unwrap();

    let server = MockServer::start().await;
    let provisioner = Provisioner::new(request_for(
        &dirs,
        &archive_url(&server),
        AcquisitionMode::DownloadOnDemand,
    ));

    let provisioned = provisioner.ensure_dependency().await.unwrap();

    assert_eq!(provisioned.provenance, Provenance::Bundled);
    assert_eq!(provisioned.path, dirs.source.join("ffmpeg.exe"));
    assert!(server.received_requests().await.unwrap().is_empty());
    // ordinary file copy places the bundled build; the provisioner must not
    assert!(!dirs.dest.join("ffmpeg.exe").exists());
}

#[tokio::test]
async fn require_bundled_fails_before_any_network_or_write() {
    let dirs = install_dirs();
    let server = MockServer::start().await;
    let provisioner = Provisioner::new(request_for(
        &dirs,
        &archive_url(&server),
        AcquisitionMode::RequireBundled,
    ));

    let err = provisioner.ensure_dependency().await.unwrap_err();

    assert!(matches!(err, Error::MissingAndBundleRequired { .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
    assert!(std::fs::read_dir(&dirs.temp).unwrap().next().is_none());
    assert!(std::fs::read_dir(&dirs.dest).unwrap().next().is_none());
}

#[tokio::test]
async fn downloads_extracts_and_places_nested_executable() {
    let dirs = install_dirs();
    let server = serve_archive(build_zip(&[
        ("tools/doc/README.txt", b"docs".as_slice()),
        ("tools/bin/ffmpeg.exe", b"ffmpeg binary".as_slice()),
    ]))
    .await;

    let provisioner = Provisioner::new(request_for(
        &dirs,
        &archive_url(&server),
        AcquisitionMode::DownloadOnDemand,
    ));

    let provisioned = provisioner.ensure_dependency().await.unwrap();

    assert_eq!(provisioned.provenance, Provenance::Downloaded);
    assert_eq!(provisioned.path, dirs.dest.join("ffmpeg.exe"));
    assert_eq!(
        std::fs::read(dirs.dest.join("ffmpeg.exe")).unwrap(),
        b"ffmpeg binary"
    );
    // download scratch (archive + extraction tree) is cleaned up on success
    assert!(!dirs.temp.join("dep-provisioner/download").exists());
}

#[tokio::test]
async fn finds_executable_regardless_of_nesting_depth() {
    let dirs = install_dirs();
    let server = serve_archive(build_zip(&[(
        "a/b/c/d/e/f/ffmpeg.exe",
        b"deeply nested".as_slice(),
    )]))
    .await;

    let provisioner = Provisioner::new(request_for(
        &dirs,
        &archive_url(&server),
        AcquisitionMode::DownloadOnDemand,
    ));

    let provisioned = provisioner.ensure_dependency().await.unwrap();

    assert_eq!(
        std::fs::read(&provisioned.path).unwrap(),
        b"deeply nested"
    );
}

#[tokio::test]
async fn archive_without_match_is_a_typed_error() {
    let dirs = install_dirs();
    let server = serve_archive(build_zip(&[(
        "tools/bin/ffprobe.exe",
        b"wrong tool".as_slice(),
    )]))
    .await;

    let provisioner = Provisioner::new(request_for(
        &dirs,
        &archive_url(&server),
        AcquisitionMode::DownloadOnDemand,
    ));

    let err = provisioner.ensure_dependency().await.unwrap_err();

    assert!(matches!(err, Error::ExecutableNotFoundInArchive { .. }));
    assert!(!dirs.dest.join("ffmpeg.exe").exists());
}

#[tokio::test]
async fn corrupt_archive_fails_extraction_cleanly() {
    let dirs = install_dirs();
    let server = serve_archive(b"this is not a zip archive".to_vec()).await;

    let provisioner = Provisioner::new(request_for(
        &dirs,
        &archive_url(&server),
        AcquisitionMode::DownloadOnDemand,
    ));

    let err = provisioner.ensure_dependency().await.unwrap_err();

    assert!(matches!(err, Error::ExtractionFailed { .. }));
    assert!(!dirs.dest.join("ffmpeg.exe").exists());
    // the corrupt archive does not linger in scratch
    assert!(!dirs.temp.join("dep-provisioner/download").exists());
}

#[tokio::test]
async fn existing_install_is_never_overwritten() {
    let dirs = install_dirs();
    std::fs::write(dirs.dest.join("ffmpeg.exe"), b"existing install").unwrap();

    let server = MockServer::start().await;
    let provisioner = Provisioner::new(request_for(
        &dirs,
        &archive_url(&server),
        AcquisitionMode::DownloadOnDemand,
    ));

    let provisioned = provisioner.ensure_dependency().await.unwrap();

    assert_eq!(provisioned.provenance, Provenance::AlreadyInstalled);
    assert_eq!(
        std::fs::read(dirs.dest.join("ffmpeg.exe")).unwrap(),
        b"existing install"
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn placement_is_idempotent_after_a_full_run() {
    let dirs = install_dirs();
    let server = serve_archive(build_zip(&[(
        "bin/ffmpeg.exe",
        b"fresh download".as_slice(),
    )]))
    .await;

    let provisioner = Provisioner::new(request_for(
        &dirs,
        &archive_url(&server),
        AcquisitionMode::DownloadOnDemand,
    ));

    provisioner.ensure_dependency().await.unwrap();
    let second = provisioner.place().await.unwrap();

    assert_eq!(second, Some(dirs.dest.join("ffmpeg.exe")));
    assert_eq!(
        std::fs::read(dirs.dest.join("ffmpeg.exe")).unwrap(),
        b"fresh download"
    );
}

#[tokio::test]
async fn cancellation_leaves_destination_and_scratch_unchanged() {
    let dirs = install_dirs();
    let server = serve_archive(build_zip(&[(
        "bin/ffmpeg.exe",
        b"never arrives".as_slice(),
    )]))
    .await;

    let provisioner = Provisioner::new(request_for(
        &dirs,
        &archive_url(&server),
        AcquisitionMode::DownloadOnDemand,
    ));

    let outcome = provisioner
        .acquire_with_progress(|_done, _total| false)
        .await
        .unwrap();

    assert!(matches!(outcome, DownloadOutcome::Cancelled));
    assert!(!dirs.dest.join("ffmpeg.exe").exists());
    assert!(!dirs.temp.join("dep-provisioner/ffmpeg.exe").exists());
    assert!(!dirs.temp.join("dep-provisioner/download").exists());

    // nothing staged, so the post-install hook is a clean skip
    assert_eq!(provisioner.place().await.unwrap(), None);
}

#[tokio::test]
async fn cancellation_mid_transfer_surfaces_as_cancelled_error() {
    let dirs = install_dirs();
    let server = serve_archive(build_zip(&[(
        "bin/ffmpeg.exe",
        b"never arrives".as_slice(),
    )]))
    .await;

    let provisioner = Provisioner::new(request_for(
        &dirs,
        &archive_url(&server),
        AcquisitionMode::DownloadOnDemand,
    ));

    // keep going while nothing has arrived, cancel on the first real bytes
    let err = provisioner
        .ensure_dependency_with_progress(|done, _total| done == 0)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::DownloadCancelled));
    assert!(!dirs.dest.join("ffmpeg.exe").exists());
}

#[tokio::test]
async fn unreachable_server_aborts_with_transport_error() {
    let dirs = install_dirs();
    let provisioner = Provisioner::new(request_for(
        &dirs,
        "http://127.0.0.1:9/ffmpeg.zip",
        AcquisitionMode::DownloadOnDemand,
    ));

    let err = provisioner.ensure_dependency().await.unwrap_err();

    assert!(matches!(err, Error::DownloadFailed { .. }));
    assert!(!dirs.dest.join("ffmpeg.exe").exists());
    assert!(!dirs.temp.join("dep-provisioner/ffmpeg.exe").exists());
}

#[tokio::test]
async fn http_error_status_aborts_with_transport_error() {
    let dirs = install_dirs();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ffmpeg.zip"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let provisioner = Provisioner::new(request_for(
        &dirs,
        &archive_url(&server),
        AcquisitionMode::DownloadOnDemand,
    ));

    let err = provisioner.ensure_dependency().await.unwrap_err();

    match err {
        Error::DownloadFailed { reason, .. } => assert!(reason.contains("404")),
        other => panic!("expected DownloadFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn reported_digest_and_size_match_served_archive() {
    let dirs = install_dirs();
    let body = build_zip(&[("ffmpeg.exe", b"digest me".as_slice())]);
    let expected_digest = format!("{:x}", Sha256::digest(&body));
    let expected_size = body.len() as u64;

    let server = serve_archive(body).await;
    let provisioner = Provisioner::new(request_for(
        &dirs,
        &archive_url(&server),
        AcquisitionMode::DownloadOnDemand,
    ));

    let outcome = provisioner.acquire().await.unwrap();

    match outcome {
        DownloadOutcome::Downloaded {
            archive_size,
            archive_digest,
            ..
        } => {
            assert_eq!(archive_size, expected_size);
            assert_eq!(archive_digest, expected_digest);
        }
        other => panic!("expected Downloaded, got {other:?}"),
    }
}

#[tokio::test]
async fn progress_reports_run_from_zero_to_total() {
    let dirs = install_dirs();
    let body = build_zip(&[("ffmpeg.exe", vec![0u8; 64 * 1024].as_slice())]);
    let total = body.len() as u64;

    let server = serve_archive(body).await;
    let provisioner = Provisioner::new(request_for(
        &dirs,
        &archive_url(&server),
        AcquisitionMode::DownloadOnDemand,
    ));

    let mut updates: Vec<(u64, Option<u64>)> = Vec::new();
    provisioner
        .acquire_with_progress(|done, reported_total| {
            updates.push((done, reported_total));
            true
        })
        .await
        .unwrap();

    assert_eq!(updates.first(), Some(&(0, Some(total))));
    assert_eq!(updates.last(), Some(&(total, Some(total))));
    assert!(updates.windows(2).all(|w| w[0].0 <= w[1].0));
}
