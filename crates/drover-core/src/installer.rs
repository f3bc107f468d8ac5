use std::path::{Path, PathBuf};

use log::{debug, info};
use tokio::io::AsyncWriteExt as _;

/// Remote archive plus the local path it is downloaded to.
///
/// Built fresh for every update attempt from the platform and the resolved
/// latest version; nothing about it survives the attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub url: String,
    pub archive_path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    #[error("{context}: {source}")]
    Http {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("archive download failed with HTTP {status} for {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("{context}: {source}")]
    Zip {
        context: &'static str,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("archive entry escapes the installation directory: {name}")]
    UnsafePath { name: String },
}

impl InstallError {
    fn http(context: &'static str, source: reqwest::Error) -> Self {
        Self::Http { context, source }
    }

    fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    fn zip(context: &'static str, source: zip::result::ZipError) -> Self {
        Self::Zip { context, source }
    }

    fn io_with_path(context: &'static str, path: &Path, source: &std::io::Error) -> Self {
        Self::io(
            context,
            std::io::Error::new(source.kind(), format!("{}: {source}", path.display())),
        )
    }
}

/// Stream the remote archive to `target.archive_path`, overwriting whatever
/// a previous attempt left there.
///
/// A transport error aborts the download without cleanup; a partially
/// written archive may remain on disk and is overwritten by the next
/// attempt.
///
/// # Errors
/// Returns an error when the request fails, the server responds with a
/// non-success status, or the archive file cannot be written.
pub async fn download_archive(
    client: &reqwest::Client,
    target: &DownloadTarget,
) -> Result<(), InstallError> {
    use futures_util::StreamExt;

    let response = client
        .get(&target.url)
        .send()
        .await
        .map_err(|error| InstallError::http("download request failed", error))?;

    if !response.status().is_success() {
        return Err(InstallError::Status {
            url: target.url.clone(),
            status: response.status(),
        });
    }

    let mut file = tokio::fs::File::create(&target.archive_path)
        .await
        .map_err(|error| {
            InstallError::io_with_path("failed to create archive file", &target.archive_path, &error)
        })?;

    let mut downloaded: u64 = 0;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|error| InstallError::http("download stream error", error))?;
        file.write_all(&chunk).await.map_err(|error| {
            InstallError::io_with_path("failed to write archive data", &target.archive_path, &error)
        })?;
        downloaded += chunk.len() as u64;
    }

    file.flush().await.map_err(|error| {
        InstallError::io_with_path("failed to flush archive file", &target.archive_path, &error)
    })?;

    info!(
        "downloaded {downloaded} bytes to {}",
        target.archive_path.display()
    );
    Ok(())
}

/// Extract every entry of the downloaded archive into `dest`.
///
/// Entries are processed in declared order; parent directories are created
/// as needed and existing files are overwritten. When `mark_executable` is
/// set, every extracted file gets mode `0o755` — the whole archive is
/// treated as executable payload rather than inspecting entry types.
///
/// A failure part-way through leaves already-written entries in place; the
/// caller must not record the update as applied.
///
/// # Errors
/// Returns an error when the archive cannot be opened or read, an entry
/// name escapes `dest`, or an extracted file cannot be written.
pub fn extract_archive(
    archive_path: &Path,
    dest: &Path,
    mark_executable: bool,
) -> Result<(), InstallError> {
    let file = std::fs::File::open(archive_path).map_err(|error| {
        InstallError::io_with_path("failed to open archive", archive_path, &error)
    })?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|error| InstallError::zip("failed to read archive", error))?;

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|error| InstallError::zip("failed to read archive entry", error))?;
        let Some(relative) = entry.enclosed_name() else {
            return Err(InstallError::UnsafePath {
                name: entry.name().to_string(),
            });
        };
        let out_path = dest.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path).map_err(|error| {
                InstallError::io_with_path("failed to create extracted directory", &out_path, &error)
            })?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| {
                InstallError::io_with_path("failed to create entry parent directory", parent, &error)
            })?;
        }

        let mut out_file = std::fs::File::create(&out_path).map_err(|error| {
            InstallError::io_with_path("failed to create extracted file", &out_path, &error)
        })?;
        std::io::copy(&mut entry, &mut out_file).map_err(|error| {
            InstallError::io_with_path("failed to extract archive entry", &out_path, &error)
        })?;

        if mark_executable {
            set_executable(&out_path)?;
        }

        debug!("extracted {}", out_path.display());
    }

    Ok(())
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<(), InstallError> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).map_err(|error| {
        InstallError::io_with_path("failed to mark extracted file executable", path, &error)
    })
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<(), InstallError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;
    use std::path::Path;

    use super::{InstallError, extract_archive};

    fn write_archive(zip_path: &Path, entries: &[(&str, &[u8])]) {
        let zip_file = std::fs::File::create(zip_path).expect("zip file should be created");
        let mut writer = zip::ZipWriter::new(zip_file);
        let options = zip::write::SimpleFileOptions::default().unix_permissions(0o644);
        for (name, content) in entries {
            writer
                .start_file(*name, options)
                .expect("file entry should be started");
            writer
                .write_all(content)
                .expect("file entry should be written");
        }
        writer.finish().expect("zip archive should be finalized");
    }

    #[test]
    fn extracts_entries_with_their_directories() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let zip_path = temp.path().join("chromedriver_linux64.zip");
        let extract_dir = temp.path().join("drivers");
        std::fs::create_dir_all(&extract_dir).expect("extract dir should be created");
        write_archive(&zip_path, &[("chromedriver", b"driver-bytes")]);

        extract_archive(&zip_path, &extract_dir, false).expect("archive should extract");

        let extracted = std::fs::read(extract_dir.join("chromedriver"))
            .expect("extracted file should exist and be readable");
        assert_eq!(extracted, b"driver-bytes");
    }

    #[test]
    fn overwrites_files_from_a_previous_install() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let zip_path = temp.path().join("chromedriver_linux64.zip");
        let extract_dir = temp.path().join("drivers");
        std::fs::create_dir_all(&extract_dir).expect("extract dir should be created");
        std::fs::write(extract_dir.join("chromedriver"), b"old-driver")
            .expect("stale driver should be written");
        write_archive(&zip_path, &[("chromedriver", b"new-driver")]);

        extract_archive(&zip_path, &extract_dir, false).expect("archive should extract");

        let extracted = std::fs::read(extract_dir.join("chromedriver"))
            .expect("extracted file should be readable");
        assert_eq!(extracted, b"new-driver");
    }

    #[cfg(unix)]
    #[test]
    fn every_entry_is_marked_executable_when_requested() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().expect("tempdir should be created");
        let zip_path = temp.path().join("chromedriver_linux64.zip");
        let extract_dir = temp.path().join("drivers");
        std::fs::create_dir_all(&extract_dir).expect("extract dir should be created");
        write_archive(&zip_path, &[("a/bin", b"binary"), ("a/lib/data", b"data")]);

        extract_archive(&zip_path, &extract_dir, true).expect("archive should extract");

        for entry in ["a/bin", "a/lib/data"] {
            let mode = std::fs::metadata(extract_dir.join(entry))
                .expect("extracted file should exist")
                .permissions()
                .mode();
            assert_ne!(mode & 0o111, 0, "{entry} should be executable");
        }
    }

    #[cfg(unix)]
    #[test]
    fn nothing_is_marked_executable_for_windows_archives() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().expect("tempdir should be created");
        let zip_path = temp.path().join("chromedriver_win32.zip");
        let extract_dir = temp.path().join("drivers");
        std::fs::create_dir_all(&extract_dir).expect("extract dir should be created");
        write_archive(&zip_path, &[("a/bin", b"binary"), ("a/lib/data", b"data")]);

        extract_archive(&zip_path, &extract_dir, false).expect("archive should extract");

        for entry in ["a/bin", "a/lib/data"] {
            let mode = std::fs::metadata(extract_dir.join(entry))
                .expect("extracted file should exist")
                .permissions()
                .mode();
            assert_eq!(mode & 0o111, 0, "{entry} should not be executable");
        }
    }

    #[test]
    fn entries_escaping_the_destination_abort_the_install() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let zip_path = temp.path().join("unsafe.zip");
        let extract_dir = temp.path().join("drivers");
        std::fs::create_dir_all(&extract_dir).expect("extract dir should be created");
        write_archive(&zip_path, &[("../outside.txt", b"should not be extracted")]);

        let result = extract_archive(&zip_path, &extract_dir, false);

        assert!(matches!(result, Err(InstallError::UnsafePath { .. })));
        assert!(
            !temp.path().join("outside.txt").exists(),
            "unsafe path should not be extracted outside the destination"
        );
    }

    #[test]
    fn missing_archive_is_an_io_error() {
        let temp = tempfile::tempdir().expect("tempdir should be created");

        let result = extract_archive(
            &temp.path().join("absent.zip"),
            &temp.path().join("drivers"),
            false,
        );

        assert!(matches!(result, Err(InstallError::Io { .. })));
    }
}
