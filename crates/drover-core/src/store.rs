use std::io::Write as _;
use std::path::{Path, PathBuf};

use log::warn;

use crate::version::DriverVersion;

/// Persisted record of the currently installed driver version.
///
/// The marker file holds the dotted version string on its first line; any
/// further lines are ignored. A missing, empty, or unparseable marker reads
/// as `None`, which callers treat as the bootstrap case.
#[derive(Debug, Clone)]
pub struct VersionStore {
    path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read version marker {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write version marker {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl VersionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the recorded version, if any.
    ///
    /// # Errors
    /// Returns an error only when the marker exists but cannot be read. A
    /// missing file, an empty file, or a malformed first line is `Ok(None)`.
    pub fn read(&self) -> Result<Option<DriverVersion>, StoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.display().to_string(),
                    source,
                });
            }
        };

        let Some(first_line) = contents.lines().next() else {
            warn!("version marker {} is empty", self.path.display());
            return Ok(None);
        };

        match first_line.parse() {
            Ok(version) => Ok(Some(version)),
            Err(error) => {
                warn!(
                    "ignoring malformed version marker {}: {error}",
                    self.path.display()
                );
                Ok(None)
            }
        }
    }

    /// Overwrite the marker with `version`.
    ///
    /// The content is staged in a temporary file next to the marker and
    /// renamed into place, so a failed write never leaves a truncated
    /// marker behind.
    ///
    /// # Errors
    /// Returns an error when the staging file cannot be created, written,
    /// or renamed over the marker.
    pub fn write(&self, version: &DriverVersion) -> Result<(), StoreError> {
        let write_error = |source: std::io::Error| StoreError::Write {
            path: self.path.display().to_string(),
            source,
        };

        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut staged = tempfile::NamedTempFile::new_in(parent).map_err(write_error)?;
        staged
            .write_all(version.as_str().as_bytes())
            .map_err(write_error)?;
        staged
            .persist(&self.path)
            .map_err(|error| write_error(error.error))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{StoreError, VersionStore};
    use crate::version::DriverVersion;

    fn version(s: &str) -> DriverVersion {
        s.parse().expect("test version should parse")
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let store = VersionStore::new(dir.path().join("chromedriverCurrentVersion.txt"));

        store.write(&version("2.41")).expect("write should succeed");
        let read = store.read().expect("read should succeed");

        assert_eq!(read, Some(version("2.41")));
    }

    #[test]
    fn marker_content_is_the_bare_version_string() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("chromedriverCurrentVersion.txt");
        let store = VersionStore::new(&path);

        store.write(&version("2.41")).expect("write should succeed");

        let contents = std::fs::read_to_string(path).expect("marker should be readable");
        assert_eq!(contents, "2.41");
    }

    #[test]
    fn missing_marker_reads_as_none() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let store = VersionStore::new(dir.path().join("missing.txt"));

        assert_eq!(store.read().expect("read should succeed"), None);
    }

    #[test]
    fn empty_marker_reads_as_none() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("chromedriverCurrentVersion.txt");
        std::fs::write(&path, "").expect("marker should be written");

        let store = VersionStore::new(path);

        assert_eq!(store.read().expect("read should succeed"), None);
    }

    #[test]
    fn malformed_marker_reads_as_none() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("chromedriverCurrentVersion.txt");
        std::fs::write(&path, "not-a-version\n").expect("marker should be written");

        let store = VersionStore::new(path);

        assert_eq!(store.read().expect("read should succeed"), None);
    }

    #[test]
    fn only_the_first_line_is_parsed() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("chromedriverCurrentVersion.txt");
        std::fs::write(&path, "2.41\n9.99\nnoise\n").expect("marker should be written");

        let store = VersionStore::new(path);

        assert_eq!(store.read().expect("read should succeed"), Some(version("2.41")));
    }

    #[test]
    fn write_replaces_an_existing_marker() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let store = VersionStore::new(dir.path().join("chromedriverCurrentVersion.txt"));

        store.write(&version("2.40")).expect("first write should succeed");
        store.write(&version("2.41")).expect("second write should succeed");

        assert_eq!(store.read().expect("read should succeed"), Some(version("2.41")));
    }

    #[test]
    fn write_into_a_missing_directory_is_a_write_error() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let store = VersionStore::new(dir.path().join("nope").join("marker.txt"));

        let result = store.write(&version("2.41"));

        assert!(matches!(result, Err(StoreError::Write { .. })));
    }
}
