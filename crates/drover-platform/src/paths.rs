use std::path::PathBuf;

const VERSION_FILE_NAME: &str = "chromedriverCurrentVersion.txt";

/// Filesystem layout of the managed driver installation.
///
/// Everything lives under a single installation directory: the extracted
/// driver binary, the downloaded archive, and the version marker file. The
/// directory is resolved relative to the process working directory unless an
/// absolute path is given.
#[derive(Debug, Clone)]
pub struct DriverPaths {
    pub install_dir: PathBuf,
}

impl DriverPaths {
    #[must_use]
    pub fn new(install_dir: impl Into<PathBuf>) -> Self {
        Self {
            install_dir: install_dir.into(),
        }
    }

    /// Marker file recording the installed driver version.
    #[must_use]
    pub fn version_file(&self) -> PathBuf {
        self.install_dir.join(VERSION_FILE_NAME)
    }

    /// Local destination of a downloaded release archive.
    #[must_use]
    pub fn archive_file(&self, archive_name: &str) -> PathBuf {
        self.install_dir.join(archive_name)
    }

    /// Ensure the installation directory exists on disk.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.install_dir)
    }
}

impl Default for DriverPaths {
    fn default() -> Self {
        Self::new("drivers")
    }
}
