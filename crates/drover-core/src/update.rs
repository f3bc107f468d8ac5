use async_trait::async_trait;
use log::{debug, info};

use drover_platform::{DriverPaths, Platform};

use crate::installer::{DownloadTarget, InstallError, download_archive, extract_archive};
use crate::release::{ReleaseError, fetch_latest_version};
use crate::store::{StoreError, VersionStore};
use crate::version::DriverVersion;

/// Vendor listing page scanned for the latest release mention.
pub const DEFAULT_LISTING_URL: &str =
    "https://sites.google.com/a/chromium.org/chromedriver/downloads";

/// Storage bucket the release archives are served from.
pub const DEFAULT_STORAGE_URL: &str = "https://chromedriver.storage.googleapis.com";

/// Immutable configuration for one update attempt, built once at startup
/// and threaded through the orchestrator and its collaborators.
#[derive(Debug, Clone)]
pub struct UpdateConfig {
    pub platform: Platform,
    pub paths: DriverPaths,
    pub listing_url: String,
    pub storage_base_url: String,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            platform: Platform::current(),
            paths: DriverPaths::default(),
            listing_url: DEFAULT_LISTING_URL.to_string(),
            storage_base_url: DEFAULT_STORAGE_URL.to_string(),
        }
    }
}

/// Where the latest published driver version comes from.
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    async fn latest_version(&self) -> Result<DriverVersion, ReleaseError>;
}

/// Downloads one release archive and unpacks it into the installation
/// directory.
#[async_trait]
pub trait DriverInstall: Send + Sync {
    async fn install(&self, target: &DownloadTarget) -> Result<(), InstallError>;
}

/// Listing-page release source backed by the shared HTTP client.
#[derive(Debug, Clone)]
pub struct HttpReleaseSource {
    client: reqwest::Client,
    listing_url: String,
}

impl HttpReleaseSource {
    #[must_use]
    pub fn new(client: reqwest::Client, listing_url: String) -> Self {
        Self {
            client,
            listing_url,
        }
    }
}

#[async_trait]
impl ReleaseSource for HttpReleaseSource {
    async fn latest_version(&self) -> Result<DriverVersion, ReleaseError> {
        fetch_latest_version(&self.client, &self.listing_url).await
    }
}

/// Production installer: streamed download followed by extraction.
#[derive(Debug, Clone)]
pub struct HttpInstaller {
    client: reqwest::Client,
    install_dir: std::path::PathBuf,
    mark_executable: bool,
}

impl HttpInstaller {
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        install_dir: std::path::PathBuf,
        mark_executable: bool,
    ) -> Self {
        Self {
            client,
            install_dir,
            mark_executable,
        }
    }
}

#[async_trait]
impl DriverInstall for HttpInstaller {
    async fn install(&self, target: &DownloadTarget) -> Result<(), InstallError> {
        download_archive(&self.client, target).await?;
        extract_archive(&target.archive_path, &self.install_dir, self.mark_executable)
    }
}

/// Terminal states of a successful update attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// First run: the marker was seeded with the latest release and nothing
    /// was downloaded.
    Bootstrapped { latest: DriverVersion },
    /// The recorded version is already at least the latest release.
    UpToDate {
        current: DriverVersion,
        latest: DriverVersion,
    },
    /// A newer release was installed and the marker now records it.
    Updated {
        previous: DriverVersion,
        latest: DriverVersion,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error(transparent)]
    Release(#[from] ReleaseError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to install driver {version}: {source}")]
    Install {
        version: DriverVersion,
        #[source]
        source: InstallError,
    },
    /// The new binary is on disk but the marker still records the previous
    /// version; the two stay inconsistent until a later run rewrites the
    /// marker.
    #[error("driver {installed} was installed but recording it failed: {source}")]
    PersistAfterInstall {
        installed: DriverVersion,
        #[source]
        source: StoreError,
    },
}

/// One-shot update orchestrator.
///
/// Runs the strictly linear flow: resolve latest, read (or bootstrap) the
/// marker, compare, install when stale, persist. This is the only place
/// that decides whether the marker advances.
pub struct Updater<S, I> {
    config: UpdateConfig,
    store: VersionStore,
    source: S,
    installer: I,
}

impl<S, I> Updater<S, I>
where
    S: ReleaseSource,
    I: DriverInstall,
{
    #[must_use]
    pub fn new(config: UpdateConfig, source: S, installer: I) -> Self {
        let store = VersionStore::new(config.paths.version_file());
        Self {
            config,
            store,
            source,
            installer,
        }
    }

    fn download_target(&self, version: &DriverVersion) -> DownloadTarget {
        let archive_name = self.config.platform.archive_name();
        DownloadTarget {
            url: format!(
                "{}/{version}/{archive_name}",
                self.config.storage_base_url.trim_end_matches('/')
            ),
            archive_path: self.config.paths.archive_file(archive_name),
        }
    }

    /// Run one update attempt to completion.
    ///
    /// # Errors
    /// Any step failure aborts the run. The marker is only written on
    /// bootstrap or after a fully successful install; a failed install
    /// leaves it untouched so the next run retries from the same state.
    pub async fn run(&self) -> Result<UpdateOutcome, UpdateError> {
        let latest = self.source.latest_version().await?;
        info!("latest published driver version: {latest}");

        let Some(current) = self.store.read()? else {
            // First run: seed the marker with the latest release and stop.
            // current == latest by construction, so nothing is downloaded.
            self.store.write(&latest)?;
            info!("seeded version marker with {latest}");
            return Ok(UpdateOutcome::Bootstrapped { latest });
        };

        if !latest.is_newer_than(&current) {
            debug!("driver {current} is up to date (latest is {latest})");
            return Ok(UpdateOutcome::UpToDate { current, latest });
        }

        let target = self.download_target(&latest);
        info!("updating driver {current} -> {latest} from {}", target.url);
        self.installer
            .install(&target)
            .await
            .map_err(|source| UpdateError::Install {
                version: latest.clone(),
                source,
            })?;

        if let Err(source) = self.store.write(&latest) {
            return Err(UpdateError::PersistAfterInstall {
                installed: latest,
                source,
            });
        }

        Ok(UpdateOutcome::Updated {
            previous: current,
            latest,
        })
    }
}

impl Updater<HttpReleaseSource, HttpInstaller> {
    /// Wire the orchestrator with the production HTTP collaborators.
    #[must_use]
    pub fn with_http(client: &reqwest::Client, config: UpdateConfig) -> Self {
        let source = HttpReleaseSource::new(client.clone(), config.listing_url.clone());
        let installer = HttpInstaller::new(
            client.clone(),
            config.paths.install_dir.clone(),
            config.platform.marks_executable(),
        );
        Self::new(config, source, installer)
    }
}
