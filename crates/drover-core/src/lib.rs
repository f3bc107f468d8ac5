//! Core update workflow for drover.
//!
//! This crate holds everything between "the suite is about to start" and
//! "the cached chromedriver matches the latest published release":
//! - Latest-version resolution from the vendor listing page.
//! - The persisted version marker and its bootstrap behavior.
//! - Archive download and extraction into the installation directory.
//! - The orchestrator that ties the steps together and decides whether the
//!   marker advances.

mod installer;
mod release;
mod store;
mod update;
mod version;

/// Download/extraction mechanics and the per-attempt download target.
pub use installer::{DownloadTarget, InstallError, download_archive, extract_archive};
/// Listing-page fetch and version-token extraction.
pub use release::{ReleaseError, fetch_latest_version, parse_latest_version};
/// Persisted version marker.
pub use store::{StoreError, VersionStore};
/// Orchestrator, its collaborator seams, and the production HTTP wiring.
pub use update::{
    DEFAULT_LISTING_URL, DEFAULT_STORAGE_URL, DriverInstall, HttpInstaller, HttpReleaseSource,
    ReleaseSource, UpdateConfig, UpdateError, UpdateOutcome, Updater,
};
/// Release version token and its parse error.
pub use version::{DriverVersion, VersionParseError};
