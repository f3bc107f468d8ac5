use std::path::PathBuf;

use clap::Parser;

use drover_core::{DEFAULT_LISTING_URL, DEFAULT_STORAGE_URL, UpdateConfig};
use drover_platform::{DriverPaths, Platform};

/// Keep the cached chromedriver binary in sync with the latest published
/// release. Run once before the automation suite starts.
#[derive(Debug, Parser)]
#[command(name = "drover", version, about)]
pub struct Args {
    /// Directory the driver archive is downloaded to and extracted into.
    #[arg(long, default_value = "drivers")]
    pub install_dir: PathBuf,

    /// Release listing page the latest version is resolved from.
    #[arg(long, default_value = DEFAULT_LISTING_URL)]
    pub listing_url: String,

    /// Base URL the release archives are served from.
    #[arg(long, default_value = DEFAULT_STORAGE_URL)]
    pub storage_url: String,

    /// Platform identifier override; defaults to the host platform.
    #[arg(long)]
    pub platform: Option<String>,

    /// Log at debug level.
    #[arg(long, short)]
    pub verbose: bool,
}

impl Args {
    #[must_use]
    pub fn into_config(self) -> UpdateConfig {
        let platform = self
            .platform
            .as_deref()
            .map_or_else(Platform::current, Platform::from_identifier);

        UpdateConfig {
            platform,
            paths: DriverPaths::new(self.install_dir),
            listing_url: self.listing_url,
            storage_base_url: self.storage_url,
        }
    }
}
