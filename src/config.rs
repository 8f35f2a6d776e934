//! Application configuration management.
//!
//! Settings are layered, later layers winning:
//!
//! 1. Built-in defaults
//! 2. A TOML config file (`--config FILE`, else `<config dir>/dupsort/config.toml`)
//! 3. Environment variables prefixed with `DUPSORT_` (e.g. `DUPSORT_IO_THREADS=8`)
//! 4. Command-line flags
//!
//! ```toml
//! io_threads = 8
//! strict = false
//! paranoid = true
//! skip_empty = false
//! order = "asc"
//! members = "path"
//! extension = "jpg"
//! trash = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::cli::ScanArgs;
use crate::duplicates::{MemberOrder, OrderingPolicy, SortDirection, DEFAULT_IO_THREADS};

/// Prefix for configuration environment variables.
pub const ENV_PREFIX: &str = "DUPSORT_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of threads hashing in parallel.
    pub io_threads: usize,
    /// Abort on the first traversal or hash error.
    pub strict: bool,
    /// Confirm digest matches byte for byte.
    pub paranoid: bool,
    /// Leave zero-byte files out.
    pub skip_empty: bool,
    /// Set order by size.
    pub order: SortDirection,
    /// Member order within each set.
    pub members: MemberOrder,
    /// Only consider files with this extension.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    /// Prune moves files to the trash instead of deleting them.
    pub trash: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            io_threads: DEFAULT_IO_THREADS,
            strict: false,
            paranoid: false,
            skip_empty: false,
            order: SortDirection::default(),
            members: MemberOrder::default(),
            extension: None,
            trash: false,
        }
    }
}

impl Config {
    /// Provider chain for defaults, the config file and the environment.
    ///
    /// `path` overrides the default config file location. A missing file
    /// contributes nothing.
    #[must_use]
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(file) => {
                log::debug!("Reading configuration from {}", file.display());
                figment = figment.merge(Toml::file(file));
            }
            None => log::debug!("No configuration directory available"),
        }

        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load configuration from defaults, the config file and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the explicit config file is missing, or if any
    /// layer holds a value of the wrong type.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(explicit) = path {
            if !explicit.is_file() {
                anyhow::bail!("Config file not found: {}", explicit.display());
            }
        }
        Self::extract(Self::figment(path))
    }

    /// Load configuration with command-line flags layered on top.
    ///
    /// Only flags the user actually set override lower layers.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`].
    pub fn from_cli(args: &ScanArgs, trash: bool) -> Result<Self> {
        let path = args.config.as_deref();
        if let Some(explicit) = path {
            if !explicit.is_file() {
                anyhow::bail!("Config file not found: {}", explicit.display());
            }
        }

        let mut figment = Self::figment(path).merge(Serialized::defaults(args));
        if trash {
            figment = figment.merge(Serialized::default("trash", true));
        }
        Self::extract(figment)
    }

    /// Extract a configuration from a provider chain.
    ///
    /// # Errors
    ///
    /// Returns an error if a value has the wrong type.
    pub fn extract(figment: Figment) -> Result<Self> {
        let config: Self = figment
            .extract()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .context("Invalid configuration")?;
        Ok(config.normalized())
    }

    /// Save the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// The ordering policy these settings select.
    #[must_use]
    pub fn ordering(&self) -> OrderingPolicy {
        OrderingPolicy::new(self.order, self.members)
    }

    /// Default platform-specific configuration path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dupsort").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    fn normalized(mut self) -> Self {
        self.io_threads = self.io_threads.max(1);
        self.extension = self
            .extension
            .map(|ext| ext.trim_start_matches('.').to_string())
            .filter(|ext| !ext.is_empty());
        self
    }
}
