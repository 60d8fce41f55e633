use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::io::FileMaskOptions;

/// Top-level configuration for the gps-mask tools.
///
/// # Loading
///
/// ```rust,no_run
/// use gps_mask::config::Config;
///
/// // From a JSON file
/// let config = Config::load(Some("config.json".as_ref())).unwrap();
///
/// // Or use defaults and customize
/// let mut config = Config::default();
/// config.output.delete_original = true;
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where masked files go and what happens to the originals.
    pub output: OutputConfig,
    /// How input paths are walked.
    pub scan: ScanConfig,
}

/// Output and behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// If `true`, report what would be masked without writing any files.
    pub dry_run: bool,
    /// If `true`, delete the original once the masked copy is written and verified.
    pub delete_original: bool,
    /// File name prefix for masked copies.
    pub output_prefix: String,
}

/// Directory walking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Follow symlinks while walking directories.
    pub follow_links: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            delete_original: false,
            output_prefix: "new_".to_string(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self { follow_links: true }
    }
}

impl Config {
    /// Resolve the config file path: config.json next to the executable.
    pub fn config_path() -> Result<PathBuf> {
        let exe_path = std::env::current_exe().context("Failed to get executable path")?;
        let exe_dir = exe_path
            .parent()
            .context("Failed to get executable directory")?;
        Ok(exe_dir.join("config.json"))
    }

    /// Load config from the given path, or from the default location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            log::warn!(
                "Config file not found at {}. Using defaults.",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;
        let config: Config =
            serde_json::from_str(&contents).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Save config to the given path, or to the default location.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, contents).context("Failed to write config file")?;
        log::info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Options for the filesystem sink derived from this config.
    pub fn mask_options(&self) -> FileMaskOptions {
        FileMaskOptions {
            output_prefix: self.output.output_prefix.clone(),
            delete_original: self.output.delete_original,
            dry_run: self.output.dry_run,
        }
    }
}
