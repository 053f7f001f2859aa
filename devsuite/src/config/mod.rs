//! User configuration file.
//!
//! Settings live in an INI file at `<config dir>/devsuite/config.ini`:
//!
//! ```ini
//! [install]
//! root = /home/dev/DeveloperPlatform
//! temp_dir = /tmp/devsuite
//!
//! [download]
//! timeout_secs = 300
//! parallel_downloads = 4
//! username = developer
//!
//! [gate]
//! spool_dir = /home/dev/.cache/devsuite/milestones
//! poll_interval_ms = 250
//! milestone_timeout_secs = 3600
//! ```
//!
//! Every key is optional. [`ConfigFile`] projects the file into the typed
//! runtime configurations: [`InstallLayout`], [`DownloadConfig`] and
//! [`GateConfig`].

mod keys;

pub use keys::ConfigKey;

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use thiserror::Error;
use tracing::debug;

use crate::component::InstallLayout;
use crate::gate::GateConfig;
use crate::manager::{DownloadConfig, DEFAULT_PARALLEL_DOWNLOADS, DEFAULT_TIMEOUT_SECS};

/// Name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Default spool poll interval in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors reading, writing, or interpreting the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read { path: PathBuf, source: ini::Error },

    #[error("failed to write config {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),
}

/// `<config dir>/devsuite`, falling back to the working directory.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("devsuite")
}

/// Full path of the configuration file.
pub fn config_file_path() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

/// `[install]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallSettings {
    pub root: Option<PathBuf>,
    pub temp_dir: Option<PathBuf>,
}

/// `[download]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSettings {
    pub timeout_secs: u64,
    pub parallel_downloads: usize,
    pub username: Option<String>,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            parallel_downloads: DEFAULT_PARALLEL_DOWNLOADS,
            username: None,
        }
    }
}

/// `[gate]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateSettings {
    pub spool_dir: Option<PathBuf>,
    pub poll_interval_ms: u64,
    pub milestone_timeout_secs: Option<u64>,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            spool_dir: None,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            milestone_timeout_secs: None,
        }
    }
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub install: InstallSettings,
    pub download: DownloadSettings,
    pub gate: GateSettings,
}

impl ConfigFile {
    /// Load from the default location. A missing file yields defaults.
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`. A missing file yields defaults.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ini(&ini)
    }

    /// Interpret an already parsed INI document.
    pub fn from_ini(ini: &Ini) -> ConfigResult<Self> {
        let mut config = Self::default();
        for key in ConfigKey::all() {
            if let Some(value) = ini.get_from(Some(key.section()), key.key_name()) {
                let value = value.trim();
                if !value.is_empty() {
                    key.set(&mut config, value)?;
                }
            }
        }
        Ok(config)
    }

    /// Render every set value into an INI document.
    pub fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            let value = key.get(self);
            if !value.is_empty() {
                ini.with_section(Some(key.section()))
                    .set(key.key_name(), value);
            }
        }
        ini
    }

    /// Save to the default location.
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&config_file_path())
    }

    /// Save to `path`, creating its directory.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let write_failed = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_failed)?;
        }
        self.to_ini().write_to_file(path).map_err(write_failed)
    }

    /// The install layout, with platform defaults for unset paths.
    pub fn to_layout(&self) -> InstallLayout {
        let layout = match &self.install.root {
            Some(root) => InstallLayout::new(root),
            None => InstallLayout::platform_default(),
        };
        match &self.install.temp_dir {
            Some(temp) => layout.with_temp_dir(temp),
            None => layout,
        }
    }

    pub fn download_config(&self) -> DownloadConfig {
        let config = DownloadConfig::default()
            .with_timeout(Duration::from_secs(self.download.timeout_secs))
            .with_parallel_downloads(self.download.parallel_downloads);
        match &self.download.username {
            Some(username) => config.with_username(username),
            None => config,
        }
    }

    pub fn gate_config(&self) -> GateConfig {
        let config = GateConfig::default()
            .with_poll_interval(Duration::from_millis(self.gate.poll_interval_ms))
            .with_milestone_timeout(self.gate.milestone_timeout_secs.map(Duration::from_secs));
        match &self.gate.spool_dir {
            Some(dir) => config.with_spool_dir(dir),
            None => config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = ConfigFile::load_from(&temp.path().join("config.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
        assert_eq!(config.download_config(), DownloadConfig::default());
        assert_eq!(config.gate_config(), GateConfig::default());
    }

    #[test]
    fn test_parse_sections() {
        let ini = Ini::load_from_str(
            "[install]\nroot = /opt/dp\ntemp_dir = /var/tmp/dl\n\n\
             [download]\ntimeout_secs = 60\nparallel_downloads = 2\nusername = dev\n\n\
             [gate]\nspool_dir = /run/devsuite\npoll_interval_ms = 100\nmilestone_timeout_secs = 900\n",
        )
        .unwrap();
        let config = ConfigFile::from_ini(&ini).unwrap();

        let layout = config.to_layout();
        assert_eq!(layout.install_dir(), Path::new("/opt/dp"));
        assert_eq!(layout.temp_dir(), Path::new("/var/tmp/dl"));

        let download = config.download_config();
        assert_eq!(download.timeout, Duration::from_secs(60));
        assert_eq!(download.parallel_downloads, 2);
        assert_eq!(download.username.as_deref(), Some("dev"));

        let gate = config.gate_config();
        assert_eq!(gate.spool_dir, Some(PathBuf::from("/run/devsuite")));
        assert_eq!(gate.poll_interval, Duration::from_millis(100));
        assert_eq!(gate.milestone_timeout, Some(Duration::from_secs(900)));
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let ini = Ini::load_from_str("[download]\ntimeout_secs = soon\n").unwrap();
        let err = ConfigFile::from_ini(&ini).unwrap_err();
        assert!(err.to_string().contains("download.timeout_secs"));
    }

    #[test]
    fn test_save_and_reload() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.install.root = Some(PathBuf::from("/opt/dp"));
        config.gate.milestone_timeout_secs = Some(120);
        config.save_to(&path).unwrap();

        let reloaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(reloaded, config);
    }
}
