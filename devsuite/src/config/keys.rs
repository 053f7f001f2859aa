//! Addressable configuration keys (`section.key`).

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::{ConfigError, ConfigFile, ConfigResult};

/// One setting in the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    InstallRoot,
    InstallTempDir,
    DownloadTimeoutSecs,
    DownloadParallelDownloads,
    DownloadUsername,
    GateSpoolDir,
    GatePollIntervalMs,
    GateMilestoneTimeoutSecs,
}

const ALL: [ConfigKey; 8] = [
    ConfigKey::InstallRoot,
    ConfigKey::InstallTempDir,
    ConfigKey::DownloadTimeoutSecs,
    ConfigKey::DownloadParallelDownloads,
    ConfigKey::DownloadUsername,
    ConfigKey::GateSpoolDir,
    ConfigKey::GatePollIntervalMs,
    ConfigKey::GateMilestoneTimeoutSecs,
];

impl ConfigKey {
    /// Every key, grouped by section.
    pub fn all() -> &'static [ConfigKey] {
        &ALL
    }

    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::InstallRoot | ConfigKey::InstallTempDir => "install",
            ConfigKey::DownloadTimeoutSecs
            | ConfigKey::DownloadParallelDownloads
            | ConfigKey::DownloadUsername => "download",
            ConfigKey::GateSpoolDir
            | ConfigKey::GatePollIntervalMs
            | ConfigKey::GateMilestoneTimeoutSecs => "gate",
        }
    }

    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::InstallRoot => "root",
            ConfigKey::InstallTempDir => "temp_dir",
            ConfigKey::DownloadTimeoutSecs => "timeout_secs",
            ConfigKey::DownloadParallelDownloads => "parallel_downloads",
            ConfigKey::DownloadUsername => "username",
            ConfigKey::GateSpoolDir => "spool_dir",
            ConfigKey::GatePollIntervalMs => "poll_interval_ms",
            ConfigKey::GateMilestoneTimeoutSecs => "milestone_timeout_secs",
        }
    }

    /// `section.key`.
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::InstallRoot => "install.root",
            ConfigKey::InstallTempDir => "install.temp_dir",
            ConfigKey::DownloadTimeoutSecs => "download.timeout_secs",
            ConfigKey::DownloadParallelDownloads => "download.parallel_downloads",
            ConfigKey::DownloadUsername => "download.username",
            ConfigKey::GateSpoolDir => "gate.spool_dir",
            ConfigKey::GatePollIntervalMs => "gate.poll_interval_ms",
            ConfigKey::GateMilestoneTimeoutSecs => "gate.milestone_timeout_secs",
        }
    }

    /// Current value as written to the file. Empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        fn path(value: &Option<PathBuf>) -> String {
            value
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        }

        match self {
            ConfigKey::InstallRoot => path(&config.install.root),
            ConfigKey::InstallTempDir => path(&config.install.temp_dir),
            ConfigKey::DownloadTimeoutSecs => config.download.timeout_secs.to_string(),
            ConfigKey::DownloadParallelDownloads => config.download.parallel_downloads.to_string(),
            ConfigKey::DownloadUsername => config.download.username.clone().unwrap_or_default(),
            ConfigKey::GateSpoolDir => path(&config.gate.spool_dir),
            ConfigKey::GatePollIntervalMs => config.gate.poll_interval_ms.to_string(),
            ConfigKey::GateMilestoneTimeoutSecs => config
                .gate
                .milestone_timeout_secs
                .map(|secs| secs.to_string())
                .unwrap_or_default(),
        }
    }

    /// Parse and store `value`.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> ConfigResult<()> {
        match self {
            ConfigKey::InstallRoot => config.install.root = Some(PathBuf::from(value)),
            ConfigKey::InstallTempDir => config.install.temp_dir = Some(PathBuf::from(value)),
            ConfigKey::DownloadTimeoutSecs => {
                config.download.timeout_secs = self.positive(value)?;
            }
            ConfigKey::DownloadParallelDownloads => {
                config.download.parallel_downloads = self.positive(value)? as usize;
            }
            ConfigKey::DownloadUsername => config.download.username = Some(value.to_string()),
            ConfigKey::GateSpoolDir => config.gate.spool_dir = Some(PathBuf::from(value)),
            ConfigKey::GatePollIntervalMs => {
                config.gate.poll_interval_ms = self.positive(value)?;
            }
            ConfigKey::GateMilestoneTimeoutSecs => {
                config.gate.milestone_timeout_secs = Some(self.positive(value)?);
            }
        }
        Ok(())
    }

    fn positive(&self, value: &str) -> ConfigResult<u64> {
        let invalid = |reason: &str| ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.to_string(),
        };
        match value.trim().parse::<u64>() {
            Ok(0) => Err(invalid("must be greater than zero")),
            Ok(n) => Ok(n),
            Err(_) => Err(invalid("expected a whole number")),
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL.iter()
            .copied()
            .find(|key| key.name() == s)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_names() {
        for key in ConfigKey::all() {
            assert_eq!(key.name().parse::<ConfigKey>().unwrap(), *key);
            assert_eq!(
                key.name(),
                format!("{}.{}", key.section(), key.key_name())
            );
        }
        assert!("install.nope".parse::<ConfigKey>().is_err());
    }

    #[test]
    fn test_set_rejects_zero() {
        let mut config = ConfigFile::default();
        let err = ConfigKey::DownloadParallelDownloads
            .set(&mut config, "0")
            .unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn test_unset_optional_reads_empty() {
        let config = ConfigFile::default();
        assert_eq!(ConfigKey::GateMilestoneTimeoutSecs.get(&config), "");
        assert_eq!(ConfigKey::DownloadTimeoutSecs.get(&config), "300");
    }
}
