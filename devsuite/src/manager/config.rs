//! Configuration for the download transport.

use std::time::Duration;

/// Default HTTP timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Default number of concurrent downloads.
pub const DEFAULT_PARALLEL_DOWNLOADS: usize = 4;

/// Configuration for installer downloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadConfig {
    /// HTTP request timeout.
    pub timeout: Duration,

    /// Maximum concurrent downloads in `download_all`.
    pub parallel_downloads: usize,

    /// Username for the authenticated download manager.
    pub username: Option<String>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            parallel_downloads: DEFAULT_PARALLEL_DOWNLOADS,
            username: None,
        }
    }
}

impl DownloadConfig {
    /// Set the HTTP timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum concurrent downloads (at least one).
    pub fn with_parallel_downloads(mut self, max: usize) -> Self {
        self.parallel_downloads = max.max(1);
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DownloadConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(300));
        assert_eq!(config.parallel_downloads, 4);
        assert!(config.username.is_none());
    }

    #[test]
    fn test_builder_pattern() {
        let config = DownloadConfig::default()
            .with_timeout(Duration::from_secs(60))
            .with_parallel_downloads(0)
            .with_username("developer");

        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.parallel_downloads, 1);
        assert_eq!(config.username.as_deref(), Some("developer"));
    }
}
