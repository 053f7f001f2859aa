//! Collaborators the session reports to.
//!
//! These are the seams to the outside world that are not transport or
//! process adapters: navigation, the failure surface, progress display, and
//! credential storage. Each trait has a small default implementation suitable
//! for headless use.

use std::fmt;

use serde::Serialize;
use tracing::{debug, error, info};

use super::error::SessionError;
use crate::component::ComponentKey;
use crate::manager::Credentials;

/// Route navigated to once every download and install has finished.
pub const COMPLETE_ROUTE: &str = "start";

/// Screen navigation.
///
/// Called while the orchestrator lock is held; implementations must not call
/// back into the session.
pub trait Navigator: Send + Sync {
    fn go_to(&self, route: &str);
}

/// Navigator that only logs the route.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn go_to(&self, route: &str) {
        info!(route, "Navigating");
    }
}

/// Receives every download and install failure.
pub trait FailureReporter: Send + Sync {
    fn report(&self, key: &ComponentKey, error: &SessionError);
}

/// Failure reporter that writes to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingFailureReporter;

impl FailureReporter for TracingFailureReporter {
    fn report(&self, key: &ComponentKey, error: &SessionError) {
        error!(component = %key, error = %error, "Component failed");
    }
}

/// Coarse per-component stage shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallStage {
    Downloading,
    Waiting,
    Installing,
    Complete,
    Skipped,
    Failed,
}

impl InstallStage {
    pub fn name(&self) -> &'static str {
        match self {
            InstallStage::Downloading => "downloading",
            InstallStage::Waiting => "waiting",
            InstallStage::Installing => "installing",
            InstallStage::Complete => "complete",
            InstallStage::Skipped => "skipped",
            InstallStage::Failed => "failed",
        }
    }

    /// No further updates follow this stage.
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            InstallStage::Complete | InstallStage::Skipped | InstallStage::Failed
        )
    }
}

impl fmt::Display for InstallStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-component progress display.
pub trait ProgressSink: Send + Sync {
    /// A component changed stage, with a status line for the user.
    fn update(&self, key: &ComponentKey, stage: InstallStage, status: &str);

    /// Bytes transferred so far for a download.
    fn bytes(&self, _key: &ComponentKey, _downloaded: u64, _total: Option<u64>) {}
}

/// Progress sink that only emits debug events.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentProgress;

impl ProgressSink for SilentProgress {
    fn update(&self, key: &ComponentKey, stage: InstallStage, status: &str) {
        debug!(component = %key, stage = %stage, status, "Progress");
    }
}

/// Source of download-manager credentials.
pub trait CredentialProvider: Send + Sync {
    fn credentials(&self) -> Option<Credentials>;
}

/// No stored credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

impl CredentialProvider for NoCredentials {
    fn credentials(&self) -> Option<Credentials> {
        None
    }
}

/// Credentials fixed at construction.
#[derive(Debug, Clone)]
pub struct StaticCredentials(Credentials);

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self(Credentials::new(username, password))
    }
}

impl CredentialProvider for StaticCredentials {
    fn credentials(&self) -> Option<Credentials> {
        Some(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names() {
        assert_eq!(InstallStage::Waiting.to_string(), "waiting");
        assert!(InstallStage::Failed.is_final());
        assert!(!InstallStage::Installing.is_final());
    }

    #[test]
    fn test_static_credentials() {
        let provider = StaticCredentials::new("developer", "pw");
        let credentials = provider.credentials().unwrap();
        assert_eq!(credentials.username, "developer");
        assert!(NoCredentials.credentials().is_none());
    }
}
