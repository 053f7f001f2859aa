//! Configuration for the milestone gate.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::{LocalChannel, MilestoneGate, SpoolChannel};

/// Default spool poll interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Shared spool directory used when none is configured.
///
/// `<cache dir>/devsuite/milestones`, falling back to the OS temp directory.
pub fn default_spool_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("devsuite")
        .join("milestones")
}

/// How milestones are exchanged and how long waits may take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    /// Spool directory for cross-process milestones. `None` keeps
    /// milestones inside this process.
    pub spool_dir: Option<PathBuf>,

    /// How often a spool subscriber checks for new lines.
    pub poll_interval: Duration,

    /// Upper bound on a milestone wait. `None` waits indefinitely.
    pub milestone_timeout: Option<Duration>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            spool_dir: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            milestone_timeout: None,
        }
    }
}

impl GateConfig {
    /// Exchange milestones through a spool in `dir`.
    pub fn with_spool_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.spool_dir = Some(dir.into());
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_milestone_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.milestone_timeout = timeout;
        self
    }

    /// The spool channel for the configured (or default) directory.
    pub fn spool_channel(&self) -> SpoolChannel {
        let dir = self.spool_dir.clone().unwrap_or_else(default_spool_dir);
        SpoolChannel::new(dir, self.poll_interval)
    }

    /// Build the gate this configuration describes.
    pub fn build_gate(&self) -> MilestoneGate {
        let gate = match &self.spool_dir {
            Some(_) => MilestoneGate::new(Arc::new(self.spool_channel())),
            None => MilestoneGate::new(Arc::new(LocalChannel::default())),
        };
        gate.with_default_timeout(self.milestone_timeout)
    }
}
