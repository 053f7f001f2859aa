//! Orchestrator value types

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use super::item::{DownloadState, InstallState};
use crate::component::{ComponentKey, InstallerVariant};

/// Everything needed to run one install step, detached from the registry.
#[derive(Debug, Clone)]
pub struct InstallJob {
    pub key: ComponentKey,
    pub name: String,
    pub variant: InstallerVariant,
    pub downloaded_file: PathBuf,
    pub target_dir: PathBuf,
}

/// Why an install request was parked in `Waiting`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferReason {
    /// The item's own download has not completed yet
    PendingDownload,
    /// These prerequisites are neither installed nor skipped
    PendingPrerequisites(Vec<ComponentKey>),
}

impl fmt::Display for DeferReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeferReason::PendingDownload => write!(f, "download not finished"),
            DeferReason::PendingPrerequisites(keys) => {
                let names: Vec<&str> = keys.iter().map(ComponentKey::as_str).collect();
                write!(f, "waiting on {}", names.join(", "))
            }
        }
    }
}

/// Outcome of asking the registry to start an install.
#[derive(Debug, Clone)]
pub enum InstallReadiness {
    /// Already installing, installed, or skipped; nothing to do
    AlreadyHandled,
    /// Parked in `Waiting`, with a status line for the UI
    Deferred { reason: DeferReason, status: String },
    /// Moved to `Installing`; the caller must run the job
    Ready(InstallJob),
}

/// Point-in-time view of one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemSnapshot {
    pub key: ComponentKey,
    pub name: String,
    pub download: DownloadState,
    pub install: InstallState,
    pub dependents: Vec<ComponentKey>,
}

/// Point-in-time view of the whole registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrchestratorSnapshot {
    pub items: Vec<ItemSnapshot>,
    pub any_downloading: bool,
    pub any_installing: bool,
    pub navigation_fired: bool,
}

impl OrchestratorSnapshot {
    pub fn item(&self, key: &str) -> Option<&ItemSnapshot> {
        self.items.iter().find(|item| item.key.as_str() == key)
    }

    /// Every item is installed or skipped.
    pub fn is_complete(&self) -> bool {
        self.items.iter().all(|item| item.install.is_settled())
    }
}
