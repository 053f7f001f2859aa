//! Installable items and their lifecycle state machines.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::component::{ComponentDescriptor, ComponentKey, InstallerVariant};

/// Result type for state transitions.
pub type TransitionResult<T> = Result<T, TransitionError>;

/// Download lifecycle of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadState {
    NotStarted,
    Downloading,
    Downloaded,
}

impl DownloadState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::NotStarted => "not started",
            Self::Downloading => "downloading",
            Self::Downloaded => "downloaded",
        }
    }
}

impl fmt::Display for DownloadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Install lifecycle of an item.
///
/// Moves forward only. `Skipped` is terminal and only reachable from
/// `NotStarted` or `Waiting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallState {
    NotStarted,
    Waiting,
    Installing,
    Installed,
    Skipped,
}

impl InstallState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::NotStarted => "not started",
            Self::Waiting => "waiting",
            Self::Installing => "installing",
            Self::Installed => "installed",
            Self::Skipped => "skipped",
        }
    }

    /// Installed or skipped: dependents may proceed.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Installed | Self::Skipped)
    }
}

impl fmt::Display for InstallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A rejected state transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("component '{key}' is not registered")]
    UnknownComponent { key: ComponentKey },

    #[error("component '{key}' cannot move from {from} to {to} (download)")]
    IllegalDownload {
        key: ComponentKey,
        from: DownloadState,
        to: DownloadState,
    },

    #[error("component '{key}' cannot move from {from} to {to} (install)")]
    IllegalInstall {
        key: ComponentKey,
        from: InstallState,
        to: InstallState,
    },
}

/// Runtime state of one component being downloaded and installed.
///
/// Items live in the [`Orchestrator`](super::Orchestrator)'s registry and are
/// only mutated through it; the transition methods here check legality and
/// the registry keeps the global sets in step.
#[derive(Debug, Clone)]
pub struct InstallableItem {
    key: ComponentKey,
    name: String,
    variant: InstallerVariant,
    download_url: Option<String>,
    authenticated: bool,
    checksum: Option<String>,
    downloaded_file: PathBuf,
    target_dir: PathBuf,
    preinstalled: bool,
    download_state: DownloadState,
    install_state: InstallState,
    dependents: Vec<ComponentKey>,
    prerequisites: Vec<ComponentKey>,
}

impl InstallableItem {
    pub fn new(
        descriptor: &ComponentDescriptor,
        variant: InstallerVariant,
        downloaded_file: PathBuf,
        target_dir: PathBuf,
    ) -> Self {
        Self {
            key: descriptor.key.clone(),
            name: descriptor.name.clone(),
            variant,
            download_url: descriptor.download_url().map(str::to_string),
            authenticated: descriptor.is_authenticated(),
            checksum: descriptor.sha256.clone(),
            downloaded_file,
            target_dir,
            preinstalled: descriptor.existing_installer().is_some(),
            download_state: DownloadState::NotStarted,
            install_state: InstallState::NotStarted,
            dependents: Vec::new(),
            prerequisites: Vec::new(),
        }
    }

    pub fn key(&self) -> &ComponentKey {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variant(&self) -> &InstallerVariant {
        &self.variant
    }

    pub fn download_url(&self) -> Option<&str> {
        self.download_url.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn checksum(&self) -> Option<&str> {
        self.checksum.as_deref()
    }

    pub fn downloaded_file(&self) -> &Path {
        &self.downloaded_file
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    /// The installer came from an earlier session; no transport is needed.
    pub fn is_preinstalled(&self) -> bool {
        self.preinstalled
    }

    pub fn download_state(&self) -> DownloadState {
        self.download_state
    }

    pub fn install_state(&self) -> InstallState {
        self.install_state
    }

    pub fn is_downloaded(&self) -> bool {
        self.download_state == DownloadState::Downloaded
    }

    pub fn is_installed(&self) -> bool {
        self.install_state == InstallState::Installed
    }

    pub fn is_skipped(&self) -> bool {
        self.install_state == InstallState::Skipped
    }

    /// Components to trigger after this one installs, in order.
    pub fn dependents(&self) -> &[ComponentKey] {
        &self.dependents
    }

    /// Components this one is triggered by.
    pub fn prerequisites(&self) -> &[ComponentKey] {
        &self.prerequisites
    }

    /// Append a dependent to the notification list.
    pub(crate) fn then_install(&mut self, dependent: ComponentKey) {
        self.dependents.push(dependent);
    }

    pub(crate) fn add_prerequisite(&mut self, prerequisite: ComponentKey) {
        self.prerequisites.push(prerequisite);
    }

    pub(crate) fn clear_edges(&mut self) {
        self.dependents.clear();
        self.prerequisites.clear();
    }

    /// `NotStarted -> Downloading`. Returns `false` if already downloading.
    pub(crate) fn start_download(&mut self) -> TransitionResult<bool> {
        match self.download_state {
            DownloadState::NotStarted => {
                self.download_state = DownloadState::Downloading;
                Ok(true)
            }
            DownloadState::Downloading => Ok(false),
            DownloadState::Downloaded => Err(self.illegal_download(DownloadState::Downloading)),
        }
    }

    /// `Downloading -> Downloaded`.
    pub(crate) fn finish_download(&mut self) -> TransitionResult<()> {
        if self.download_state != DownloadState::Downloading {
            return Err(self.illegal_download(DownloadState::Downloaded));
        }
        self.download_state = DownloadState::Downloaded;
        Ok(())
    }

    /// `NotStarted -> Waiting`; other states are left alone.
    pub(crate) fn park(&mut self) {
        if self.install_state == InstallState::NotStarted {
            self.install_state = InstallState::Waiting;
        }
    }

    /// `NotStarted | Waiting -> Installing`.
    pub(crate) fn start_install(&mut self) -> TransitionResult<()> {
        match self.install_state {
            InstallState::NotStarted | InstallState::Waiting => {
                self.install_state = InstallState::Installing;
                Ok(())
            }
            _ => Err(self.illegal_install(InstallState::Installing)),
        }
    }

    /// `Installing -> Installed`.
    pub(crate) fn finish_install(&mut self) -> TransitionResult<()> {
        if self.install_state != InstallState::Installing {
            return Err(self.illegal_install(InstallState::Installed));
        }
        self.install_state = InstallState::Installed;
        Ok(())
    }

    /// `NotStarted | Waiting -> Skipped`.
    pub(crate) fn skip(&mut self) -> TransitionResult<()> {
        match self.install_state {
            InstallState::NotStarted | InstallState::Waiting => {
                self.install_state = InstallState::Skipped;
                Ok(())
            }
            _ => Err(self.illegal_install(InstallState::Skipped)),
        }
    }

    fn illegal_download(&self, to: DownloadState) -> TransitionError {
        TransitionError::IllegalDownload {
            key: self.key.clone(),
            from: self.download_state,
            to,
        }
    }

    fn illegal_install(&self, to: InstallState) -> TransitionError {
        TransitionError::IllegalInstall {
            key: self.key.clone(),
            from: self.install_state,
            to,
        }
    }
}
