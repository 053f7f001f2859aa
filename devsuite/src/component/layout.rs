//! Install directory layout.
//!
//! Every component installs into `<root>/<folder>`, where the folder name is a
//! fixed per-component convention (`JDK8`, `VirtualBox`, ...). Downloads land
//! in a temp directory as `<temp>/<file_name>`.

use std::path::{Path, PathBuf};

use super::descriptor::{ComponentDescriptor, ComponentKey};

/// Per-component folder names under the install root.
const FOLDERS: &[(&str, &str)] = &[
    ("jdk", "JDK8"),
    ("virtualbox", "VirtualBox"),
    ("devstudio", "JBDS"),
    ("vagrant", "Vagrant"),
    ("cygwin", "cygwin"),
    ("cdk", "cdk"),
    ("jbosseap", "jbosseap"),
    ("fusetools", "fusetools"),
    ("kompose", "kompose"),
    ("hyperv", "hyperv"),
];

/// Folder name for a component key. Unknown keys use the key itself.
pub fn default_folder(key: &ComponentKey) -> &str {
    FOLDERS
        .iter()
        .find(|(k, _)| *k == key.as_str())
        .map(|(_, folder)| *folder)
        .unwrap_or(key.as_str())
}

/// Filesystem locations used by a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    root: PathBuf,
    temp_dir: PathBuf,
}

impl InstallLayout {
    /// Layout rooted at `root`, downloading into the OS temp directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            temp_dir: std::env::temp_dir(),
        }
    }

    /// `C:\DeveloperPlatform` on Windows, `$HOME/DeveloperPlatform` elsewhere.
    pub fn platform_default() -> Self {
        Self::new(default_root())
    }

    /// Set the download directory.
    pub fn with_temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = temp_dir.into();
        self
    }

    pub fn install_dir(&self) -> &Path {
        &self.root
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// `<root>/<folder>` for a key, using the default folder convention.
    pub fn component_dir(&self, key: &ComponentKey) -> PathBuf {
        self.root.join(default_folder(key))
    }

    /// Target directory for a descriptor, honouring its folder override.
    pub fn target_dir(&self, descriptor: &ComponentDescriptor) -> PathBuf {
        match descriptor.target_folder.as_deref() {
            Some(folder) if !folder.is_empty() => self.root.join(folder),
            _ => self.component_dir(&descriptor.key),
        }
    }

    /// Where the installer for a descriptor is downloaded to.
    pub fn download_path(&self, descriptor: &ComponentDescriptor) -> PathBuf {
        self.temp_dir.join(&descriptor.file_name)
    }

    pub fn jdk_dir(&self) -> PathBuf {
        self.component_dir(&ComponentKey::new("jdk"))
    }

    pub fn virtualbox_dir(&self) -> PathBuf {
        self.component_dir(&ComponentKey::new("virtualbox"))
    }

    pub fn devstudio_dir(&self) -> PathBuf {
        self.component_dir(&ComponentKey::new("devstudio"))
    }

    pub fn vagrant_dir(&self) -> PathBuf {
        self.component_dir(&ComponentKey::new("vagrant"))
    }

    pub fn cygwin_dir(&self) -> PathBuf {
        self.component_dir(&ComponentKey::new("cygwin"))
    }
}

impl Default for InstallLayout {
    fn default() -> Self {
        Self::platform_default()
    }
}

fn default_root() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(r"c:\DeveloperPlatform")
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("DeveloperPlatform")
    }
}
