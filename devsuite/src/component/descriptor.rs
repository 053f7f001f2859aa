//! Component identity and declarative descriptors.

use std::borrow::Borrow;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::variant::VariantKind;

/// Stable identifier naming a component.
///
/// Used both as the vertex identity in the dependency graph and as the
/// registry key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentKey(String);

impl ComponentKey {
    /// Create a key from any string-like value.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ComponentKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for ComponentKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl Borrow<str> for ComponentKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Bundle/category a component belongs to.
///
/// Components in the `tools` bundle are never registered for installation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Bundle {
    #[default]
    Yes,
    Tools,
    Other(String),
}

impl Bundle {
    /// Returns true for the excluded `tools` bundle.
    pub fn is_tools(&self) -> bool {
        matches!(self, Self::Tools)
    }
}

impl From<String> for Bundle {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "yes" => Self::Yes,
            "tools" => Self::Tools,
            _ => Self::Other(value),
        }
    }
}

impl From<Bundle> for String {
    fn from(bundle: Bundle) -> Self {
        match bundle {
            Bundle::Yes => "yes".to_string(),
            Bundle::Tools => "tools".to_string(),
            Bundle::Other(value) => value,
        }
    }
}

/// Declarative, immutable definition of a component's install source and target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDescriptor {
    /// Registry and graph key.
    pub key: ComponentKey,
    /// Human-readable product name, used in status messages.
    pub name: String,
    /// Category; `tools` components are excluded from registration.
    pub bundle: Bundle,
    /// Direct download URL.
    pub url: Option<String>,
    /// Authenticated download-manager URL. Preferred over `url` when present.
    pub dm_url: Option<String>,
    /// File name of the downloaded installer inside the temp directory.
    pub file_name: String,
    /// Expected SHA-256 of the downloaded file (lowercase hex).
    pub sha256: Option<String>,
    /// Folder name under the install root; defaults per component key.
    pub target_folder: Option<String>,
    /// Already-downloaded installer from an earlier session.
    pub installed_file: Option<PathBuf>,
    /// Explicit installer variant; otherwise chosen from the key.
    pub installer: Option<VariantKind>,
    /// Component whose milestone a headless installer must await.
    pub requires: Option<ComponentKey>,
    /// Product version, informational only.
    pub version: Option<String>,
}

impl ComponentDescriptor {
    /// Create a descriptor with only a key and a downloaded file name.
    pub fn new(key: impl Into<ComponentKey>, file_name: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            name: key.to_string(),
            key,
            bundle: Bundle::Yes,
            url: None,
            dm_url: None,
            file_name: file_name.into(),
            sha256: None,
            target_folder: None,
            installed_file: None,
            installer: None,
            requires: None,
            version: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_bundle(mut self, bundle: Bundle) -> Self {
        self.bundle = bundle;
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_dm_url(mut self, url: impl Into<String>) -> Self {
        self.dm_url = Some(url.into());
        self
    }

    pub fn with_sha256(mut self, sha256: impl Into<String>) -> Self {
        self.sha256 = Some(sha256.into());
        self
    }

    pub fn with_target_folder(mut self, folder: impl Into<String>) -> Self {
        self.target_folder = Some(folder.into());
        self
    }

    pub fn with_installed_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.installed_file = Some(path.into());
        self
    }

    pub fn with_installer(mut self, kind: VariantKind) -> Self {
        self.installer = Some(kind);
        self
    }

    pub fn with_requires(mut self, key: impl Into<ComponentKey>) -> Self {
        self.requires = Some(key.into());
        self
    }

    /// The URL to download from: the download-manager URL when present,
    /// otherwise the direct URL. Empty strings count as absent.
    pub fn download_url(&self) -> Option<&str> {
        non_empty(self.dm_url.as_deref()).or_else(|| non_empty(self.url.as_deref()))
    }

    /// Whether the download goes through the authenticated download manager.
    pub fn is_authenticated(&self) -> bool {
        non_empty(self.dm_url.as_deref()).is_some()
    }

    /// The pre-existing installer reference, ignoring empty paths.
    pub fn existing_installer(&self) -> Option<&PathBuf> {
        self.installed_file
            .as_ref()
            .filter(|path| !path.as_os_str().is_empty())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
