//! Component manifest loading.
//!
//! The manifest is a JSON object mapping component keys to requirements:
//!
//! ```json
//! {
//!   "jdk": {
//!     "name": "OpenJDK",
//!     "bundle": "yes",
//!     "url": "https://example.com/openjdk.zip",
//!     "filename": "openjdk.zip",
//!     "sha256sum": "…"
//!   },
//!   "devstudio": {
//!     "name": "Red Hat JBoss Developer Studio",
//!     "dmUrl": "https://dm.example.com/devstudio.jar",
//!     "filename": "devstudio.jar",
//!     "installer": "headless",
//!     "requires": "jdk"
//!   }
//! }
//! ```
//!
//! Unknown fields are ignored.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::descriptor::{Bundle, ComponentDescriptor, ComponentKey};
use super::error::{ComponentError, ComponentResult};
use super::variant::VariantKind;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Requirement {
    name: Option<String>,
    bundle: Option<Bundle>,
    url: Option<String>,
    dm_url: Option<String>,
    #[serde(rename = "filename")]
    file_name: Option<String>,
    #[serde(rename = "sha256sum")]
    sha256: Option<String>,
    target_folder_name: Option<String>,
    installer: Option<VariantKind>,
    requires: Option<ComponentKey>,
    version: Option<String>,
    installed_file: Option<PathBuf>,
}

impl Requirement {
    fn into_descriptor(self, key: ComponentKey) -> ComponentDescriptor {
        let mut descriptor = ComponentDescriptor::new(key, self.file_name.unwrap_or_default());
        if let Some(name) = self.name {
            descriptor.name = name;
        }
        descriptor.bundle = self.bundle.unwrap_or_default();
        descriptor.url = self.url;
        descriptor.dm_url = self.dm_url;
        descriptor.sha256 = self.sha256;
        descriptor.target_folder = self.target_folder_name;
        descriptor.installer = self.installer;
        descriptor.requires = self.requires;
        descriptor.version = self.version;
        descriptor.installed_file = self.installed_file;
        descriptor
    }
}

/// Parse manifest JSON into descriptors, ordered by key.
pub fn parse_manifest(json: &str) -> ComponentResult<Vec<ComponentDescriptor>> {
    let requirements: BTreeMap<ComponentKey, Requirement> = serde_json::from_str(json)?;
    Ok(requirements
        .into_iter()
        .map(|(key, requirement)| requirement.into_descriptor(key))
        .collect())
}

/// Read and parse a manifest file.
pub fn load_manifest(path: &Path) -> ComponentResult<Vec<ComponentDescriptor>> {
    let json = std::fs::read_to_string(path).map_err(|source| ComponentError::ManifestRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_manifest(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MANIFEST: &str = r#"{
        "jdk": {
            "name": "OpenJDK",
            "bundle": "yes",
            "url": "https://example.com/openjdk.zip",
            "filename": "openjdk.zip",
            "sha256sum": "abc123",
            "modulePath": "model/jdk-install"
        },
        "devstudio": {
            "name": "Red Hat JBoss Developer Studio",
            "dmUrl": "https://dm.example.com/devstudio.jar",
            "filename": "devstudio.jar",
            "installer": "headless",
            "requires": "jdk",
            "targetFolderName": "studio"
        },
        "7zip": {
            "bundle": "tools",
            "url": "https://example.com/7z.zip",
            "filename": "7z.zip"
        }
    }"#;

    #[test]
    fn test_parse_manifest_fields() {
        let descriptors = parse_manifest(MANIFEST).unwrap();
        assert_eq!(descriptors.len(), 3);

        let jdk = descriptors.iter().find(|d| d.key.as_str() == "jdk").unwrap();
        assert_eq!(jdk.name, "OpenJDK");
        assert_eq!(jdk.file_name, "openjdk.zip");
        assert_eq!(jdk.sha256.as_deref(), Some("abc123"));
        assert_eq!(jdk.bundle, Bundle::Yes);

        let studio = descriptors
            .iter()
            .find(|d| d.key.as_str() == "devstudio")
            .unwrap();
        assert_eq!(studio.download_url(), Some("https://dm.example.com/devstudio.jar"));
        assert_eq!(studio.installer, Some(VariantKind::Headless));
        assert_eq!(studio.requires, Some(ComponentKey::new("jdk")));
        assert_eq!(studio.target_folder.as_deref(), Some("studio"));
    }

    #[test]
    fn test_tools_bundle_parsed() {
        let descriptors = parse_manifest(MANIFEST).unwrap();
        let tool = descriptors.iter().find(|d| d.key.as_str() == "7zip").unwrap();
        assert!(tool.bundle.is_tools());
        assert_eq!(tool.name, "7zip");
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = parse_manifest("{ not json").unwrap_err();
        assert!(matches!(err, ComponentError::ManifestParse(_)));
    }

    #[test]
    fn test_load_manifest_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MANIFEST.as_bytes()).unwrap();

        let descriptors = load_manifest(file.path()).unwrap();
        assert_eq!(descriptors.len(), 3);
    }

    #[test]
    fn test_load_missing_manifest() {
        let err = load_manifest(Path::new("/nonexistent/requirements.json")).unwrap_err();
        assert!(matches!(err, ComponentError::ManifestRead { .. }));
    }
}
